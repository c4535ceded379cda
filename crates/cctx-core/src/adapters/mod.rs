//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the outbound port traits in memory.

mod memory_store;
mod static_engine;

pub use memory_store::InMemoryStore;
pub use static_engine::{StaticObserverEngine, StaticTssProvider};
