//! # Domain Module
//!
//! Core domain types for the cross-chain transaction lifecycle.

pub mod entities;
pub mod errors;
pub mod genesis;
pub mod invariants;
pub mod outbound_tracker;
pub mod rate_limiter;
pub mod status;
pub mod value_objects;
pub mod votes;

pub use entities::*;
pub use errors::*;
pub use genesis::*;
pub use invariants::*;
pub use outbound_tracker::*;
pub use rate_limiter::*;
pub use status::*;
pub use value_objects::*;
pub use votes::*;
