//! # Cross-Chain Transaction Core
//!
//! Lifecycle of cross-chain transactions (CCTXs) on the ZetaChain-style host
//! chain: inbound and outbound ballot application, the status machine,
//! reverts, aborts and refunds, outbound trackers, the sliding-window rate
//! limiter, admin command CCTXs and the expiry sweep.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Determinism
//!
//! Every replica applying the same block sequence must reach the same state:
//!
//! | Rule | Where |
//! |------|-------|
//! | No clock reads | `BlockContext` passed to every mutator |
//! | Key-ordered iteration | `CrosschainStore` listings |
//! | Canonical digests | `algorithms::digest` (Keccak-256) |
//! | Illegal transitions abort | `Status::change_status` |
//!
//! ## Module Structure
//!
//! ```text
//! cctx-core/
//! ├── domain/          # CCTX, Status, trackers, rate limiter flags, genesis
//! ├── algorithms/      # Digests, commands, admission, expiry sweep
//! ├── ports/           # CrosschainApi, CrosschainStore, ObserverEngine, TssProvider
//! ├── adapters/        # In-memory store, scripted observer and TSS
//! ├── config.rs        # CrosschainConfig
//! ├── metrics.rs       # Prometheus counters (feature "metrics")
//! └── service.rs       # CrosschainService
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{InMemoryStore, StaticObserverEngine, StaticTssProvider};
pub use algorithms::{
    check_admission, command_index, inbound_vote_digest, keccak_hex, outbound_vote_digest,
    plan_sweep, should_sweep, Admission, MigrateCustodyFunds, SweepPlan, UpdateCustodyPause,
    WhitelistErc20,
};
pub use config::{CrosschainConfig, ExpiryConfig};
pub use domain::{
    BallotStatus, BallotVerdict, BlockContext, CctxStatus, Chain, ChainId, ChainKind,
    ChainRegistry, CoinType, ConfirmationMode, CrossChainTx, CrosschainError, CrosschainResult,
    DecimalRate, GenesisState, InboundParams, MsgVoteInbound, MsgVoteOutbound, OutboundParams,
    OutboundTracker, RateLimiterFlags, ReceiveStatus, Status, TxFinalizationStatus,
};
pub use ports::{
    CrosschainApi, CrosschainStore, ObserverEngine, PendingNonces, Tss, TssMigrationRequest,
    TssProvider,
};
pub use service::CrosschainService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
