//! # Algorithms Module
//!
//! Pure functions over domain types: ballot digests, command construction,
//! expiry planning and rate-limit admission.

pub mod commands;
pub mod digest;
pub mod expiry;
pub mod rate_limit;

pub use commands::{
    command_index, migrate_custody_funds_cctx, migrate_tss_funds_cctx,
    update_custody_pause_cctx, whitelist_erc20_cctx, CommandContext, MigrateCustodyFunds,
    MigrateTssFunds, UpdateCustodyPause, WhitelistErc20,
};
pub use digest::{inbound_vote_digest, keccak_hex, outbound_vote_digest, CanonicalEncoder};
pub use expiry::{plan_sweep, should_sweep, SweepPlan};
pub use rate_limit::{cctx_value, check_admission, window_value, Admission};
