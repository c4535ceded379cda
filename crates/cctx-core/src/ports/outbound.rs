//! # Outbound Ports
//!
//! Traits for the collaborators the core drives: the replicated store, the
//! ballot/observer engine and the TSS registry.
//!
//! All ports are synchronous. Reads and writes complete within the logical
//! step that issued them; atomicity across a step belongs to the host.

use crate::domain::{
    BallotStatus, BallotVerdict, ChainId, CrossChainTx, OutboundTracker, RateLimiterFlags,
    ZetaAccounting,
};
use serde::{Deserialize, Serialize};

/// Durable module state.
///
/// Every listing is returned in key order.
pub trait CrosschainStore: Send + Sync {
    /// Load a CCTX by index.
    fn get_cctx(&self, index: &str) -> Option<CrossChainTx>;

    /// Insert or replace a CCTX.
    fn set_cctx(&self, cctx: CrossChainTx);

    /// Remove a CCTX. Returns true if it existed.
    fn remove_cctx(&self, index: &str) -> bool;

    /// All CCTXs, by index.
    fn cctxs(&self) -> Vec<CrossChainTx>;

    /// Load the tracker for (chain, nonce).
    fn get_outbound_tracker(&self, chain_id: ChainId, nonce: u64) -> Option<OutboundTracker>;

    /// Insert or replace a tracker.
    fn set_outbound_tracker(&self, tracker: OutboundTracker);

    /// Remove a tracker. Returns true if it existed.
    fn remove_outbound_tracker(&self, chain_id: ChainId, nonce: u64) -> bool;

    /// All trackers, by (chain, nonce).
    fn outbound_trackers(&self) -> Vec<OutboundTracker>;

    /// Rate limiter flags, if ever set.
    fn rate_limiter_flags(&self) -> Option<RateLimiterFlags>;

    /// Replace the rate limiter flags.
    fn set_rate_limiter_flags(&self, flags: RateLimiterFlags);

    /// Number of CCTXs ever constructed.
    fn cctx_counter(&self) -> u64;

    /// Replace the CCTX counter.
    fn set_cctx_counter(&self, counter: u64);

    /// ZETA accounting.
    fn zeta_accounting(&self) -> ZetaAccounting;

    /// Replace the ZETA accounting.
    fn set_zeta_accounting(&self, accounting: ZetaAccounting);

    /// Whether an inbound key was already finalized.
    fn is_inbound_finalized(&self, key: &str) -> bool;

    /// Record a finalized inbound key.
    fn set_inbound_finalized(&self, key: &str);

    /// All finalized inbound keys, sorted.
    fn finalized_inbounds(&self) -> Vec<String>;
}

/// Observer set of the host chain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverList {
    /// Observer accounts.
    pub observers: Vec<String>,
}

/// Nonces not yet confirmed for a (tss, chain) pair: `low..high`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingNonces {
    /// Lowest pending nonce.
    pub nonce_low: u64,
    /// One past the highest pending nonce.
    pub nonce_high: u64,
}

impl PendingNonces {
    /// Returns true if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.nonce_low >= self.nonce_high
    }
}

/// Ballot tallying and nonce assignment, owned by the observer module.
pub trait ObserverEngine: Send + Sync {
    /// Tally state of the ballot keyed by `key`.
    fn get_ballot(&self, key: &str) -> Option<BallotStatus>;

    /// Verdict of the ballot keyed by `key`, if finalized.
    fn is_finalized(&self, key: &str) -> Option<BallotVerdict> {
        self.get_ballot(key).and_then(|status| status.verdict())
    }

    /// Current observer set.
    fn get_observer_set(&self) -> ObserverList;

    /// Pending nonce range for (tss, chain).
    fn get_pending_nonces(&self, tss_pubkey: &str, chain_id: ChainId) -> Option<PendingNonces>;

    /// Index of the CCTX assigned to (tss, chain, nonce).
    fn get_nonce_to_cctx(&self, tss_pubkey: &str, chain_id: ChainId, nonce: u64)
        -> Option<String>;
}

/// A TSS key generation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tss {
    /// TSS public key.
    pub tss_pubkey: String,
    /// Host height at which the key was finalized.
    pub finalized_zeta_height: u64,
    /// Host height of the key generation.
    pub keygen_zeta_height: u64,
}

/// TSS registry. Signing itself is out of scope; only identity and rotation
/// metadata are consumed.
pub trait TssProvider: Send + Sync {
    /// TSS currently in effect.
    fn get_tss(&self) -> Option<Tss>;

    /// Every TSS, oldest first.
    fn get_tss_history(&self) -> Vec<Tss>;

    /// Address of `tss_pubkey` on `chain_id`.
    fn tss_address(&self, tss_pubkey: &str, chain_id: ChainId) -> Option<String>;
}
