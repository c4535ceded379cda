//! In-Memory Store Adapter
//!
//! Implements `CrosschainStore` over ordered maps so every listing comes back
//! in key order on every replica.

use crate::domain::{ChainId, CrossChainTx, OutboundTracker, RateLimiterFlags, ZetaAccounting};
use crate::ports::outbound::CrosschainStore;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Default)]
struct StoreState {
    cctxs: BTreeMap<String, CrossChainTx>,
    trackers: BTreeMap<(ChainId, u64), OutboundTracker>,
    rate_limiter_flags: Option<RateLimiterFlags>,
    cctx_counter: u64,
    zeta_accounting: ZetaAccounting,
    finalized_inbounds: BTreeSet<String>,
}

/// In-memory module store.
///
/// In production the host chain's key-value store sits behind the port.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CrosschainStore for InMemoryStore {
    fn get_cctx(&self, index: &str) -> Option<CrossChainTx> {
        self.state.read().cctxs.get(index).cloned()
    }

    fn set_cctx(&self, cctx: CrossChainTx) {
        self.state.write().cctxs.insert(cctx.index.clone(), cctx);
    }

    fn remove_cctx(&self, index: &str) -> bool {
        self.state.write().cctxs.remove(index).is_some()
    }

    fn cctxs(&self) -> Vec<CrossChainTx> {
        self.state.read().cctxs.values().cloned().collect()
    }

    fn get_outbound_tracker(&self, chain_id: ChainId, nonce: u64) -> Option<OutboundTracker> {
        self.state.read().trackers.get(&(chain_id, nonce)).cloned()
    }

    fn set_outbound_tracker(&self, tracker: OutboundTracker) {
        self.state
            .write()
            .trackers
            .insert((tracker.chain_id, tracker.nonce), tracker);
    }

    fn remove_outbound_tracker(&self, chain_id: ChainId, nonce: u64) -> bool {
        self.state
            .write()
            .trackers
            .remove(&(chain_id, nonce))
            .is_some()
    }

    fn outbound_trackers(&self) -> Vec<OutboundTracker> {
        self.state.read().trackers.values().cloned().collect()
    }

    fn rate_limiter_flags(&self) -> Option<RateLimiterFlags> {
        self.state.read().rate_limiter_flags.clone()
    }

    fn set_rate_limiter_flags(&self, flags: RateLimiterFlags) {
        self.state.write().rate_limiter_flags = Some(flags);
    }

    fn cctx_counter(&self) -> u64 {
        self.state.read().cctx_counter
    }

    fn set_cctx_counter(&self, counter: u64) {
        self.state.write().cctx_counter = counter;
    }

    fn zeta_accounting(&self) -> ZetaAccounting {
        self.state.read().zeta_accounting.clone()
    }

    fn set_zeta_accounting(&self, accounting: ZetaAccounting) {
        self.state.write().zeta_accounting = accounting;
    }

    fn is_inbound_finalized(&self, key: &str) -> bool {
        self.state.read().finalized_inbounds.contains(key)
    }

    fn set_inbound_finalized(&self, key: &str) {
        self.state
            .write()
            .finalized_inbounds
            .insert(key.to_string());
    }

    fn finalized_inbounds(&self) -> Vec<String> {
        self.state.read().finalized_inbounds.iter().cloned().collect()
    }
}
