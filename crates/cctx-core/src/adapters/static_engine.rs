//! Scripted Observer and TSS Adapters
//!
//! Implement `ObserverEngine` and `TssProvider` from data set up front, for
//! tests and simulations.

use crate::domain::{BallotStatus, ChainId};
use crate::ports::outbound::{ObserverEngine, ObserverList, PendingNonces, Tss, TssProvider};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// Observer engine answering from scripted ballots and nonce tables.
#[derive(Default)]
pub struct StaticObserverEngine {
    ballots: RwLock<HashMap<String, BallotStatus>>,
    observers: RwLock<ObserverList>,
    pending_nonces: RwLock<HashMap<(String, ChainId), PendingNonces>>,
    nonce_to_cctx: RwLock<HashMap<(String, ChainId, u64), String>>,
}

impl StaticObserverEngine {
    /// Create an engine with no ballots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with an observer set.
    pub fn with_observers(observers: &[&str]) -> Self {
        let engine = Self::new();
        *engine.observers.write() = ObserverList {
            observers: observers.iter().map(|o| o.to_string()).collect(),
        };
        engine
    }

    /// Script the tally state of a ballot.
    pub fn set_ballot(&self, key: &str, status: BallotStatus) {
        debug!("[cctx] Scripted ballot {} -> {:?}", key, status);
        self.ballots.write().insert(key.to_string(), status);
    }

    /// Script the pending nonce range of (tss, chain).
    pub fn set_pending_nonces(&self, tss_pubkey: &str, chain_id: ChainId, nonces: PendingNonces) {
        self.pending_nonces
            .write()
            .insert((tss_pubkey.to_string(), chain_id), nonces);
    }

    /// Script the CCTX assigned to (tss, chain, nonce).
    pub fn set_nonce_to_cctx(&self, tss_pubkey: &str, chain_id: ChainId, nonce: u64, index: &str) {
        self.nonce_to_cctx
            .write()
            .insert((tss_pubkey.to_string(), chain_id, nonce), index.to_string());
    }
}

impl ObserverEngine for StaticObserverEngine {
    fn get_ballot(&self, key: &str) -> Option<BallotStatus> {
        self.ballots.read().get(key).copied()
    }

    fn get_observer_set(&self) -> ObserverList {
        self.observers.read().clone()
    }

    fn get_pending_nonces(&self, tss_pubkey: &str, chain_id: ChainId) -> Option<PendingNonces> {
        self.pending_nonces
            .read()
            .get(&(tss_pubkey.to_string(), chain_id))
            .copied()
    }

    fn get_nonce_to_cctx(
        &self,
        tss_pubkey: &str,
        chain_id: ChainId,
        nonce: u64,
    ) -> Option<String> {
        self.nonce_to_cctx
            .read()
            .get(&(tss_pubkey.to_string(), chain_id, nonce))
            .cloned()
    }
}

/// TSS registry answering from a fixed history.
#[derive(Default)]
pub struct StaticTssProvider {
    history: RwLock<Vec<Tss>>,
    current: RwLock<Option<usize>>,
    addresses: RwLock<HashMap<(String, ChainId), String>>,
}

impl StaticTssProvider {
    /// Registry whose only TSS is `tss_pubkey`.
    pub fn new(tss_pubkey: &str) -> Self {
        let provider = Self::default();
        provider.push_tss(Tss {
            tss_pubkey: tss_pubkey.to_string(),
            ..Default::default()
        });
        *provider.current.write() = Some(0);
        provider
    }

    /// Append a TSS to the history without making it current.
    pub fn push_tss(&self, tss: Tss) {
        self.history.write().push(tss);
    }

    /// Make the newest TSS current.
    pub fn rotate(&self) {
        let len = self.history.read().len();
        if len > 0 {
            *self.current.write() = Some(len - 1);
        }
    }

    /// Set the address of `tss_pubkey` on `chain_id`.
    pub fn set_address(&self, tss_pubkey: &str, chain_id: ChainId, address: &str) {
        self.addresses
            .write()
            .insert((tss_pubkey.to_string(), chain_id), address.to_string());
    }
}

impl TssProvider for StaticTssProvider {
    fn get_tss(&self) -> Option<Tss> {
        let current = (*self.current.read())?;
        self.history.read().get(current).cloned()
    }

    fn get_tss_history(&self) -> Vec<Tss> {
        self.history.read().clone()
    }

    fn tss_address(&self, tss_pubkey: &str, chain_id: ChainId) -> Option<String> {
        self.addresses
            .read()
            .get(&(tss_pubkey.to_string(), chain_id))
            .cloned()
    }
}
