//! # Genesis State
//!
//! Full export of the module state. `export_genesis(import_genesis(s)) == s`
//! for any valid `s` whose collections are in key order.

use super::entities::CrossChainTx;
use super::errors::{CrosschainError, CrosschainResult};
use super::outbound_tracker::{OutboundTracker, MAX_OUTBOUND_TRACKER_HASHES};
use super::rate_limiter::RateLimiterFlags;
use super::value_objects::ChainRegistry;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Module-level accounting of ZETA lost to aborts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZetaAccounting {
    /// Sum of amounts of aborted Zeta-coin CCTXs not yet refunded.
    pub aborted_zeta_amount: U256,
}

/// Every persisted collection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    /// CCTXs, by index.
    pub cctxs: Vec<CrossChainTx>,
    /// Outbound trackers, by (chain, nonce) key.
    pub outbound_trackers: Vec<OutboundTracker>,
    /// Rate limiter configuration.
    pub rate_limiter_flags: RateLimiterFlags,
    /// Number of CCTXs ever constructed.
    pub cctx_counter: u64,
    /// ZETA accounting.
    pub zeta_accounting: ZetaAccounting,
    /// Finalized inbound keys.
    pub finalized_inbounds: Vec<String>,
}

impl GenesisState {
    /// Check the state can be imported.
    pub fn validate(&self, chains: &ChainRegistry) -> CrosschainResult<()> {
        let mut indices = HashSet::new();
        for cctx in &self.cctxs {
            if !indices.insert(cctx.index.as_str()) {
                return Err(CrosschainError::DuplicateGenesisEntry(format!(
                    "cctx {}",
                    cctx.index
                )));
            }
            cctx.validate(chains)?;
        }

        let mut trackers = HashSet::new();
        for tracker in &self.outbound_trackers {
            if !trackers.insert((tracker.chain_id, tracker.nonce)) {
                return Err(CrosschainError::DuplicateGenesisEntry(format!(
                    "outbound tracker {}",
                    OutboundTracker::key(tracker.chain_id, tracker.nonce)
                )));
            }
            if tracker.hash_list.len() > MAX_OUTBOUND_TRACKER_HASHES {
                return Err(CrosschainError::TrackerMaxReached {
                    chain_id: tracker.chain_id,
                    nonce: tracker.nonce,
                });
            }
        }

        let mut inbounds = HashSet::new();
        for key in &self.finalized_inbounds {
            if !inbounds.insert(key.as_str()) {
                return Err(CrosschainError::DuplicateGenesisEntry(format!(
                    "finalized inbound {}",
                    key
                )));
            }
        }

        self.rate_limiter_flags.validate()
    }
}
