//! # Outbound Tracker
//!
//! Candidate confirmation hashes per (chain, nonce). The tracker only reports
//! whether it is full; refusing further hashes is the writer's job.

use super::value_objects::ChainId;
use serde::{Deserialize, Serialize};

/// Maximum number of hash candidates kept per tracker.
pub const MAX_OUTBOUND_TRACKER_HASHES: usize = 5;

/// One observer-submitted hash candidate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHashEntry {
    /// Outbound transaction hash.
    pub tx_hash: String,
    /// Observer that submitted it.
    pub tx_signer: String,
    /// Whether inclusion was proved.
    pub proved: bool,
}

impl TxHashEntry {
    /// Unproved entry.
    pub fn new(tx_hash: &str, tx_signer: &str) -> Self {
        Self {
            tx_hash: tx_hash.to_string(),
            tx_signer: tx_signer.to_string(),
            proved: false,
        }
    }
}

/// Hash candidates for one outbound dispatch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundTracker {
    /// `"<chain_id>-<nonce>"`.
    pub index: String,
    /// Destination chain.
    pub chain_id: ChainId,
    /// Outbound nonce.
    pub nonce: u64,
    /// Ordered hash candidates.
    pub hash_list: Vec<TxHashEntry>,
    /// Host-chain height at which the tracker was created.
    pub created_at_height: u64,
}

impl OutboundTracker {
    /// Empty tracker for (chain, nonce).
    pub fn new(chain_id: ChainId, nonce: u64, created_at_height: u64) -> Self {
        Self {
            index: Self::key(chain_id, nonce),
            chain_id,
            nonce,
            hash_list: Vec::new(),
            created_at_height,
        }
    }

    /// Store key for (chain, nonce).
    pub fn key(chain_id: ChainId, nonce: u64) -> String {
        format!("{}-{}", chain_id, nonce)
    }

    /// True once the candidate list holds the maximum number of hashes.
    pub fn max_reached(&self) -> bool {
        self.hash_list.len() >= MAX_OUTBOUND_TRACKER_HASHES
    }

    /// Check whether `hash` is already a candidate (case-insensitive).
    pub fn contains_hash(&self, hash: &str) -> bool {
        self.hash_list
            .iter()
            .any(|entry| entry.tx_hash.eq_ignore_ascii_case(hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_with(n: usize) -> OutboundTracker {
        let mut tracker = OutboundTracker::new(1, 7, 100);
        for i in 0..n {
            tracker
                .hash_list
                .push(TxHashEntry::new(&format!("0x{:02x}", i), "observer"));
        }
        tracker
    }

    #[test]
    fn test_max_reached_boundary() {
        assert!(!tracker_with(0).max_reached());
        assert!(!tracker_with(4).max_reached());
        assert!(tracker_with(5).max_reached());
        assert!(tracker_with(6).max_reached());
    }

    #[test]
    fn test_max_reached_for_all_sizes() {
        for n in 0..12 {
            assert_eq!(tracker_with(n).max_reached(), n >= 5, "n = {n}");
        }
    }

    #[test]
    fn test_key_format() {
        let tracker = OutboundTracker::new(56, 42, 0);
        assert_eq!(tracker.index, "56-42");
        assert_eq!(OutboundTracker::key(56, 42), tracker.index);
    }

    #[test]
    fn test_contains_hash_ignores_case() {
        let mut tracker = OutboundTracker::new(1, 1, 0);
        tracker.hash_list.push(TxHashEntry::new("0xABcd", "obs"));
        assert!(tracker.contains_hash("0xabcd"));
        assert!(!tracker.contains_hash("0xabce"));
    }
}
