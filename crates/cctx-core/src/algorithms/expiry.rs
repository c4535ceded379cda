//! # Expiry Sweep
//!
//! Decides what the periodic sweep removes. The planner is pure; the
//! service applies the plan to the store.
//!
//! One pass removes:
//! - terminal CCTXs in `OutboundMined` or `Aborted`
//! - pending CCTXs whose inbound was finalized more than `retention_blocks` ago
//! - outbound trackers created more than `retention_blocks` ago

use crate::config::ExpiryConfig;
use crate::domain::{CctxStatus, ChainId, CrossChainTx, OutboundTracker};

/// Removals computed by one sweep pass, in store key order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepPlan {
    /// Terminal CCTXs.
    pub terminal: Vec<String>,
    /// Pending CCTXs past retention.
    pub abandoned: Vec<String>,
    /// Trackers past retention, as (chain, nonce).
    pub stale_trackers: Vec<(ChainId, u64)>,
}

impl SweepPlan {
    /// Returns true if nothing is removed.
    pub fn is_empty(&self) -> bool {
        self.terminal.is_empty() && self.abandoned.is_empty() && self.stale_trackers.is_empty()
    }

    /// Number of removals.
    pub fn len(&self) -> usize {
        self.terminal.len() + self.abandoned.len() + self.stale_trackers.len()
    }
}

/// Whether the sweep runs at `height`.
pub fn should_sweep(height: u64, config: &ExpiryConfig) -> bool {
    config.sweep_interval_blocks > 0 && height > 0 && height % config.sweep_interval_blocks == 0
}

/// Whether `since` is more than `retention` blocks before `height`.
fn expired(height: u64, since: u64, retention: u64) -> bool {
    height.saturating_sub(since) > retention
}

/// Compute the removals of one pass at `height`.
pub fn plan_sweep<'a>(
    height: u64,
    config: &ExpiryConfig,
    cctxs: impl IntoIterator<Item = &'a CrossChainTx>,
    trackers: impl IntoIterator<Item = &'a OutboundTracker>,
) -> SweepPlan {
    let mut plan = SweepPlan::default();

    for cctx in cctxs {
        match cctx.state() {
            CctxStatus::OutboundMined | CctxStatus::Aborted => {
                plan.terminal.push(cctx.index.clone());
            }
            state if state.is_pending() => {
                if expired(
                    height,
                    cctx.inbound.finalized_zeta_height,
                    config.retention_blocks,
                ) {
                    plan.abandoned.push(cctx.index.clone());
                }
            }
            _ => {}
        }
    }

    for tracker in trackers {
        if expired(height, tracker.created_at_height, config.retention_blocks) {
            plan.stale_trackers.push((tracker.chain_id, tracker.nonce));
        }
    }

    plan
}
