//! # CCTX Status Machine
//!
//! ```text
//! [PendingInbound] ──→ [PendingOutbound] ──→ [PendingRevert]
//!        │                    │                    │
//!        └────────────────────┴────────────────────┴──→ [OutboundMined] / [Aborted]
//!                             │                    │
//!                             └────────────────────┴──→ [Reverted]
//! ```
//!
//! `OutboundMined`, `Reverted` and `Aborted` are terminal. A request for any
//! transition outside the table forces the CCTX into `Aborted` and records
//! the rejected transition in the message history.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Lifecycle state of a CCTX.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CctxStatus {
    /// Inbound finalized, not yet processed.
    #[default]
    PendingInbound,
    /// Waiting for the outbound to be observed.
    PendingOutbound,
    /// Waiting for the revert outbound to be observed.
    PendingRevert,
    /// Outbound confirmed on the destination chain.
    OutboundMined,
    /// Revert confirmed on the source chain.
    Reverted,
    /// Abandoned; funds may be refunded by an admin.
    Aborted,
}

impl CctxStatus {
    /// Every state, in declaration order.
    pub const ALL: [CctxStatus; 6] = [
        CctxStatus::PendingInbound,
        CctxStatus::PendingOutbound,
        CctxStatus::PendingRevert,
        CctxStatus::OutboundMined,
        CctxStatus::Reverted,
        CctxStatus::Aborted,
    ];

    /// States reachable from `self`.
    pub fn allowed_transitions(&self) -> &'static [CctxStatus] {
        match self {
            Self::PendingInbound => &[
                Self::PendingOutbound,
                Self::Aborted,
                Self::OutboundMined,
                Self::PendingRevert,
            ],
            Self::PendingOutbound => &[
                Self::Aborted,
                Self::PendingRevert,
                Self::OutboundMined,
                Self::Reverted,
            ],
            Self::PendingRevert => &[Self::Aborted, Self::OutboundMined, Self::Reverted],
            Self::OutboundMined | Self::Reverted | Self::Aborted => &[],
        }
    }

    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: CctxStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::OutboundMined | Self::Reverted | Self::Aborted)
    }

    /// Check if still awaiting an observation.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::PendingInbound | Self::PendingOutbound | Self::PendingRevert
        )
    }
}

impl fmt::Display for CctxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PendingInbound => "PendingInbound",
            Self::PendingOutbound => "PendingOutbound",
            Self::PendingRevert => "PendingRevert",
            Self::OutboundMined => "OutboundMined",
            Self::Reverted => "Reverted",
            Self::Aborted => "Aborted",
        };
        f.write_str(name)
    }
}

/// Status record owned by a CCTX.
///
/// Fields are private: the state only moves through [`Status::change_status`]
/// and the refund flag only through [`Status::abort_refunded`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    state: CctxStatus,
    status_message: String,
    is_abort_refunded: bool,
    created_timestamp: i64,
    last_update_timestamp: i64,
}

impl Status {
    /// Create a status in `state` at `timestamp`.
    pub fn new(state: CctxStatus, timestamp: i64) -> Self {
        Self {
            state,
            status_message: String::new(),
            is_abort_refunded: false,
            created_timestamp: timestamp,
            last_update_timestamp: timestamp,
        }
    }

    /// Current state.
    pub fn state(&self) -> CctxStatus {
        self.state
    }

    /// Colon-joined message history.
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Whether an aborted CCTX has been refunded.
    pub fn is_abort_refunded(&self) -> bool {
        self.is_abort_refunded
    }

    /// Creation timestamp.
    pub fn created_timestamp(&self) -> i64 {
        self.created_timestamp
    }

    /// Timestamp of the last observed update.
    pub fn last_update_timestamp(&self) -> i64 {
        self.last_update_timestamp
    }

    /// Stamp the last update timestamp.
    pub fn touch(&mut self, timestamp: i64) {
        self.last_update_timestamp = timestamp;
    }

    /// Move to `new_state`, appending `msg` to the history first.
    ///
    /// An illegal transition forces `Aborted` and appends a diagnostic.
    pub fn change_status(&mut self, new_state: CctxStatus, msg: &str) {
        self.append_message(msg);

        if !self.state.can_transition_to(new_state) {
            warn!(
                "[cctx] Illegal transition {} -> {}, forcing Aborted",
                self.state, new_state
            );
            let diagnostic = format!(
                "failed to transition: old status {}, new status {}",
                self.state, new_state
            );
            self.append_message(&diagnostic);
            self.state = CctxStatus::Aborted;
            crate::metrics::record_forced_abort();
            return;
        }

        self.state = new_state;
    }

    /// Mark an aborted CCTX as refunded.
    pub fn abort_refunded(&mut self, timestamp: i64) {
        self.is_abort_refunded = true;
        self.append_message("CCTX aborted and refunded");
        self.last_update_timestamp = timestamp;
    }

    fn append_message(&mut self, msg: &str) {
        if msg.is_empty() {
            return;
        }
        if self.status_message.is_empty() {
            self.status_message = msg.to_string();
        } else {
            self.status_message = format!("{} : {}", self.status_message, msg);
        }
    }
}
