//! # Domain Errors
//!
//! Error types for the cross-chain transaction core.
//!
//! Validation and request errors never mutate state: the CCTX, tracker or
//! flags object is left exactly as it was. Illegal status transitions are
//! not errors at all, see `Status::change_status`.

use thiserror::Error;

/// Cross-chain error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrosschainError {
    /// Index is not `0x` followed by 64 hex characters.
    #[error("Invalid CCTX index: {0}")]
    InvalidIndex(String),

    /// Sender of an inbound leg or vote is empty.
    #[error("Sender cannot be empty")]
    EmptySender,

    /// Receiver of an outbound leg is empty.
    #[error("Receiver cannot be empty")]
    EmptyReceiver,

    /// Vote submitter is empty.
    #[error("Creator cannot be empty")]
    EmptyCreator,

    /// Chain id is not present in the chain registry.
    #[error("Unknown chain id: {0}")]
    UnknownChain(i64),

    /// Amount field is absent.
    #[error("Amount cannot be nil")]
    MissingAmount,

    /// Outbound list is absent.
    #[error("Outbound params cannot be empty")]
    MissingOutbounds,

    /// Outbound list holds more than two legs.
    #[error("Outbound params cannot be more than 2, got {0}")]
    TooManyOutbounds(usize),

    /// Request rejected by a mutator (e.g. amount mismatch).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Revert requested while the current outbound is already a revert.
    #[error("cannot revert a revert tx")]
    CannotRevertRevert,

    /// Revert requested before any outbound leg exists.
    #[error("cannot revert before trying to process an outbound tx")]
    CannotRevertBeforeOutbound,

    /// Outbound vote does not target the current outbound leg.
    #[error("Outbound mismatch: {0}")]
    OutboundMismatch(String),

    /// Operation requires a pending CCTX.
    #[error("CCTX {index} is not pending (status {status})")]
    StatusNotPending {
        /// CCTX index
        index: String,
        /// Current status
        status: String,
    },

    /// Refund requested for a CCTX that is not aborted.
    #[error("CCTX {0} is not aborted")]
    NotAborted(String),

    /// Refund requested twice.
    #[error("CCTX {0} has already been refunded")]
    AlreadyRefunded(String),

    /// CCTX not found.
    #[error("CCTX not found: {0}")]
    CctxNotFound(String),

    /// CCTX with the same index already exists.
    #[error("CCTX already exists: {0}")]
    CctxAlreadyExists(String),

    /// Inbound was already turned into a CCTX.
    #[error("Inbound already finalized: {0}")]
    InboundAlreadyFinalized(String),

    /// Outbound tracker holds the maximum number of hashes.
    #[error("Outbound tracker for chain {chain_id} nonce {nonce} has reached max hashes")]
    TrackerMaxReached {
        /// Destination chain
        chain_id: i64,
        /// Outbound nonce
        nonce: u64,
    },

    /// Outbound tracker not found.
    #[error("Outbound tracker not found: chain {chain_id} nonce {nonce}")]
    TrackerNotFound {
        /// Destination chain
        chain_id: i64,
        /// Outbound nonce
        nonce: u64,
    },

    /// No TSS is currently active.
    #[error("TSS not found")]
    TssNotFound,

    /// Rate limiter window is negative.
    #[error("Window must be positive: {0}")]
    NegativeWindow(i64),

    /// Two conversions share the same asset.
    #[error("Duplicated conversion: {0}")]
    DuplicateConversion(String),

    /// Conversion rate is absent.
    #[error("Rate is nil for conversion: {0}")]
    MissingConversionRate(String),

    /// Malformed decimal rate literal.
    #[error("Invalid decimal: {0}")]
    InvalidDecimal(String),

    /// Funds cannot cover the migration fee.
    #[error("Insufficient funds: amount {amount}, fee {fee}, chain {chain_id}")]
    InsufficientFunds {
        /// Amount available for migration
        amount: String,
        /// Computed fee
        fee: String,
        /// Destination chain
        chain_id: i64,
    },

    /// Destination chain kind cannot receive this command.
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(i64),

    /// Genesis holds two entries under the same key.
    #[error("Duplicate genesis entry: {0}")]
    DuplicateGenesisEntry(String),
}

/// Result type for cross-chain operations.
pub type CrosschainResult<T> = Result<T, CrosschainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revert_error_messages() {
        assert_eq!(
            CrosschainError::CannotRevertRevert.to_string(),
            "cannot revert a revert tx"
        );
        assert_eq!(
            CrosschainError::CannotRevertBeforeOutbound.to_string(),
            "cannot revert before trying to process an outbound tx"
        );
    }

    #[test]
    fn test_tracker_max_reached_error() {
        let err = CrosschainError::TrackerMaxReached {
            chain_id: 1,
            nonce: 42,
        };
        assert!(err.to_string().contains("nonce 42"));
    }

    #[test]
    fn test_insufficient_funds_error() {
        let err = CrosschainError::InsufficientFunds {
            amount: "100".to_string(),
            fee: "200".to_string(),
            chain_id: 1,
        };
        assert!(err.to_string().contains("Insufficient funds"));
        assert!(err.to_string().contains("200"));
    }
}
