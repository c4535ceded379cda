//! # Domain Invariants
//!
//! Structural rules every stored CCTX satisfies.

use super::errors::{CrosschainError, CrosschainResult};

/// Length of a CCTX index: `0x` followed by 64 hex characters.
pub const CCTX_INDEX_LENGTH: usize = 66;

/// Maximum number of outbound legs (original attempt plus one revert).
pub const MAX_OUTBOUND_LEGS: usize = 2;

/// Invariant: index is `0x` + 64 hex characters.
pub fn invariant_valid_index(index: &str) -> CrosschainResult<()> {
    let valid = index.len() == CCTX_INDEX_LENGTH
        && index.starts_with("0x")
        && index[2..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(CrosschainError::InvalidIndex(index.to_string()));
    }
    Ok(())
}

/// Invariant: 1 ≤ outbound legs ≤ 2.
pub fn invariant_outbound_count(count: usize) -> CrosschainResult<()> {
    if count == 0 {
        return Err(CrosschainError::MissingOutbounds);
    }
    if count > MAX_OUTBOUND_LEGS {
        return Err(CrosschainError::TooManyOutbounds(count));
    }
    Ok(())
}
