//! # Observer Vote Messages
//!
//! Payloads submitted by observers. Their canonical digest (see
//! `algorithms::digest`) is the ballot key.

use super::errors::{CrosschainError, CrosschainResult};
use super::invariants::invariant_valid_index;
use super::value_objects::{ChainId, CoinType, ConfirmationMode, ReceiveStatus};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Observation of an inbound transaction on a connected chain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgVoteInbound {
    /// Observer submitting the vote. Excluded from the digest.
    pub creator: String,
    /// Sender on the source chain.
    pub sender: String,
    /// Source chain.
    pub sender_chain_id: ChainId,
    /// Transaction origin; defaults to `sender` when empty.
    pub tx_origin: String,
    /// Receiver on the destination chain.
    pub receiver: String,
    /// Destination chain.
    pub receiver_chain: ChainId,
    /// Amount deposited. `None` when absent from the payload.
    pub amount: Option<U256>,
    /// Relayed message.
    pub message: String,
    /// Inbound transaction hash.
    pub inbound_hash: String,
    /// Height at which the observer saw the inbound. Excluded from the digest.
    pub inbound_block_height: u64,
    /// Gas limit for the outbound call.
    pub gas_limit: u64,
    /// Asset class.
    pub coin_type: CoinType,
    /// Asset identifier (token address) for ERC20 deposits.
    pub asset: String,
    /// Log index of the deposit event.
    pub event_index: u64,
    /// Confirmation mode the observer used.
    pub confirmation_mode: ConfirmationMode,
}

impl MsgVoteInbound {
    /// Basic field validation.
    pub fn validate_basic(&self) -> CrosschainResult<()> {
        if self.creator.is_empty() {
            return Err(CrosschainError::EmptyCreator);
        }
        if self.sender.is_empty() {
            return Err(CrosschainError::EmptySender);
        }
        if self.amount.is_none() {
            return Err(CrosschainError::MissingAmount);
        }
        Ok(())
    }

    /// Key of the finalized-inbound set.
    pub fn finalized_inbound_key(&self) -> String {
        format!(
            "{}-{}-{}",
            self.inbound_hash, self.sender_chain_id, self.event_index
        )
    }
}

/// Observation of an outbound transaction on a destination chain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgVoteOutbound {
    /// Observer submitting the vote. Excluded from the digest.
    pub creator: String,
    /// Index of the CCTX this outbound belongs to.
    pub cctx_hash: String,
    /// Outbound transaction hash.
    pub observed_outbound_hash: String,
    /// Height of the outbound on the destination chain.
    pub observed_outbound_block_height: u64,
    /// Gas used by the outbound.
    pub observed_outbound_gas_used: u64,
    /// Effective gas price paid.
    pub observed_outbound_effective_gas_price: U256,
    /// Effective gas limit.
    pub observed_outbound_effective_gas_limit: u64,
    /// Value received by the destination.
    pub value_received: U256,
    /// Success or failure. Normalized in the digest.
    pub status: ReceiveStatus,
    /// Destination chain.
    pub outbound_chain: ChainId,
    /// Nonce of the outbound.
    pub outbound_tss_nonce: u64,
    /// Asset class.
    pub coin_type: CoinType,
    /// Confirmation mode the observer used. Normalized in the digest.
    pub confirmation_mode: ConfirmationMode,
}

impl MsgVoteOutbound {
    /// Basic field validation.
    pub fn validate_basic(&self) -> CrosschainResult<()> {
        if self.creator.is_empty() {
            return Err(CrosschainError::EmptyCreator);
        }
        invariant_valid_index(&self.cctx_hash)
    }
}
