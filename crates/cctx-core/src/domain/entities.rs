//! # Domain Entities
//!
//! The cross-chain transaction aggregate and its legs.
//!
//! A CCTX holds one inbound leg and at most two outbound legs: element 0 is
//! the original outbound attempt, element 1 (if present) is the revert.

use super::errors::{CrosschainError, CrosschainResult};
use super::invariants::{invariant_outbound_count, invariant_valid_index, MAX_OUTBOUND_LEGS};
use super::status::{CctxStatus, Status};
use super::value_objects::{
    BallotVerdict, BlockContext, ChainId, ChainRegistry, CoinType, ConfirmationMode,
    TxFinalizationStatus,
};
use super::votes::{MsgVoteInbound, MsgVoteOutbound};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::{debug, warn};

/// Source-chain leg. Immutable once the CCTX is built.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundParams {
    /// Sender on the source chain.
    pub sender: String,
    /// Source chain.
    pub sender_chain_id: ChainId,
    /// Transaction origin.
    pub tx_origin: String,
    /// Asset class.
    pub coin_type: CoinType,
    /// Asset identifier.
    pub asset: String,
    /// Amount deposited.
    pub amount: U256,
    /// Inbound transaction hash.
    pub observed_hash: String,
    /// Inbound height on the source chain.
    pub observed_external_height: u64,
    /// Ballot that finalized the inbound.
    pub ballot_index: String,
    /// Host-chain height at which the inbound was finalized.
    pub finalized_zeta_height: u64,
    /// Finalization progress.
    pub tx_finalization_status: TxFinalizationStatus,
}

impl InboundParams {
    /// Field validation.
    pub fn validate(&self, chains: &ChainRegistry) -> CrosschainResult<()> {
        if self.sender.is_empty() {
            return Err(CrosschainError::EmptySender);
        }
        if !chains.contains(self.sender_chain_id) {
            return Err(CrosschainError::UnknownChain(self.sender_chain_id));
        }
        Ok(())
    }
}

/// Destination-chain leg. Updated in place by outbound votes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundParams {
    /// Receiver on the destination chain.
    pub receiver: String,
    /// Destination chain.
    pub receiver_chain_id: ChainId,
    /// Asset class.
    pub coin_type: CoinType,
    /// Amount to send.
    pub amount: U256,
    /// Nonce assigned to the outbound.
    pub tss_nonce: u64,
    /// Gas limit.
    pub gas_limit: u64,
    /// Gas price.
    pub gas_price: U256,
    /// Priority fee.
    pub gas_priority_fee: U256,
    /// Observed outbound hash.
    pub hash: String,
    /// Ballot that finalized the outbound.
    pub ballot_index: String,
    /// Observed height on the destination chain.
    pub observed_external_height: u64,
    /// Gas used.
    pub gas_used: u64,
    /// Effective gas price.
    pub effective_gas_price: U256,
    /// Effective gas limit.
    pub effective_gas_limit: u64,
    /// TSS public key that signs this leg.
    pub tss_pubkey: String,
    /// Finalization progress.
    pub tx_finalization_status: TxFinalizationStatus,
    /// Confirmation mode.
    pub confirmation_mode: ConfirmationMode,
}

impl OutboundParams {
    /// Field validation.
    pub fn validate(&self, chains: &ChainRegistry) -> CrosschainResult<()> {
        if self.receiver.is_empty() {
            return Err(CrosschainError::EmptyReceiver);
        }
        if !chains.contains(self.receiver_chain_id) {
            return Err(CrosschainError::UnknownChain(self.receiver_chain_id));
        }
        Ok(())
    }
}

/// Cross-chain transaction aggregate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossChainTx {
    /// Originating account; empty for observed transfers.
    pub creator: String,
    /// `0x` + 64 hex characters; never reassigned once set.
    pub index: String,
    /// Fees charged on the host chain.
    pub zeta_fees: U256,
    /// Message relayed to the destination.
    pub relayed_message: String,
    /// Status record.
    pub status: Status,
    /// Source leg.
    pub inbound: InboundParams,
    /// Outbound legs (0..=2).
    pub outbound: Vec<OutboundParams>,
}

impl CrossChainTx {
    /// Build a CCTX from a finalized inbound vote.
    ///
    /// `index` is the vote digest. The CCTX starts in `PendingInbound` with a
    /// single zero-amount, zero-nonce outbound leg.
    pub fn new(
        ctx: &BlockContext,
        vote: &MsgVoteInbound,
        index: String,
        tss_pubkey: &str,
        chains: &ChainRegistry,
    ) -> CrosschainResult<Self> {
        vote.validate_basic()?;
        let amount = vote.amount.ok_or(CrosschainError::MissingAmount)?;

        let tx_origin = if vote.tx_origin.is_empty() {
            vote.sender.clone()
        } else {
            vote.tx_origin.clone()
        };

        let inbound = InboundParams {
            sender: vote.sender.clone(),
            sender_chain_id: vote.sender_chain_id,
            tx_origin,
            coin_type: vote.coin_type,
            asset: vote.asset.clone(),
            amount,
            observed_hash: vote.inbound_hash.clone(),
            observed_external_height: vote.inbound_block_height,
            ballot_index: index.clone(),
            finalized_zeta_height: ctx.height,
            tx_finalization_status: TxFinalizationStatus::Finalized,
        };

        let outbound = OutboundParams {
            receiver: vote.receiver.clone(),
            receiver_chain_id: vote.receiver_chain,
            coin_type: vote.coin_type,
            amount: U256::zero(),
            tss_nonce: 0,
            gas_limit: vote.gas_limit,
            tss_pubkey: tss_pubkey.to_string(),
            confirmation_mode: vote.confirmation_mode,
            ..Default::default()
        };

        let cctx = Self {
            creator: vote.creator.clone(),
            index,
            zeta_fees: U256::zero(),
            relayed_message: vote.message.clone(),
            status: Status::new(CctxStatus::PendingInbound, ctx.timestamp),
            inbound,
            outbound: vec![outbound],
        };
        cctx.validate(chains)?;

        debug!("[cctx] Built CCTX {} from inbound {}", cctx.index, vote.inbound_hash);
        Ok(cctx)
    }

    /// Structural validation of the whole aggregate.
    pub fn validate(&self, chains: &ChainRegistry) -> CrosschainResult<()> {
        invariant_outbound_count(self.outbound.len())?;
        if !self.index.is_empty() {
            invariant_valid_index(&self.index)?;
        }
        self.inbound.validate(chains)?;
        for leg in &self.outbound {
            leg.validate(chains)?;
        }
        Ok(())
    }

    /// Current state.
    pub fn state(&self) -> CctxStatus {
        self.status.state()
    }

    /// Current outbound leg and whether it exists.
    ///
    /// With no outbound legs this yields a zero-value leg and `false`.
    pub fn current_outbound(&self) -> (Cow<'_, OutboundParams>, bool) {
        match self.outbound.last() {
            Some(leg) => (Cow::Borrowed(leg), true),
            None => (Cow::Owned(OutboundParams::default()), false),
        }
    }

    /// Mutable access to the current outbound leg.
    pub fn current_outbound_mut(&mut self) -> Option<&mut OutboundParams> {
        self.outbound.last_mut()
    }

    /// Whether the current outbound leg is the revert.
    pub fn is_current_outbound_revert(&self) -> bool {
        self.outbound.len() >= MAX_OUTBOUND_LEGS
    }

    /// Apply a finalized outbound observation to the current leg.
    ///
    /// For a non-failure verdict `value_received` must equal the leg amount.
    /// On error the CCTX is left untouched.
    pub fn add_outbound(
        &mut self,
        ctx: &BlockContext,
        vote: &MsgVoteOutbound,
        verdict: BallotVerdict,
    ) -> CrosschainResult<()> {
        let leg = self
            .outbound
            .last_mut()
            .ok_or(CrosschainError::MissingOutbounds)?;

        if verdict != BallotVerdict::Failure && vote.value_received != leg.amount {
            warn!(
                "[cctx] Value received {} does not match sent value {} for {}",
                vote.value_received, leg.amount, self.index
            );
            return Err(CrosschainError::InvalidRequest(format!(
                "value received {} does not match sent value {}",
                vote.value_received, leg.amount
            )));
        }

        leg.hash = vote.observed_outbound_hash.clone();
        leg.gas_used = vote.observed_outbound_gas_used;
        leg.effective_gas_price = vote.observed_outbound_effective_gas_price;
        leg.effective_gas_limit = vote.observed_outbound_effective_gas_limit;
        leg.observed_external_height = vote.observed_outbound_block_height;
        self.status.touch(ctx.timestamp);
        Ok(())
    }

    /// Append a revert leg sending the inbound amount back to the sender.
    pub fn add_revert_outbound(&mut self, gas_limit: u64) -> CrosschainResult<()> {
        if self.is_current_outbound_revert() {
            return Err(CrosschainError::CannotRevertRevert);
        }
        let current = self
            .outbound
            .last_mut()
            .ok_or(CrosschainError::CannotRevertBeforeOutbound)?;

        current.tx_finalization_status = TxFinalizationStatus::Executed;
        let revert = OutboundParams {
            receiver: self.inbound.sender.clone(),
            receiver_chain_id: self.inbound.sender_chain_id,
            coin_type: self.inbound.coin_type,
            amount: self.inbound.amount,
            gas_limit,
            tss_pubkey: current.tss_pubkey.clone(),
            ..Default::default()
        };
        self.outbound.push(revert);
        Ok(())
    }

    /// Move to `Aborted`.
    pub fn set_abort(&mut self, msg: &str) {
        self.status.change_status(CctxStatus::Aborted, msg);
    }

    /// Move to `PendingRevert`.
    pub fn set_pending_revert(&mut self, msg: &str) {
        self.status.change_status(CctxStatus::PendingRevert, msg);
    }

    /// Move to `PendingOutbound`.
    pub fn set_pending_outbound(&mut self, msg: &str) {
        self.status.change_status(CctxStatus::PendingOutbound, msg);
    }

    /// Admit a `PendingInbound` CCTX: the outbound leg takes the inbound
    /// amount and the CCTX moves to `PendingOutbound`.
    pub fn admit(&mut self, msg: &str) {
        let amount = self.inbound.amount;
        if let Some(leg) = self.current_outbound_mut() {
            leg.amount = amount;
        }
        self.set_pending_outbound(msg);
    }

    /// Move to `OutboundMined`.
    pub fn set_outbound_mined(&mut self, msg: &str) {
        self.status.change_status(CctxStatus::OutboundMined, msg);
    }

    /// Move to `Reverted`.
    pub fn set_reverted(&mut self, msg: &str) {
        self.status.change_status(CctxStatus::Reverted, msg);
    }

    /// Amount lost by an abort: the current outbound amount if non-zero,
    /// otherwise the inbound amount.
    pub fn aborted_amount(&self) -> U256 {
        let (leg, _) = self.current_outbound();
        if leg.amount.is_zero() {
            self.inbound.amount
        } else {
            leg.amount
        }
    }
}
