//! # Inbound Ports
//!
//! API trait defining what the crosschain module can do.

use crate::algorithms::{MigrateCustodyFunds, SweepPlan, UpdateCustodyPause, WhitelistErc20};
use crate::domain::{
    BlockContext, ChainId, CrossChainTx, CrosschainResult, GenesisState, MsgVoteInbound,
    MsgVoteOutbound, OutboundTracker, RateLimiterFlags,
};
use primitive_types::U256;

/// TSS fund migration request. The new TSS and its address come from the
/// TSS registry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TssMigrationRequest {
    /// Connected chain.
    pub chain_id: ChainId,
    /// Balance to move.
    pub amount: U256,
    /// Median gas price on the chain.
    pub median_gas_price: U256,
    /// Priority fee on the chain.
    pub gas_priority_fee: U256,
}

/// Crosschain API - inbound port.
///
/// Mutators return the stored CCTX. `Ok(None)` from a vote means its ballot
/// has not been finalized yet.
pub trait CrosschainApi: Send + Sync {
    /// Apply an inbound observation.
    fn apply_inbound_vote(
        &self,
        ctx: &BlockContext,
        vote: &MsgVoteInbound,
    ) -> CrosschainResult<Option<CrossChainTx>>;

    /// Apply an outbound observation.
    fn apply_outbound_vote(
        &self,
        ctx: &BlockContext,
        vote: &MsgVoteOutbound,
    ) -> CrosschainResult<Option<CrossChainTx>>;

    /// Add a revert leg and move to `PendingRevert`.
    fn apply_revert(
        &self,
        ctx: &BlockContext,
        index: &str,
        gas_limit: u64,
        msg: &str,
    ) -> CrosschainResult<CrossChainTx>;

    /// Abort a pending CCTX.
    fn apply_abort(&self, ctx: &BlockContext, index: &str, msg: &str)
        -> CrosschainResult<CrossChainTx>;

    /// Mark an aborted CCTX as refunded.
    fn apply_refund(&self, ctx: &BlockContext, index: &str) -> CrosschainResult<CrossChainTx>;

    /// Record an outbound hash candidate.
    fn add_outbound_tracker(
        &self,
        ctx: &BlockContext,
        chain_id: ChainId,
        nonce: u64,
        tx_hash: &str,
        submitter: &str,
    ) -> CrosschainResult<OutboundTracker>;

    /// Remove the tracker for (chain, nonce).
    fn remove_outbound_tracker(&self, chain_id: ChainId, nonce: u64) -> CrosschainResult<()>;

    /// Validate and store the rate limiter flags.
    fn update_rate_limiter_flags(&self, flags: RateLimiterFlags) -> CrosschainResult<()>;

    /// Whitelist an ERC20 token.
    fn whitelist_erc20(
        &self,
        ctx: &BlockContext,
        creator: &str,
        params: &WhitelistErc20,
    ) -> CrosschainResult<CrossChainTx>;

    /// Pause or unpause the ERC20 custody contract.
    fn update_custody_pause(
        &self,
        ctx: &BlockContext,
        creator: &str,
        params: &UpdateCustodyPause,
    ) -> CrosschainResult<CrossChainTx>;

    /// Migrate ERC20 custody funds.
    fn migrate_custody_funds(
        &self,
        ctx: &BlockContext,
        creator: &str,
        params: &MigrateCustodyFunds,
    ) -> CrosschainResult<CrossChainTx>;

    /// Migrate funds from the current TSS to the newest one.
    fn migrate_tss_funds(
        &self,
        ctx: &BlockContext,
        creator: &str,
        request: &TssMigrationRequest,
    ) -> CrosschainResult<CrossChainTx>;

    /// Load a CCTX.
    fn get_cctx(&self, index: &str) -> Option<CrossChainTx>;

    /// Pending CCTX assigned to (chain, nonce) under the current TSS.
    fn find_pending_cctx(&self, chain_id: ChainId, nonce: u64) -> CrosschainResult<CrossChainTx>;

    /// Pending CCTXs on a chain, by nonce.
    fn list_pending_cctxs(&self, chain_id: ChainId) -> CrosschainResult<Vec<CrossChainTx>>;

    /// End-of-block hook: retries admission of throttled CCTXs, then runs the
    /// expiry sweep on its interval.
    fn end_block(&self, ctx: &BlockContext) -> SweepPlan;

    /// Export the whole module state.
    fn export_genesis(&self) -> GenesisState;

    /// Validate and import a module state.
    fn import_genesis(&self, state: GenesisState) -> CrosschainResult<()>;
}
