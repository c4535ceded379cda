//! Crosschain Service - Core business logic
//!
//! Applies finalized ballots, admin commands and the expiry sweep to the
//! store. One operation runs at a time; every replica applying the same
//! sequence reaches the same state.

use crate::algorithms::{
    check_admission, inbound_vote_digest, migrate_custody_funds_cctx, migrate_tss_funds_cctx,
    outbound_vote_digest, plan_sweep, should_sweep, update_custody_pause_cctx,
    whitelist_erc20_cctx, Admission, CommandContext, MigrateCustodyFunds, MigrateTssFunds,
    SweepPlan, UpdateCustodyPause, WhitelistErc20,
};
use crate::config::CrosschainConfig;
use crate::domain::{
    BallotVerdict, BlockContext, CctxStatus, ChainId, CoinType, CrossChainTx, CrosschainError,
    CrosschainResult, GenesisState, MsgVoteInbound, MsgVoteOutbound, OutboundTracker,
    RateLimiterFlags, TxFinalizationStatus, TxHashEntry,
};
use crate::metrics;
use crate::ports::inbound::{CrosschainApi, TssMigrationRequest};
use crate::ports::outbound::{CrosschainStore, ObserverEngine, Tss, TssProvider};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Crosschain service.
pub struct CrosschainService<S, O, T>
where
    S: CrosschainStore,
    O: ObserverEngine,
    T: TssProvider,
{
    config: CrosschainConfig,
    store: Arc<S>,
    observer: Arc<O>,
    tss: Arc<T>,
    apply_lock: Mutex<()>,
}

impl<S, O, T> CrosschainService<S, O, T>
where
    S: CrosschainStore,
    O: ObserverEngine,
    T: TssProvider,
{
    /// Create a new service.
    pub fn new(config: CrosschainConfig, store: Arc<S>, observer: Arc<O>, tss: Arc<T>) -> Self {
        Self {
            config,
            store,
            observer,
            tss,
            apply_lock: Mutex::new(()),
        }
    }

    /// Service configuration.
    pub fn config(&self) -> &CrosschainConfig {
        &self.config
    }

    fn current_tss(&self) -> CrosschainResult<Tss> {
        self.tss.get_tss().ok_or(CrosschainError::TssNotFound)
    }

    fn load(&self, index: &str) -> CrosschainResult<CrossChainTx> {
        self.store
            .get_cctx(index)
            .ok_or_else(|| CrosschainError::CctxNotFound(index.to_string()))
    }

    fn bump_counter(&self) {
        self.store.set_cctx_counter(self.store.cctx_counter() + 1);
    }

    /// Add the aborted amount of a Zeta-coin CCTX that just moved from a
    /// pending state to `Aborted`.
    fn account_abort(&self, before: CctxStatus, cctx: &CrossChainTx) {
        if !before.is_pending()
            || cctx.state() != CctxStatus::Aborted
            || cctx.inbound.coin_type != CoinType::Zeta
        {
            return;
        }
        let mut accounting = self.store.zeta_accounting();
        accounting.aborted_zeta_amount = accounting
            .aborted_zeta_amount
            .saturating_add(cctx.aborted_amount());
        self.store.set_zeta_accounting(accounting);
    }

    fn store_command(&self, cctx: CrossChainTx) -> CrosschainResult<CrossChainTx> {
        if self.store.get_cctx(&cctx.index).is_some() {
            return Err(CrosschainError::CctxAlreadyExists(cctx.index));
        }
        self.store.set_cctx(cctx.clone());
        self.bump_counter();
        metrics::record_cctx_created("command");
        info!(
            "[cctx] Command CCTX {} created: {}",
            cctx.index, cctx.relayed_message
        );
        Ok(cctx)
    }

    /// Re-run admission for throttled CCTXs in index order. Each admission
    /// counts against the window of the ones after it.
    fn readmit_throttled(&self, ctx: &BlockContext) -> usize {
        let flags = self.store.rate_limiter_flags().unwrap_or_default();
        let mut cctxs = self.store.cctxs();
        let mut admitted = 0;

        for i in 0..cctxs.len() {
            if cctxs[i].state() != CctxStatus::PendingInbound {
                continue;
            }
            let others = cctxs
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, cctx)| cctx);
            if !check_admission(&flags, ctx.height, &cctxs[i], others).is_admitted() {
                continue;
            }

            let cctx = &mut cctxs[i];
            cctx.admit("");
            cctx.status.touch(ctx.timestamp);
            self.store.set_cctx(cctx.clone());
            admitted += 1;
            info!(
                "[cctx] Throttled CCTX {} admitted at height {}",
                cctx.index, ctx.height
            );
        }
        admitted
    }

    fn run_sweep(&self, ctx: &BlockContext) -> SweepPlan {
        let cctxs = self.store.cctxs();
        let trackers = self.store.outbound_trackers();
        let plan = plan_sweep(ctx.height, &self.config.expiry, &cctxs, &trackers);

        for index in plan.terminal.iter().chain(plan.abandoned.iter()) {
            self.store.remove_cctx(index);
        }
        for (chain_id, nonce) in &plan.stale_trackers {
            self.store.remove_outbound_tracker(*chain_id, *nonce);
        }

        metrics::record_sweep_removed("terminal", plan.terminal.len());
        metrics::record_sweep_removed("abandoned", plan.abandoned.len());
        metrics::record_sweep_removed("stale_tracker", plan.stale_trackers.len());
        if !plan.is_empty() {
            info!(
                "[cctx] Sweep at height {}: {} terminal, {} abandoned, {} trackers removed",
                ctx.height,
                plan.terminal.len(),
                plan.abandoned.len(),
                plan.stale_trackers.len()
            );
        }
        plan
    }
}

impl<S, O, T> CrosschainApi for CrosschainService<S, O, T>
where
    S: CrosschainStore,
    O: ObserverEngine,
    T: TssProvider,
{
    fn apply_inbound_vote(
        &self,
        ctx: &BlockContext,
        vote: &MsgVoteInbound,
    ) -> CrosschainResult<Option<CrossChainTx>> {
        let _guard = self.apply_lock.lock();
        vote.validate_basic()?;

        let digest = inbound_vote_digest(vote);
        let verdict = match self.observer.is_finalized(&digest) {
            Some(verdict) => verdict,
            None => {
                debug!("[cctx] Inbound ballot {} not finalized", digest);
                return Ok(None);
            }
        };
        if verdict == BallotVerdict::Failure {
            warn!(
                "[cctx] Inbound ballot {} finalized as failure, no CCTX created",
                digest
            );
            return Ok(None);
        }

        let key = vote.finalized_inbound_key();
        if self.store.is_inbound_finalized(&key) {
            return Err(CrosschainError::InboundAlreadyFinalized(key));
        }
        if self.store.get_cctx(&digest).is_some() {
            return Err(CrosschainError::CctxAlreadyExists(digest));
        }

        let tss = self.current_tss()?;
        let mut cctx = CrossChainTx::new(ctx, vote, digest, &tss.tss_pubkey, &self.config.chains)?;

        let flags = self.store.rate_limiter_flags().unwrap_or_default();
        let existing = self.store.cctxs();
        match check_admission(&flags, ctx.height, &cctx, &existing) {
            Admission::Admitted => cctx.admit(""),
            Admission::Throttled {
                window_value,
                value,
                limit,
            } => {
                metrics::record_throttled();
                warn!(
                    "[cctx] CCTX {} throttled: window value {} + {} exceeds limit {}",
                    cctx.index, window_value, value, limit
                );
            }
        }

        self.store.set_inbound_finalized(&key);
        self.store.set_cctx(cctx.clone());
        self.bump_counter();
        metrics::record_cctx_created("inbound");

        info!(
            "[cctx] CCTX {} created from {} on chain {} ({})",
            cctx.index,
            cctx.inbound.observed_hash,
            cctx.inbound.sender_chain_id,
            cctx.state()
        );
        Ok(Some(cctx))
    }

    fn apply_outbound_vote(
        &self,
        ctx: &BlockContext,
        vote: &MsgVoteOutbound,
    ) -> CrosschainResult<Option<CrossChainTx>> {
        let _guard = self.apply_lock.lock();
        vote.validate_basic()?;

        let mut cctx = self.load(&vote.cctx_hash)?;
        let state = cctx.state();
        if !state.is_pending() {
            return Err(CrosschainError::StatusNotPending {
                index: cctx.index,
                status: state.to_string(),
            });
        }

        let (chain_id, nonce, gas_limit) = {
            let (current, present) = cctx.current_outbound();
            if !present {
                return Err(CrosschainError::MissingOutbounds);
            }
            (current.receiver_chain_id, current.tss_nonce, current.gas_limit)
        };
        if chain_id != vote.outbound_chain || nonce != vote.outbound_tss_nonce {
            return Err(CrosschainError::OutboundMismatch(format!(
                "vote for chain {} nonce {}, current outbound is chain {} nonce {}",
                vote.outbound_chain, vote.outbound_tss_nonce, chain_id, nonce
            )));
        }

        let digest = outbound_vote_digest(vote);
        let verdict = match self.observer.is_finalized(&digest) {
            Some(verdict) => verdict,
            None => {
                debug!("[cctx] Outbound ballot {} not finalized", digest);
                return Ok(None);
            }
        };

        cctx.add_outbound(ctx, vote, verdict)?;
        if let Some(leg) = cctx.current_outbound_mut() {
            leg.ballot_index = digest;
            leg.tx_finalization_status = TxFinalizationStatus::Finalized;
        }

        let is_revert = cctx.is_current_outbound_revert();
        match verdict {
            BallotVerdict::Success if is_revert => cctx.set_reverted(""),
            BallotVerdict::Success => cctx.set_outbound_mined(""),
            BallotVerdict::Failure if is_revert => cctx.set_abort("revert failed"),
            BallotVerdict::Failure if cctx.inbound.coin_type == CoinType::Cmd => {
                cctx.set_abort("outbound failed for admin command")
            }
            BallotVerdict::Failure => match cctx.add_revert_outbound(gas_limit) {
                Ok(()) => cctx.set_pending_revert("outbound failed"),
                Err(e) => cctx.set_abort(&e.to_string()),
            },
        }

        self.account_abort(state, &cctx);
        self.store.remove_outbound_tracker(chain_id, nonce);
        self.store.set_cctx(cctx.clone());

        info!(
            "[cctx] Outbound {:?} for CCTX {} applied, now {}",
            verdict,
            cctx.index,
            cctx.state()
        );
        Ok(Some(cctx))
    }

    fn apply_revert(
        &self,
        ctx: &BlockContext,
        index: &str,
        gas_limit: u64,
        msg: &str,
    ) -> CrosschainResult<CrossChainTx> {
        let _guard = self.apply_lock.lock();
        let mut cctx = self.load(index)?;

        let state = cctx.state();
        if !state.is_pending() {
            return Err(CrosschainError::StatusNotPending {
                index: cctx.index,
                status: state.to_string(),
            });
        }

        cctx.add_revert_outbound(gas_limit)?;
        cctx.set_pending_revert(msg);
        cctx.status.touch(ctx.timestamp);

        self.account_abort(state, &cctx);
        self.store.set_cctx(cctx.clone());
        info!("[cctx] CCTX {} reverting: {}", cctx.index, cctx.state());
        Ok(cctx)
    }

    fn apply_abort(
        &self,
        ctx: &BlockContext,
        index: &str,
        msg: &str,
    ) -> CrosschainResult<CrossChainTx> {
        let _guard = self.apply_lock.lock();
        let mut cctx = self.load(index)?;

        let state = cctx.state();
        if !state.is_pending() {
            return Err(CrosschainError::StatusNotPending {
                index: cctx.index,
                status: state.to_string(),
            });
        }

        cctx.set_abort(msg);
        cctx.status.touch(ctx.timestamp);

        self.account_abort(state, &cctx);
        self.store.set_cctx(cctx.clone());
        warn!("[cctx] CCTX {} aborted: {}", cctx.index, msg);
        Ok(cctx)
    }

    fn apply_refund(&self, ctx: &BlockContext, index: &str) -> CrosschainResult<CrossChainTx> {
        let _guard = self.apply_lock.lock();
        let mut cctx = self.load(index)?;

        if cctx.state() != CctxStatus::Aborted {
            return Err(CrosschainError::NotAborted(cctx.index));
        }
        if cctx.status.is_abort_refunded() {
            return Err(CrosschainError::AlreadyRefunded(cctx.index));
        }
        if cctx.inbound.coin_type == CoinType::Cmd {
            return Err(CrosschainError::InvalidRequest(format!(
                "cannot refund admin command {}",
                cctx.index
            )));
        }

        if cctx.inbound.coin_type == CoinType::Zeta {
            let mut accounting = self.store.zeta_accounting();
            accounting.aborted_zeta_amount = accounting
                .aborted_zeta_amount
                .saturating_sub(cctx.aborted_amount());
            self.store.set_zeta_accounting(accounting);
        }

        cctx.status.abort_refunded(ctx.timestamp);
        self.store.set_cctx(cctx.clone());
        metrics::record_refund();
        info!("[cctx] CCTX {} refunded", cctx.index);
        Ok(cctx)
    }

    fn add_outbound_tracker(
        &self,
        ctx: &BlockContext,
        chain_id: ChainId,
        nonce: u64,
        tx_hash: &str,
        submitter: &str,
    ) -> CrosschainResult<OutboundTracker> {
        let _guard = self.apply_lock.lock();
        if !self.config.chains.contains(chain_id) {
            return Err(CrosschainError::UnknownChain(chain_id));
        }

        let mut tracker = self
            .store
            .get_outbound_tracker(chain_id, nonce)
            .unwrap_or_else(|| OutboundTracker::new(chain_id, nonce, ctx.height));

        if tracker.contains_hash(tx_hash) {
            debug!(
                "[cctx] Hash {} already tracked for {}",
                tx_hash, tracker.index
            );
            return Ok(tracker);
        }
        if tracker.max_reached() {
            metrics::record_tracker_rejection();
            warn!("[cctx] Tracker {} is full, refusing {}", tracker.index, tx_hash);
            return Err(CrosschainError::TrackerMaxReached { chain_id, nonce });
        }

        tracker.hash_list.push(TxHashEntry::new(tx_hash, submitter));
        self.store.set_outbound_tracker(tracker.clone());
        debug!(
            "[cctx] Tracker {} now holds {} hashes",
            tracker.index,
            tracker.hash_list.len()
        );
        Ok(tracker)
    }

    fn remove_outbound_tracker(&self, chain_id: ChainId, nonce: u64) -> CrosschainResult<()> {
        let _guard = self.apply_lock.lock();
        if !self.store.remove_outbound_tracker(chain_id, nonce) {
            return Err(CrosschainError::TrackerNotFound { chain_id, nonce });
        }
        info!(
            "[cctx] Tracker {} removed",
            OutboundTracker::key(chain_id, nonce)
        );
        Ok(())
    }

    fn update_rate_limiter_flags(&self, flags: RateLimiterFlags) -> CrosschainResult<()> {
        let _guard = self.apply_lock.lock();
        flags.validate()?;
        info!(
            "[cctx] Rate limiter flags updated (enabled: {}, window: {}, rate: {})",
            flags.enabled, flags.window, flags.rate
        );
        self.store.set_rate_limiter_flags(flags);
        Ok(())
    }

    fn whitelist_erc20(
        &self,
        ctx: &BlockContext,
        creator: &str,
        params: &WhitelistErc20,
    ) -> CrosschainResult<CrossChainTx> {
        let _guard = self.apply_lock.lock();
        let tss = self.current_tss()?;
        let cmd = CommandContext {
            creator,
            host_chain_id: self.config.host_chain_id,
            tss_pubkey: &tss.tss_pubkey,
            block: *ctx,
            chains: &self.config.chains,
        };
        let cctx = whitelist_erc20_cctx(&cmd, params)?;
        self.store_command(cctx)
    }

    fn update_custody_pause(
        &self,
        ctx: &BlockContext,
        creator: &str,
        params: &UpdateCustodyPause,
    ) -> CrosschainResult<CrossChainTx> {
        let _guard = self.apply_lock.lock();
        let tss = self.current_tss()?;
        let cmd = CommandContext {
            creator,
            host_chain_id: self.config.host_chain_id,
            tss_pubkey: &tss.tss_pubkey,
            block: *ctx,
            chains: &self.config.chains,
        };
        let cctx = update_custody_pause_cctx(&cmd, params)?;
        self.store_command(cctx)
    }

    fn migrate_custody_funds(
        &self,
        ctx: &BlockContext,
        creator: &str,
        params: &MigrateCustodyFunds,
    ) -> CrosschainResult<CrossChainTx> {
        let _guard = self.apply_lock.lock();
        let tss = self.current_tss()?;
        let cmd = CommandContext {
            creator,
            host_chain_id: self.config.host_chain_id,
            tss_pubkey: &tss.tss_pubkey,
            block: *ctx,
            chains: &self.config.chains,
        };
        let cctx = migrate_custody_funds_cctx(&cmd, params)?;
        self.store_command(cctx)
    }

    fn migrate_tss_funds(
        &self,
        ctx: &BlockContext,
        creator: &str,
        request: &TssMigrationRequest,
    ) -> CrosschainResult<CrossChainTx> {
        let _guard = self.apply_lock.lock();
        let current = self.current_tss()?;
        let newest = self
            .tss
            .get_tss_history()
            .pop()
            .ok_or(CrosschainError::TssNotFound)?;
        if newest.tss_pubkey == current.tss_pubkey {
            return Err(CrosschainError::InvalidRequest(
                "no new TSS has been generated".to_string(),
            ));
        }

        if let Some(pending) = self
            .observer
            .get_pending_nonces(&current.tss_pubkey, request.chain_id)
        {
            if !pending.is_empty() {
                return Err(CrosschainError::InvalidRequest(format!(
                    "cannot migrate funds while nonces {}..{} are pending on chain {}",
                    pending.nonce_low, pending.nonce_high, request.chain_id
                )));
            }
        }

        let new_tss_address = self
            .tss
            .tss_address(&newest.tss_pubkey, request.chain_id)
            .ok_or(CrosschainError::TssNotFound)?;

        let cmd = CommandContext {
            creator,
            host_chain_id: self.config.host_chain_id,
            tss_pubkey: &current.tss_pubkey,
            block: *ctx,
            chains: &self.config.chains,
        };
        let params = MigrateTssFunds {
            chain_id: request.chain_id,
            current_tss_pubkey: current.tss_pubkey.clone(),
            new_tss_pubkey: newest.tss_pubkey.clone(),
            new_tss_address,
            amount: request.amount,
            median_gas_price: request.median_gas_price,
            gas_priority_fee: request.gas_priority_fee,
            inbound_tag: format!("tss-migration-{}-{}", request.chain_id, ctx.height),
        };
        let cctx = migrate_tss_funds_cctx(&cmd, &params)?;
        self.store_command(cctx)
    }

    fn get_cctx(&self, index: &str) -> Option<CrossChainTx> {
        self.store.get_cctx(index)
    }

    fn find_pending_cctx(&self, chain_id: ChainId, nonce: u64) -> CrosschainResult<CrossChainTx> {
        let tss = self.current_tss()?;
        let index = self
            .observer
            .get_nonce_to_cctx(&tss.tss_pubkey, chain_id, nonce)
            .ok_or_else(|| {
                CrosschainError::CctxNotFound(OutboundTracker::key(chain_id, nonce))
            })?;
        let cctx = self.load(&index)?;
        if !cctx.state().is_pending() {
            return Err(CrosschainError::StatusNotPending {
                index: cctx.index,
                status: cctx.status.state().to_string(),
            });
        }
        Ok(cctx)
    }

    fn list_pending_cctxs(&self, chain_id: ChainId) -> CrosschainResult<Vec<CrossChainTx>> {
        let tss = self.current_tss()?;
        let pending = match self.observer.get_pending_nonces(&tss.tss_pubkey, chain_id) {
            Some(pending) => pending,
            None => return Ok(Vec::new()),
        };

        let mut cctxs = Vec::new();
        for nonce in pending.nonce_low..pending.nonce_high {
            let Some(index) = self
                .observer
                .get_nonce_to_cctx(&tss.tss_pubkey, chain_id, nonce)
            else {
                continue;
            };
            if let Some(cctx) = self.store.get_cctx(&index) {
                if cctx.state().is_pending() {
                    cctxs.push(cctx);
                }
            }
        }
        Ok(cctxs)
    }

    fn end_block(&self, ctx: &BlockContext) -> SweepPlan {
        let _guard = self.apply_lock.lock();
        self.readmit_throttled(ctx);
        if !should_sweep(ctx.height, &self.config.expiry) {
            return SweepPlan::default();
        }
        self.run_sweep(ctx)
    }

    fn export_genesis(&self) -> GenesisState {
        let _guard = self.apply_lock.lock();
        GenesisState {
            cctxs: self.store.cctxs(),
            outbound_trackers: self.store.outbound_trackers(),
            rate_limiter_flags: self.store.rate_limiter_flags().unwrap_or_default(),
            cctx_counter: self.store.cctx_counter(),
            zeta_accounting: self.store.zeta_accounting(),
            finalized_inbounds: self.store.finalized_inbounds(),
        }
    }

    fn import_genesis(&self, state: GenesisState) -> CrosschainResult<()> {
        let _guard = self.apply_lock.lock();
        state.validate(&self.config.chains)?;

        let cctx_count = state.cctxs.len();
        for cctx in state.cctxs {
            self.store.set_cctx(cctx);
        }
        for tracker in state.outbound_trackers {
            self.store.set_outbound_tracker(tracker);
        }
        for key in &state.finalized_inbounds {
            self.store.set_inbound_finalized(key);
        }
        self.store.set_rate_limiter_flags(state.rate_limiter_flags);
        self.store.set_cctx_counter(state.cctx_counter);
        self.store.set_zeta_accounting(state.zeta_accounting);

        info!("[cctx] Genesis imported with {} CCTXs", cctx_count);
        Ok(())
    }
}
