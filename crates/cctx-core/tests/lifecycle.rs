//! # CCTX Lifecycle Tests
//!
//! Drive `CrosschainService` through full lifecycles against the in-memory
//! adapters.
//!
//! ## Test Categories
//!
//! 1. **Happy path** - inbound, tracker, outbound, sweep
//! 2. **Failure paths** - amount mismatch, revert, abort, refund
//! 3. **Admin commands** - custody and whitelist CCTXs
//! 4. **State export** - genesis JSON round trip

use std::sync::Arc;

use cctx_core::{
    inbound_vote_digest, outbound_vote_digest, BallotStatus, BlockContext, CctxStatus, CoinType,
    CrossChainTx, CrosschainApi, CrosschainConfig, CrosschainError, CrosschainService,
    DecimalRate, ExpiryConfig, GenesisState, InMemoryStore, MigrateCustodyFunds, MsgVoteInbound,
    MsgVoteOutbound, RateLimiterFlags, ReceiveStatus, StaticObserverEngine, StaticTssProvider,
    WhitelistErc20,
};
use cctx_core::domain::{Conversion, TxHashEntry, MAX_OUTBOUND_TRACKER_HASHES};
use primitive_types::U256;

// =============================================================================
// TEST HELPERS
// =============================================================================

const TSS: &str = "zetapub1addwnpepqtss";

type Service = CrosschainService<InMemoryStore, StaticObserverEngine, StaticTssProvider>;

struct Harness {
    service: Service,
    observer: Arc<StaticObserverEngine>,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(CrosschainConfig::default())
    }

    fn with_config(config: CrosschainConfig) -> Self {
        let observer = Arc::new(StaticObserverEngine::with_observers(&[
            "observer-1",
            "observer-2",
            "observer-3",
        ]));
        let service = CrosschainService::new(
            config,
            Arc::new(InMemoryStore::new()),
            Arc::clone(&observer),
            Arc::new(StaticTssProvider::new(TSS)),
        );
        Self { service, observer }
    }

    fn inbound(&self, vote: &MsgVoteInbound, height: u64) -> CrossChainTx {
        self.observer
            .set_ballot(&inbound_vote_digest(vote), BallotStatus::FinalizedSuccess);
        self.service
            .apply_inbound_vote(&block(height), vote)
            .expect("inbound vote applies")
            .expect("ballot is finalized")
    }

    fn outbound(
        &self,
        vote: &MsgVoteOutbound,
        ballot: BallotStatus,
        height: u64,
    ) -> Result<Option<CrossChainTx>, CrosschainError> {
        self.observer.set_ballot(&outbound_vote_digest(vote), ballot);
        self.service.apply_outbound_vote(&block(height), vote)
    }
}

fn block(height: u64) -> BlockContext {
    BlockContext::new(height, 1_700_000_000 + height as i64 * 6)
}

fn deposit(hash: &str, coin_type: CoinType, asset: &str, amount: u64) -> MsgVoteInbound {
    MsgVoteInbound {
        creator: "observer-1".to_string(),
        sender: "0x1111111111111111111111111111111111111111".to_string(),
        sender_chain_id: 1,
        receiver: "0x2222222222222222222222222222222222222222".to_string(),
        receiver_chain: 56,
        amount: Some(U256::from(amount)),
        inbound_hash: hash.to_string(),
        inbound_block_height: 19_000_000,
        gas_limit: 250_000,
        coin_type,
        asset: asset.to_string(),
        ..Default::default()
    }
}

fn observed(cctx: &CrossChainTx, status: ReceiveStatus, value_received: U256) -> MsgVoteOutbound {
    let (leg, _) = cctx.current_outbound();
    MsgVoteOutbound {
        creator: "observer-2".to_string(),
        cctx_hash: cctx.index.clone(),
        observed_outbound_hash: format!("0xoutbound{}", cctx.outbound.len()),
        observed_outbound_block_height: 35_000_000,
        observed_outbound_gas_used: 42_000,
        observed_outbound_effective_gas_price: U256::from(3_000_000_000u64),
        observed_outbound_effective_gas_limit: 250_000,
        value_received,
        status,
        outbound_chain: leg.receiver_chain_id,
        outbound_tss_nonce: leg.tss_nonce,
        coin_type: leg.coin_type,
        confirmation_mode: leg.confirmation_mode,
    }
}

// =============================================================================
// HAPPY PATH
// =============================================================================

#[test]
fn test_deposit_to_outbound_mined_and_swept() {
    let h = Harness::new();
    let cctx = h.inbound(&deposit("0xdeposit1", CoinType::Gas, "", 1_000), 100);
    assert_eq!(cctx.state(), CctxStatus::PendingOutbound);
    assert_eq!(cctx.inbound.tx_origin, cctx.inbound.sender);
    assert_eq!(cctx.outbound[0].amount, U256::from(1_000u64));

    h.service
        .add_outbound_tracker(&block(101), 56, 0, "0xoutbound1", "observer-2")
        .unwrap();

    // Pending ballot: nothing happens yet.
    let vote = observed(&cctx, ReceiveStatus::Success, U256::from(1_000u64));
    h.observer
        .set_ballot(&outbound_vote_digest(&vote), BallotStatus::InProgress);
    assert_eq!(h.service.apply_outbound_vote(&block(102), &vote), Ok(None));

    let mined = h
        .outbound(&vote, BallotStatus::FinalizedSuccess, 103)
        .unwrap()
        .unwrap();
    assert_eq!(mined.state(), CctxStatus::OutboundMined);
    assert_eq!(mined.outbound[0].hash, "0xoutbound1");
    assert_eq!(mined.outbound[0].gas_used, 42_000);
    assert_eq!(mined.outbound[0].amount, U256::from(1_000u64));
    assert_eq!(mined.outbound[0].ballot_index, outbound_vote_digest(&vote));
    assert_eq!(mined.status.last_update_timestamp(), block(103).timestamp);
    assert!(h.service.export_genesis().outbound_trackers.is_empty());

    let plan = h.service.end_block(&block(600));
    assert_eq!(plan.terminal, vec![mined.index.clone()]);
    assert!(h.service.get_cctx(&mined.index).is_none());
    // Finalized inbounds survive the sweep.
    assert_eq!(h.service.export_genesis().finalized_inbounds.len(), 1);
}

#[test]
fn test_duplicate_votes_from_other_observers_are_idempotent() {
    let h = Harness::new();
    let vote = deposit("0xdeposit2", CoinType::Gas, "", 10);
    let cctx = h.inbound(&vote, 10);

    let other_observer = MsgVoteInbound {
        creator: "observer-3".to_string(),
        inbound_block_height: 19_000_001,
        ..vote
    };
    assert_eq!(inbound_vote_digest(&other_observer), cctx.index);
    assert_eq!(
        h.service.apply_inbound_vote(&block(11), &other_observer),
        Err(CrosschainError::InboundAlreadyFinalized(
            other_observer.finalized_inbound_key()
        ))
    );
}

// =============================================================================
// FAILURE PATHS
// =============================================================================

#[test]
fn test_amount_mismatch_leaves_cctx_untouched() {
    let h = Harness::new();
    let cctx = h.inbound(&deposit("0xdeposit3", CoinType::Gas, "", 1_000), 10);

    let vote = observed(&cctx, ReceiveStatus::Success, U256::from(5u64));
    let result = h.outbound(&vote, BallotStatus::FinalizedSuccess, 11);
    assert!(matches!(result, Err(CrosschainError::InvalidRequest(_))));
    assert_eq!(h.service.get_cctx(&cctx.index), Some(cctx));
}

#[test]
fn test_failed_outbound_reverts_to_sender() {
    let h = Harness::new();
    let cctx = h.inbound(&deposit("0xdeposit4", CoinType::Erc20, "0xusdc", 700), 10);

    let failed = observed(&cctx, ReceiveStatus::Failed, U256::zero());
    let reverting = h
        .outbound(&failed, BallotStatus::FinalizedFailure, 11)
        .unwrap()
        .unwrap();
    assert_eq!(reverting.state(), CctxStatus::PendingRevert);
    assert!(reverting.is_current_outbound_revert());

    let (revert_leg, _) = reverting.current_outbound();
    assert_eq!(revert_leg.receiver, reverting.inbound.sender);
    assert_eq!(revert_leg.receiver_chain_id, 1);
    assert_eq!(revert_leg.amount, U256::from(700u64));
    assert!(reverting.status.status_message().contains("outbound failed"));

    let revert_vote = observed(&reverting, ReceiveStatus::Success, U256::from(700u64));
    let reverted = h
        .outbound(&revert_vote, BallotStatus::FinalizedSuccess, 12)
        .unwrap()
        .unwrap();
    assert_eq!(reverted.state(), CctxStatus::Reverted);

    // Reverted CCTXs are kept by the sweep.
    assert!(h.service.end_block(&block(600)).is_empty());
    assert!(h.service.get_cctx(&reverted.index).is_some());
}

#[test]
fn test_terminal_cctx_rejects_further_votes() {
    let h = Harness::new();
    let cctx = h.inbound(&deposit("0xdeposit5", CoinType::Gas, "", 1), 10);
    let aborted = h
        .service
        .apply_abort(&block(11), &cctx.index, "manual abort")
        .unwrap();

    let vote = observed(&aborted, ReceiveStatus::Success, U256::zero());
    assert!(matches!(
        h.outbound(&vote, BallotStatus::FinalizedSuccess, 12),
        Err(CrosschainError::StatusNotPending { .. })
    ));
    assert!(matches!(
        h.service.apply_revert(&block(12), &aborted.index, 50_000, "late revert"),
        Err(CrosschainError::StatusNotPending { .. })
    ));
    assert!(matches!(
        h.service.apply_abort(&block(12), &aborted.index, "late abort"),
        Err(CrosschainError::StatusNotPending { .. })
    ));
    assert_eq!(h.service.get_cctx(&aborted.index), Some(aborted));
}

#[test]
fn test_mined_cctx_cannot_be_reverted_or_refunded() {
    let h = Harness::new();
    let cctx = h.inbound(&deposit("0xzeta3", CoinType::Zeta, "", 400), 10);
    let vote = observed(&cctx, ReceiveStatus::Success, U256::from(400u64));
    let mined = h
        .outbound(&vote, BallotStatus::FinalizedSuccess, 11)
        .unwrap()
        .unwrap();
    assert_eq!(mined.state(), CctxStatus::OutboundMined);

    assert!(matches!(
        h.service.apply_revert(&block(12), &mined.index, 50_000, "late"),
        Err(CrosschainError::StatusNotPending { .. })
    ));
    assert_eq!(
        h.service.apply_refund(&block(13), &mined.index),
        Err(CrosschainError::NotAborted(mined.index.clone()))
    );
    assert_eq!(h.service.get_cctx(&mined.index), Some(mined));
    assert!(h
        .service
        .export_genesis()
        .zeta_accounting
        .aborted_zeta_amount
        .is_zero());
}

#[test]
fn test_zeta_abort_and_refund_accounting() {
    let h = Harness::new();
    let a = h.inbound(&deposit("0xzeta1", CoinType::Zeta, "", 300), 10);
    let b = h.inbound(&deposit("0xzeta2", CoinType::Zeta, "", 200), 10);

    h.service.apply_abort(&block(11), &a.index, "stuck").unwrap();
    h.service.apply_abort(&block(11), &b.index, "stuck").unwrap();
    assert_eq!(
        h.service.export_genesis().zeta_accounting.aborted_zeta_amount,
        U256::from(500u64)
    );

    // A second abort or a revert of an aborted CCTX changes nothing.
    assert!(h.service.apply_abort(&block(12), &a.index, "again").is_err());
    assert!(h.service.apply_revert(&block(12), &b.index, 50_000, "again").is_err());
    assert_eq!(
        h.service.export_genesis().zeta_accounting.aborted_zeta_amount,
        U256::from(500u64)
    );

    h.service.apply_refund(&block(12), &a.index).unwrap();
    assert_eq!(
        h.service.export_genesis().zeta_accounting.aborted_zeta_amount,
        U256::from(200u64)
    );
}

#[test]
fn test_abandoned_pending_cctx_swept_after_retention() {
    let config = CrosschainConfig {
        expiry: ExpiryConfig {
            sweep_interval_blocks: 10,
            retention_blocks: 25,
        },
        ..Default::default()
    };
    let h = Harness::with_config(config);
    let cctx = h.inbound(&deposit("0xdeposit6", CoinType::Gas, "", 1), 5);
    h.service
        .add_outbound_tracker(&block(5), 56, 0, "0xstale", "observer-1")
        .unwrap();

    // 30 - 5 = 25, not strictly older than retention.
    assert!(h.service.end_block(&block(30)).is_empty());

    let plan = h.service.end_block(&block(40));
    assert_eq!(plan.abandoned, vec![cctx.index.clone()]);
    assert_eq!(plan.stale_trackers, vec![(56, 0)]);
    assert!(h.service.get_cctx(&cctx.index).is_none());
}

// =============================================================================
// RATE LIMITER
// =============================================================================

#[test]
fn test_rate_limiter_converts_erc20_value() {
    let h = Harness::new();
    h.service
        .update_rate_limiter_flags(RateLimiterFlags {
            enabled: true,
            window: 100,
            rate: U256::from(10u64),
            conversions: vec![Conversion::new(
                "0xusdc",
                "0.5".parse::<DecimalRate>().unwrap(),
            )],
        })
        .unwrap();

    // Limit 1000; 1600 USDC is worth 800 ZETA.
    let first = h.inbound(&deposit("0xusdc1", CoinType::Erc20, "0xusdc", 1_600), 50);
    assert_eq!(first.state(), CctxStatus::PendingOutbound);

    let second = h.inbound(&deposit("0xusdc2", CoinType::Erc20, "0xusdc", 600), 60);
    assert_eq!(second.state(), CctxStatus::PendingInbound);

    // Unlisted assets count as zero.
    let third = h.inbound(&deposit("0xdai1", CoinType::Erc20, "0xdai", 1_000_000), 60);
    assert_eq!(third.state(), CctxStatus::PendingOutbound);

    // Outside the window the first CCTX no longer counts.
    let fourth = h.inbound(&deposit("0xusdc3", CoinType::Erc20, "0xusdc", 600), 150);
    assert_eq!(fourth.state(), CctxStatus::PendingOutbound);
}

// =============================================================================
// ADMIN COMMANDS
// =============================================================================

#[test]
fn test_admin_commands_create_pending_outbounds() {
    let h = Harness::new();
    let whitelist = h
        .service
        .whitelist_erc20(
            &block(10),
            "admin",
            &WhitelistErc20 {
                zrc20_address: "0xzrc20usdc".to_string(),
                erc20_address: "0xusdc".to_string(),
                chain_id: 1,
                custody_address: "0xcustody".to_string(),
                gas_price: U256::from(20u64),
                gas_priority_fee: U256::from(1u64),
            },
        )
        .unwrap();
    let migration = h
        .service
        .migrate_custody_funds(
            &block(10),
            "admin",
            &MigrateCustodyFunds {
                chain_id: 1,
                nonce: 3,
                erc20_address: "0xusdc".to_string(),
                new_custody_address: "0xnewcustody".to_string(),
                amount: U256::from(5_000u64),
                custody_address: "0xcustody".to_string(),
                gas_price: U256::from(20u64),
                gas_priority_fee: U256::from(1u64),
            },
        )
        .unwrap();

    assert_ne!(whitelist.index, migration.index);
    for cctx in [&whitelist, &migration] {
        assert_eq!(cctx.state(), CctxStatus::PendingOutbound);
        assert_eq!(cctx.inbound.coin_type, CoinType::Cmd);
        assert_eq!(cctx.outbound[0].receiver, "0xcustody");
    }
    assert_eq!(migration.outbound[0].tss_nonce, 3);
    assert_eq!(h.service.export_genesis().cctx_counter, 2);
}

#[test]
fn test_unknown_chain_command_rejected() {
    let h = Harness::new();
    let result = h.service.whitelist_erc20(
        &block(10),
        "admin",
        &WhitelistErc20 {
            chain_id: 31_337,
            custody_address: "0xcustody".to_string(),
            ..Default::default()
        },
    );
    assert_eq!(result, Err(CrosschainError::UnknownChain(31_337)));
    assert_eq!(h.service.export_genesis().cctx_counter, 0);
}

// =============================================================================
// STATE EXPORT
// =============================================================================

#[test]
fn test_genesis_json_round_trip() {
    let h = Harness::new();
    h.inbound(&deposit("0xdeposit7", CoinType::Gas, "", 1_000), 10);
    h.inbound(&deposit("0xdeposit8", CoinType::Zeta, "", 50), 11);
    h.service
        .add_outbound_tracker(&block(12), 56, 0, "0xcandidate", "observer-1")
        .unwrap();
    h.service
        .update_rate_limiter_flags(RateLimiterFlags {
            enabled: true,
            window: 500,
            rate: U256::from(1_000_000u64),
            conversions: vec![Conversion::new(
                "0xusdc",
                "1.25".parse::<DecimalRate>().unwrap(),
            )],
        })
        .unwrap();

    let exported = h.service.export_genesis();
    let json = serde_json::to_string(&exported).unwrap();
    assert!(json.contains("\"1.25\""));
    let decoded: GenesisState = serde_json::from_str(&json).unwrap();

    let restored = Harness::new();
    restored.service.import_genesis(decoded).unwrap();
    assert_eq!(restored.service.export_genesis(), exported);

    // The restored state still refuses the already finalized inbound.
    let replay = deposit("0xdeposit7", CoinType::Gas, "", 1_000);
    restored
        .observer
        .set_ballot(&inbound_vote_digest(&replay), BallotStatus::FinalizedSuccess);
    assert!(matches!(
        restored.service.apply_inbound_vote(&block(20), &replay),
        Err(CrosschainError::InboundAlreadyFinalized(_))
    ));
}

#[test]
fn test_genesis_with_overfull_tracker_rejected() {
    let h = Harness::new();
    h.service
        .add_outbound_tracker(&block(12), 56, 0, "0xcandidate", "observer-1")
        .unwrap();
    let mut state = h.service.export_genesis();
    for i in 0..MAX_OUTBOUND_TRACKER_HASHES {
        state.outbound_trackers[0]
            .hash_list
            .push(TxHashEntry::new(&format!("0xextra{}", i), "observer-2"));
    }
    assert_eq!(state.outbound_trackers[0].hash_list.len(), 6);

    let restored = Harness::new();
    assert_eq!(
        restored.service.import_genesis(state),
        Err(CrosschainError::TrackerMaxReached {
            chain_id: 56,
            nonce: 0
        })
    );
    assert!(restored.service.export_genesis().outbound_trackers.is_empty());
}
