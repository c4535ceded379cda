//! # Command CCTX Factory
//!
//! Builds protocol-initiated CCTXs: ERC20 whitelisting, custody pause,
//! custody fund migration and TSS fund migration.
//!
//! Command CCTXs skip inbound voting. They start in `PendingOutbound`, carry
//! the `Cmd` coin type and a `Safe` confirmation mode. Each index is the
//! Keccak-256 of a canonical encoding of every varying input, under a
//! per-command domain tag.

use super::digest::CanonicalEncoder;
use crate::domain::{
    BlockContext, CctxStatus, Chain, ChainId, ChainKind, ChainRegistry, CoinType,
    ConfirmationMode, CrossChainTx, CrosschainError, CrosschainResult, InboundParams,
    OutboundParams, Status, TxFinalizationStatus,
};
use primitive_types::U256;
use tracing::debug;

/// Gas limit of whitelist, pause and custody migration commands.
pub const COMMAND_GAS_LIMIT: u64 = 100_000;

/// Gas limit of an EVM TSS migration transfer.
pub const EVM_TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Fee buffer added on top of `gas_limit * gas_price` for EVM migrations.
pub const EVM_MIGRATION_FEE_BUFFER: u64 = 2_100_000_000;

/// Gas limit of a Bitcoin TSS migration.
pub const BTC_MIGRATION_GAS_LIMIT: u64 = 1_000_000;

/// Relayed message prefix of an ERC20 whitelist.
pub const CMD_WHITELIST_ERC20: &str = "cmd_whitelist_erc20";
/// Relayed message prefix of a custody pause update.
pub const CMD_UPDATE_CUSTODY_PAUSE: &str = "cmd_update_erc20_custody_pause_status";
/// Relayed message prefix of a custody fund migration.
pub const CMD_MIGRATE_CUSTODY_FUNDS: &str = "cmd_migrate_erc20_custody_funds";
/// Relayed message prefix of a TSS fund migration.
pub const CMD_MIGRATE_TSS_FUNDS: &str = "cmd_migrate_tss_funds";

const WHITELIST_DOMAIN: &[u8] = b"cctx/cmd-whitelist-erc20/v1";
const CUSTODY_PAUSE_DOMAIN: &[u8] = b"cctx/cmd-custody-pause/v1";
const CUSTODY_MIGRATION_DOMAIN: &[u8] = b"cctx/cmd-custody-migration/v1";
const TSS_MIGRATION_DOMAIN: &[u8] = b"cctx/cmd-tss-migration/v1";

/// Inputs shared by every command.
#[derive(Clone, Debug)]
pub struct CommandContext<'a> {
    /// Admin account issuing the command.
    pub creator: &'a str,
    /// Host chain id; the inbound sender chain of command CCTXs.
    pub host_chain_id: ChainId,
    /// TSS public key in effect.
    pub tss_pubkey: &'a str,
    /// Block being applied.
    pub block: BlockContext,
    /// Resolvable chains.
    pub chains: &'a ChainRegistry,
}

/// Whitelist an ERC20 token on a connected chain.
#[derive(Clone, Debug, Default)]
pub struct WhitelistErc20 {
    /// ZRC20 representation on the host chain.
    pub zrc20_address: String,
    /// Token address on the connected chain.
    pub erc20_address: String,
    /// Connected chain.
    pub chain_id: ChainId,
    /// ERC20 custody contract on the connected chain.
    pub custody_address: String,
    /// Median gas price on the connected chain.
    pub gas_price: U256,
    /// Priority fee on the connected chain.
    pub gas_priority_fee: U256,
}

/// Pause or unpause the ERC20 custody contract.
#[derive(Clone, Debug, Default)]
pub struct UpdateCustodyPause {
    /// Connected chain.
    pub chain_id: ChainId,
    /// Current outbound nonce of the chain.
    pub nonce: u64,
    /// `true` to pause.
    pub pause: bool,
    /// ERC20 custody contract.
    pub custody_address: String,
    /// Median gas price.
    pub gas_price: U256,
    /// Priority fee.
    pub gas_priority_fee: U256,
}

/// Move ERC20 custody funds to a new custody contract.
#[derive(Clone, Debug, Default)]
pub struct MigrateCustodyFunds {
    /// Connected chain.
    pub chain_id: ChainId,
    /// Current outbound nonce of the chain.
    pub nonce: u64,
    /// Token to migrate.
    pub erc20_address: String,
    /// Destination custody contract.
    pub new_custody_address: String,
    /// Amount to migrate.
    pub amount: U256,
    /// Current custody contract.
    pub custody_address: String,
    /// Median gas price.
    pub gas_price: U256,
    /// Priority fee.
    pub gas_priority_fee: U256,
}

/// Move gas-token funds from the current TSS address to the new one.
#[derive(Clone, Debug, Default)]
pub struct MigrateTssFunds {
    /// Connected chain.
    pub chain_id: ChainId,
    /// Public key of the TSS being retired.
    pub current_tss_pubkey: String,
    /// Public key of the new TSS.
    pub new_tss_pubkey: String,
    /// Address of the new TSS on the connected chain.
    pub new_tss_address: String,
    /// Balance to move.
    pub amount: U256,
    /// Median gas price on the connected chain.
    pub median_gas_price: U256,
    /// Priority fee on the connected chain.
    pub gas_priority_fee: U256,
    /// Caller-supplied tag stored as the inbound hash.
    pub inbound_tag: String,
}

/// Command index: Keccak-256 over the domain tag and the length-prefixed parts.
pub fn command_index(domain: &[u8], parts: &[&str]) -> String {
    let mut enc = CanonicalEncoder::with_domain(domain);
    for part in parts {
        enc.put_str(part);
    }
    enc.finish()
}

/// Build the whitelist command.
pub fn whitelist_erc20_cctx(
    cmd: &CommandContext<'_>,
    params: &WhitelistErc20,
) -> CrosschainResult<CrossChainTx> {
    resolve_chain(cmd.chains, params.chain_id)?;
    let index = command_index(
        WHITELIST_DOMAIN,
        &[
            &params.zrc20_address,
            &params.erc20_address,
            &params.chain_id.to_string(),
        ],
    );
    let message = format!("{}:{}", CMD_WHITELIST_ERC20, params.erc20_address);
    let outbound = CommandOutbound {
        receiver: params.custody_address.clone(),
        receiver_chain_id: params.chain_id,
        amount: U256::zero(),
        gas_limit: COMMAND_GAS_LIMIT,
        gas_price: params.gas_price,
        gas_priority_fee: params.gas_priority_fee,
        tss_nonce: 0,
    };
    build_command_cctx(cmd, index, message, String::new(), U256::zero(), outbound)
}

/// Build the custody pause/unpause command.
pub fn update_custody_pause_cctx(
    cmd: &CommandContext<'_>,
    params: &UpdateCustodyPause,
) -> CrosschainResult<CrossChainTx> {
    resolve_chain(cmd.chains, params.chain_id)?;
    let index = command_index(
        CUSTODY_PAUSE_DOMAIN,
        &[
            cmd.tss_pubkey,
            &params.nonce.to_string(),
            &params.chain_id.to_string(),
        ],
    );
    let action = if params.pause { "pause" } else { "unpause" };
    let message = format!("{}:{}", CMD_UPDATE_CUSTODY_PAUSE, action);
    let outbound = CommandOutbound {
        receiver: params.custody_address.clone(),
        receiver_chain_id: params.chain_id,
        amount: U256::zero(),
        gas_limit: COMMAND_GAS_LIMIT,
        gas_price: params.gas_price,
        gas_priority_fee: params.gas_priority_fee,
        tss_nonce: params.nonce,
    };
    build_command_cctx(cmd, index, message, String::new(), U256::zero(), outbound)
}

/// Build the custody fund migration command.
pub fn migrate_custody_funds_cctx(
    cmd: &CommandContext<'_>,
    params: &MigrateCustodyFunds,
) -> CrosschainResult<CrossChainTx> {
    resolve_chain(cmd.chains, params.chain_id)?;
    let index = command_index(
        CUSTODY_MIGRATION_DOMAIN,
        &[
            cmd.tss_pubkey,
            &params.nonce.to_string(),
            &params.chain_id.to_string(),
            &params.erc20_address,
        ],
    );
    let message = format!(
        "{}:{},{},{}",
        CMD_MIGRATE_CUSTODY_FUNDS, params.new_custody_address, params.erc20_address, params.amount
    );
    let outbound = CommandOutbound {
        receiver: params.custody_address.clone(),
        receiver_chain_id: params.chain_id,
        amount: U256::zero(),
        gas_limit: COMMAND_GAS_LIMIT,
        gas_price: params.gas_price,
        gas_priority_fee: params.gas_priority_fee,
        tss_nonce: params.nonce,
    };
    build_command_cctx(cmd, index, message, String::new(), U256::zero(), outbound)
}

/// Build the TSS fund migration command.
///
/// EVM: `gas_price = median * 2.5`, `fee = 21_000 * gas_price + buffer`,
/// transfers `amount - fee`. Bitcoin: `gas_price = median * 2`, transfers the
/// full amount. Any other chain kind is unsupported.
pub fn migrate_tss_funds_cctx(
    cmd: &CommandContext<'_>,
    params: &MigrateTssFunds,
) -> CrosschainResult<CrossChainTx> {
    let chain = resolve_chain(cmd.chains, params.chain_id)?;
    let index = command_index(
        TSS_MIGRATION_DOMAIN,
        &[
            &params.current_tss_pubkey,
            &params.new_tss_pubkey,
            &params.chain_id.to_string(),
            &params.amount.to_string(),
            &cmd.block.height.to_string(),
        ],
    );

    let (amount, gas_limit, gas_price) = match chain.kind {
        ChainKind::Evm => {
            let gas_price =
                params.median_gas_price.saturating_mul(U256::from(25u64)) / U256::from(10u64);
            let fee = U256::from(EVM_TRANSFER_GAS_LIMIT)
                .checked_mul(gas_price)
                .and_then(|f| f.checked_add(U256::from(EVM_MIGRATION_FEE_BUFFER)))
                .unwrap_or(U256::MAX);
            if fee > params.amount {
                return Err(CrosschainError::InsufficientFunds {
                    amount: params.amount.to_string(),
                    fee: fee.to_string(),
                    chain_id: chain.chain_id,
                });
            }
            (params.amount - fee, EVM_TRANSFER_GAS_LIMIT, gas_price)
        }
        ChainKind::Bitcoin => {
            let gas_price = params.median_gas_price.saturating_mul(U256::from(2u64));
            (params.amount, BTC_MIGRATION_GAS_LIMIT, gas_price)
        }
        ChainKind::ZetaChain | ChainKind::Solana => {
            return Err(CrosschainError::UnsupportedChain(chain.chain_id));
        }
    };

    let message = format!("{}:Funds Migrator Admin Cmd", CMD_MIGRATE_TSS_FUNDS);
    let outbound = CommandOutbound {
        receiver: params.new_tss_address.clone(),
        receiver_chain_id: chain.chain_id,
        amount,
        gas_limit,
        gas_price,
        gas_priority_fee: params.gas_priority_fee,
        tss_nonce: 0,
    };
    build_command_cctx(
        cmd,
        index,
        message,
        params.inbound_tag.clone(),
        params.amount,
        outbound,
    )
}

struct CommandOutbound {
    receiver: String,
    receiver_chain_id: ChainId,
    amount: U256,
    gas_limit: u64,
    gas_price: U256,
    gas_priority_fee: U256,
    tss_nonce: u64,
}

fn resolve_chain(chains: &ChainRegistry, chain_id: ChainId) -> CrosschainResult<&Chain> {
    chains
        .get(chain_id)
        .ok_or(CrosschainError::UnknownChain(chain_id))
}

fn build_command_cctx(
    cmd: &CommandContext<'_>,
    index: String,
    relayed_message: String,
    inbound_hash: String,
    inbound_amount: U256,
    out: CommandOutbound,
) -> CrosschainResult<CrossChainTx> {
    let inbound = InboundParams {
        sender: cmd.creator.to_string(),
        sender_chain_id: cmd.host_chain_id,
        tx_origin: cmd.creator.to_string(),
        coin_type: CoinType::Cmd,
        asset: String::new(),
        amount: inbound_amount,
        observed_hash: inbound_hash,
        observed_external_height: 0,
        ballot_index: String::new(),
        finalized_zeta_height: cmd.block.height,
        tx_finalization_status: TxFinalizationStatus::Executed,
    };
    let outbound = OutboundParams {
        receiver: out.receiver,
        receiver_chain_id: out.receiver_chain_id,
        coin_type: CoinType::Cmd,
        amount: out.amount,
        tss_nonce: out.tss_nonce,
        gas_limit: out.gas_limit,
        gas_price: out.gas_price,
        gas_priority_fee: out.gas_priority_fee,
        tss_pubkey: cmd.tss_pubkey.to_string(),
        confirmation_mode: ConfirmationMode::Safe,
        ..Default::default()
    };

    let cctx = CrossChainTx {
        creator: cmd.creator.to_string(),
        index,
        zeta_fees: U256::zero(),
        relayed_message,
        status: Status::new(CctxStatus::PendingOutbound, cmd.block.timestamp),
        inbound,
        outbound: vec![outbound],
    };
    cctx.validate(cmd.chains)?;

    debug!(
        "[cctx] Built command CCTX {} ({})",
        cctx.index, cctx.relayed_message
    );
    Ok(cctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TSS: &str = "zetapub1current";

    fn registry() -> ChainRegistry {
        ChainRegistry::default()
    }

    fn context(chains: &ChainRegistry) -> CommandContext<'_> {
        CommandContext {
            creator: "admin",
            host_chain_id: 7000,
            tss_pubkey: TSS,
            block: BlockContext::new(1_000, 42),
            chains,
        }
    }

    fn whitelist() -> WhitelistErc20 {
        WhitelistErc20 {
            zrc20_address: "0xzrc20".to_string(),
            erc20_address: "0xerc20".to_string(),
            chain_id: 1,
            custody_address: "0xcustody".to_string(),
            gas_price: U256::from(10u64),
            gas_priority_fee: U256::one(),
        }
    }

    fn pause() -> UpdateCustodyPause {
        UpdateCustodyPause {
            chain_id: 1,
            nonce: 9,
            pause: true,
            custody_address: "0xcustody".to_string(),
            gas_price: U256::from(10u64),
            gas_priority_fee: U256::zero(),
        }
    }

    fn custody_migration() -> MigrateCustodyFunds {
        MigrateCustodyFunds {
            chain_id: 1,
            nonce: 9,
            erc20_address: "0xerc20".to_string(),
            new_custody_address: "0xnewcustody".to_string(),
            amount: U256::from(5_000u64),
            custody_address: "0xcustody".to_string(),
            gas_price: U256::from(10u64),
            gas_priority_fee: U256::zero(),
        }
    }

    fn tss_migration(chain_id: ChainId, amount: u64) -> MigrateTssFunds {
        MigrateTssFunds {
            chain_id,
            current_tss_pubkey: TSS.to_string(),
            new_tss_pubkey: "zetapub1new".to_string(),
            new_tss_address: "0xnewtss".to_string(),
            amount: U256::from(amount),
            median_gas_price: U256::from(100u64),
            gas_priority_fee: U256::zero(),
            inbound_tag: "migration-1".to_string(),
        }
    }

    fn assert_command_shape(cctx: &CrossChainTx) {
        assert_eq!(cctx.state(), CctxStatus::PendingOutbound);
        assert_eq!(cctx.inbound.coin_type, CoinType::Cmd);
        assert_eq!(cctx.inbound.sender, "admin");
        assert_eq!(cctx.inbound.sender_chain_id, 7000);
        assert_eq!(cctx.inbound.finalized_zeta_height, 1_000);
        assert_eq!(cctx.outbound.len(), 1);
        assert_eq!(cctx.outbound[0].coin_type, CoinType::Cmd);
        assert_eq!(cctx.outbound[0].confirmation_mode, ConfirmationMode::Safe);
        assert_eq!(cctx.outbound[0].tss_pubkey, TSS);
        assert_eq!(cctx.index.len(), 66);
    }

    #[test]
    fn test_whitelist_shape() {
        let chains = registry();
        let cctx = whitelist_erc20_cctx(&context(&chains), &whitelist()).unwrap();
        assert_command_shape(&cctx);
        assert_eq!(cctx.relayed_message, "cmd_whitelist_erc20:0xerc20");
        assert_eq!(cctx.outbound[0].receiver, "0xcustody");
        assert_eq!(cctx.outbound[0].gas_limit, COMMAND_GAS_LIMIT);
        assert!(cctx.outbound[0].amount.is_zero());
    }

    #[test]
    fn test_whitelist_index_changes_with_each_input() {
        let chains = registry();
        let cmd = context(&chains);
        let base = whitelist_erc20_cctx(&cmd, &whitelist()).unwrap().index;
        let variants = [
            WhitelistErc20 {
                zrc20_address: "0xother".into(),
                ..whitelist()
            },
            WhitelistErc20 {
                erc20_address: "0xother".into(),
                ..whitelist()
            },
            WhitelistErc20 {
                chain_id: 56,
                ..whitelist()
            },
        ];
        for params in &variants {
            assert_ne!(base, whitelist_erc20_cctx(&cmd, params).unwrap().index);
        }
    }

    #[test]
    fn test_pause_messages_and_index() {
        let chains = registry();
        let cmd = context(&chains);
        let paused = update_custody_pause_cctx(&cmd, &pause()).unwrap();
        assert_command_shape(&paused);
        assert_eq!(
            paused.relayed_message,
            "cmd_update_erc20_custody_pause_status:pause"
        );
        let unpaused = update_custody_pause_cctx(
            &cmd,
            &UpdateCustodyPause {
                pause: false,
                ..pause()
            },
        )
        .unwrap();
        assert_eq!(
            unpaused.relayed_message,
            "cmd_update_erc20_custody_pause_status:unpause"
        );
        // Pause flag is not part of the index.
        assert_eq!(paused.index, unpaused.index);

        let nonce_params = UpdateCustodyPause {
            nonce: 10,
            ..pause()
        };
        let chain_params = UpdateCustodyPause {
            chain_id: 56,
            ..pause()
        };
        let other_nonce = update_custody_pause_cctx(&cmd, &nonce_params).unwrap();
        let other_chain = update_custody_pause_cctx(&cmd, &chain_params).unwrap();
        let other_tss = update_custody_pause_cctx(
            &CommandContext {
                tss_pubkey: "zetapub1other",
                ..cmd.clone()
            },
            &pause(),
        )
        .unwrap();
        assert_ne!(paused.index, other_nonce.index);
        assert_ne!(paused.index, other_chain.index);
        assert_ne!(paused.index, other_tss.index);
    }

    #[test]
    fn test_custody_migration() {
        let chains = registry();
        let cmd = context(&chains);
        let cctx = migrate_custody_funds_cctx(&cmd, &custody_migration()).unwrap();
        assert_command_shape(&cctx);
        assert_eq!(
            cctx.relayed_message,
            "cmd_migrate_erc20_custody_funds:0xnewcustody,0xerc20,5000"
        );
        let other_token = migrate_custody_funds_cctx(
            &cmd,
            &MigrateCustodyFunds {
                erc20_address: "0xother".into(),
                ..custody_migration()
            },
        )
        .unwrap();
        assert_ne!(cctx.index, other_token.index);
    }

    #[test]
    fn test_evm_tss_migration_deducts_fee() {
        let chains = registry();
        let params = tss_migration(1, 10_000_000_000);
        let cctx = migrate_tss_funds_cctx(&context(&chains), &params).unwrap();
        assert_command_shape(&cctx);

        let leg = &cctx.outbound[0];
        // 100 * 2.5
        assert_eq!(leg.gas_price, U256::from(250u64));
        assert_eq!(leg.gas_limit, EVM_TRANSFER_GAS_LIMIT);
        let fee = 21_000u64 * 250 + EVM_MIGRATION_FEE_BUFFER;
        assert_eq!(leg.amount, U256::from(10_000_000_000u64 - fee));
        assert_eq!(leg.receiver, "0xnewtss");
        assert_eq!(cctx.inbound.amount, U256::from(10_000_000_000u64));
        assert_eq!(cctx.inbound.observed_hash, "migration-1");
        assert_eq!(
            cctx.relayed_message,
            "cmd_migrate_tss_funds:Funds Migrator Admin Cmd"
        );
    }

    #[test]
    fn test_evm_tss_migration_insufficient_funds() {
        let chains = registry();
        let result = migrate_tss_funds_cctx(&context(&chains), &tss_migration(1, 1_000));
        assert!(matches!(
            result,
            Err(CrosschainError::InsufficientFunds { chain_id: 1, .. })
        ));
    }

    #[test]
    fn test_evm_fee_equal_to_amount_is_allowed() {
        let chains = registry();
        let fee = 21_000u64 * 250 + EVM_MIGRATION_FEE_BUFFER;
        let cctx = migrate_tss_funds_cctx(&context(&chains), &tss_migration(1, fee)).unwrap();
        assert!(cctx.outbound[0].amount.is_zero());
    }

    #[test]
    fn test_btc_tss_migration_transfers_full_amount() {
        let chains = registry();
        let params = tss_migration(8332, 50_000);
        let cctx = migrate_tss_funds_cctx(&context(&chains), &params).unwrap();
        let leg = &cctx.outbound[0];
        assert_eq!(leg.gas_price, U256::from(200u64));
        assert_eq!(leg.gas_limit, BTC_MIGRATION_GAS_LIMIT);
        assert_eq!(leg.amount, U256::from(50_000u64));
    }

    #[test]
    fn test_unsupported_chain_kinds() {
        let chains = registry();
        let cmd = context(&chains);
        assert_eq!(
            migrate_tss_funds_cctx(&cmd, &tss_migration(900, 1_000)),
            Err(CrosschainError::UnsupportedChain(900))
        );
        assert_eq!(
            migrate_tss_funds_cctx(&cmd, &tss_migration(7000, 1_000)),
            Err(CrosschainError::UnsupportedChain(7000))
        );
        assert_eq!(
            migrate_tss_funds_cctx(&cmd, &tss_migration(424_242, 1_000)),
            Err(CrosschainError::UnknownChain(424_242))
        );
    }

    #[test]
    fn test_tss_migration_index_changes_with_each_input() {
        let chains = registry();
        let cmd = context(&chains);
        let amount = 10_000_000_000u64;
        let base = migrate_tss_funds_cctx(&cmd, &tss_migration(1, amount)).unwrap().index;

        let variants = [
            MigrateTssFunds {
                current_tss_pubkey: "a".into(),
                ..tss_migration(1, amount)
            },
            MigrateTssFunds {
                new_tss_pubkey: "b".into(),
                ..tss_migration(1, amount)
            },
            tss_migration(56, amount),
            tss_migration(1, amount + 1),
        ];
        for params in &variants {
            assert_ne!(base, migrate_tss_funds_cctx(&cmd, params).unwrap().index);
        }

        let later = CommandContext {
            block: BlockContext::new(1_001, 42),
            ..cmd.clone()
        };
        assert_ne!(
            base,
            migrate_tss_funds_cctx(&later, &tss_migration(1, amount)).unwrap().index
        );
    }

    #[test]
    fn test_command_index_part_boundaries_matter() {
        assert_ne!(
            command_index(WHITELIST_DOMAIN, &["a-b", "c"]),
            command_index(WHITELIST_DOMAIN, &["a", "b-c"])
        );
        assert_ne!(
            command_index(WHITELIST_DOMAIN, &["ab", ""]),
            command_index(WHITELIST_DOMAIN, &["a", "b"])
        );
    }

    #[test]
    fn test_command_index_domain_separated() {
        let parts = [TSS, "9", "1"];
        assert_ne!(
            command_index(CUSTODY_PAUSE_DOMAIN, &parts),
            command_index(CUSTODY_MIGRATION_DOMAIN, &parts)
        );
        assert_eq!(
            command_index(CUSTODY_PAUSE_DOMAIN, &parts),
            command_index(CUSTODY_PAUSE_DOMAIN, &parts)
        );
    }

    #[test]
    fn test_empty_creator_rejected() {
        let chains = registry();
        let cmd = CommandContext {
            creator: "",
            ..context(&chains)
        };
        assert_eq!(
            whitelist_erc20_cctx(&cmd, &whitelist()),
            Err(CrosschainError::EmptySender)
        );
    }
}
