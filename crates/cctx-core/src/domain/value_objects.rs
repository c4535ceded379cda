//! # Domain Value Objects
//!
//! Immutable value types shared by the CCTX aggregate, the ballot digest and
//! the command factory.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Chain identifier as used on the wire.
pub type ChainId = i64;

/// Chain family. New families are added here, never matched by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainKind {
    /// The host chain that runs this module.
    ZetaChain,
    /// Ethereum-compatible chain.
    Evm,
    /// Bitcoin-family UTXO chain.
    Bitcoin,
    /// Solana.
    Solana,
}

/// A chain known to the registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    /// Numeric chain id.
    pub chain_id: ChainId,
    /// Human-readable name.
    pub name: String,
    /// Chain family.
    pub kind: ChainKind,
}

impl Chain {
    /// Create a new chain entry.
    pub fn new(chain_id: ChainId, name: &str, kind: ChainKind) -> Self {
        Self {
            chain_id,
            name: name.to_string(),
            kind,
        }
    }
}

/// Set of chains a chain id can be resolved against.
///
/// Passed explicitly into every component that validates chain ids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRegistry {
    chains: BTreeMap<ChainId, Chain>,
}

impl ChainRegistry {
    /// Create a registry from a list of chains.
    pub fn new(chains: impl IntoIterator<Item = Chain>) -> Self {
        Self {
            chains: chains.into_iter().map(|c| (c.chain_id, c)).collect(),
        }
    }

    /// Add or replace a chain.
    pub fn with_chain(mut self, chain: Chain) -> Self {
        self.chains.insert(chain.chain_id, chain);
        self
    }

    /// Resolve a chain id.
    pub fn get(&self, chain_id: ChainId) -> Option<&Chain> {
        self.chains.get(&chain_id)
    }

    /// Check whether a chain id resolves.
    pub fn contains(&self, chain_id: ChainId) -> bool {
        self.chains.contains_key(&chain_id)
    }

    /// Number of known chains.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Returns true if no chain is known.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::new([
            Chain::new(7000, "zeta_mainnet", ChainKind::ZetaChain),
            Chain::new(7001, "zeta_testnet", ChainKind::ZetaChain),
            Chain::new(101, "zeta_privnet", ChainKind::ZetaChain),
            Chain::new(1, "eth_mainnet", ChainKind::Evm),
            Chain::new(56, "bsc_mainnet", ChainKind::Evm),
            Chain::new(137, "polygon_mainnet", ChainKind::Evm),
            Chain::new(11155111, "sepolia_testnet", ChainKind::Evm),
            Chain::new(1337, "goerli_localnet", ChainKind::Evm),
            Chain::new(8332, "btc_mainnet", ChainKind::Bitcoin),
            Chain::new(18332, "btc_testnet", ChainKind::Bitcoin),
            Chain::new(18444, "btc_regtest", ChainKind::Bitcoin),
            Chain::new(900, "solana_mainnet", ChainKind::Solana),
        ])
    }
}

/// Asset class moved by a CCTX.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoinType {
    /// Native ZETA.
    #[default]
    Zeta,
    /// Gas token of the connected chain.
    Gas,
    /// ERC20 token.
    Erc20,
    /// Protocol command, carries no user funds.
    Cmd,
    /// Message passing without asset.
    NoAssetCall,
}

impl CoinType {
    /// Stable tag used in canonical encodings.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Zeta => 0,
            Self::Gas => 1,
            Self::Erc20 => 2,
            Self::Cmd => 3,
            Self::NoAssetCall => 4,
        }
    }
}

/// How many confirmations an observer waits for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfirmationMode {
    /// Full confirmation count.
    #[default]
    Safe,
    /// Reduced confirmation count.
    Fast,
}

impl ConfirmationMode {
    /// Stable tag used in canonical encodings.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Safe => 0,
            Self::Fast => 1,
        }
    }
}

/// Outcome reported by an observer for an outbound transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReceiveStatus {
    /// Neutral value; used when normalizing ballot digests.
    #[default]
    Created,
    /// Transaction executed.
    Success,
    /// Transaction failed.
    Failed,
}

impl ReceiveStatus {
    /// Stable tag used in canonical encodings.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Created => 0,
            Self::Success => 1,
            Self::Failed => 2,
        }
    }
}

/// Finalization progress of a single leg.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxFinalizationStatus {
    /// Not yet finalized.
    #[default]
    NotFinalized,
    /// Ballot finalized.
    Finalized,
    /// Effects applied.
    Executed,
}

/// Tally state of a ballot in the external engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallotStatus {
    /// Quorum not reached yet.
    InProgress,
    /// Quorum reached on a success observation.
    FinalizedSuccess,
    /// Quorum reached on a failure observation.
    FinalizedFailure,
}

impl BallotStatus {
    /// Verdict of a finalized ballot.
    pub fn verdict(&self) -> Option<BallotVerdict> {
        match self {
            Self::InProgress => None,
            Self::FinalizedSuccess => Some(BallotVerdict::Success),
            Self::FinalizedFailure => Some(BallotVerdict::Failure),
        }
    }
}

/// Verdict of a finalized ballot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallotVerdict {
    /// Majority observed success.
    Success,
    /// Majority observed failure.
    Failure,
}

/// Height and timestamp of the block being applied.
///
/// The core never reads a clock; every mutator receives this instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockContext {
    /// Block height.
    pub height: u64,
    /// Block timestamp (unix seconds).
    pub timestamp: i64,
}

impl BlockContext {
    /// Create a block context.
    pub fn new(height: u64, timestamp: i64) -> Self {
        Self { height, timestamp }
    }
}
