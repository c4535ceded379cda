//! Crosschain module configuration.

use crate::domain::{ChainId, ChainRegistry};
use std::env;

/// Block interval of the expiry sweep (one hour at a 6 s block time).
pub const DEFAULT_SWEEP_INTERVAL_BLOCKS: u64 = 600;

/// Retention of pending CCTXs and trackers (one day at a 6 s block time).
pub const DEFAULT_RETENTION_BLOCKS: u64 = 14_400;

/// ZetaChain mainnet.
pub const DEFAULT_HOST_CHAIN_ID: ChainId = 7000;

/// Expiry sweep parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpiryConfig {
    /// Run the sweep when `height % sweep_interval_blocks == 0`.
    pub sweep_interval_blocks: u64,
    /// Age in blocks after which pending CCTXs and trackers are removed.
    pub retention_blocks: u64,
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            sweep_interval_blocks: DEFAULT_SWEEP_INTERVAL_BLOCKS,
            retention_blocks: DEFAULT_RETENTION_BLOCKS,
        }
    }
}

/// Configuration of the crosschain service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrosschainConfig {
    /// Chain id of the host chain.
    pub host_chain_id: ChainId,
    /// Chains ids are resolved against.
    pub chains: ChainRegistry,
    /// Expiry sweep parameters.
    pub expiry: ExpiryConfig,
}

impl Default for CrosschainConfig {
    fn default() -> Self {
        Self {
            host_chain_id: DEFAULT_HOST_CHAIN_ID,
            chains: ChainRegistry::default(),
            expiry: ExpiryConfig::default(),
        }
    }
}

impl CrosschainConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CCTX_HOST_CHAIN_ID`: Host chain id (default: 7000)
    /// - `CCTX_SWEEP_INTERVAL_BLOCKS`: Sweep interval (default: 600)
    /// - `CCTX_RETENTION_BLOCKS`: Retention (default: 14400)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self {
            host_chain_id: env::var("CCTX_HOST_CHAIN_ID")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_HOST_CHAIN_ID),

            chains: ChainRegistry::default(),

            expiry: ExpiryConfig {
                sweep_interval_blocks: env::var("CCTX_SWEEP_INTERVAL_BLOCKS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_SWEEP_INTERVAL_BLOCKS),

                retention_blocks: env::var("CCTX_RETENTION_BLOCKS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_RETENTION_BLOCKS),
            },
        }
    }

    /// Replace the chain registry.
    pub fn with_chains(mut self, chains: ChainRegistry) -> Self {
        self.chains = chains;
        self
    }
}
