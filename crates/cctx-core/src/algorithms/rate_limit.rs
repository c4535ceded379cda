//! # Rate Limiter Admission
//!
//! Sliding-window admission over heights `[h - window + 1, h]`. Values are in
//! ZETA base units: Zeta-coin amounts count 1:1, other assets through their
//! conversion rate, commands count zero.

use crate::domain::{CctxStatus, CoinType, CrossChainTx, RateLimiterFlags};
use primitive_types::U256;

/// Outcome of an admission check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Admission {
    /// Within budget, or rate limiting is not in effect.
    Admitted,
    /// Over budget for the current window.
    Throttled {
        /// Value already admitted in the window.
        window_value: U256,
        /// Value of the candidate.
        value: U256,
        /// `rate * window`.
        limit: U256,
    },
}

impl Admission {
    /// Returns true if admitted.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }
}

/// Value of a CCTX in ZETA base units.
pub fn cctx_value(flags: &RateLimiterFlags, cctx: &CrossChainTx) -> U256 {
    match cctx.inbound.coin_type {
        CoinType::Zeta => cctx.inbound.amount,
        CoinType::Cmd => U256::zero(),
        CoinType::Gas | CoinType::Erc20 | CoinType::NoAssetCall => {
            let (rate, found) = flags.get_conversion(&cctx.inbound.asset);
            if !found {
                return U256::zero();
            }
            rate.apply(cctx.inbound.amount)
        }
    }
}

/// Whether a CCTX consumed budget in the window ending at `height`.
fn counts_in_window(flags: &RateLimiterFlags, cctx: &CrossChainTx, height: u64) -> bool {
    if matches!(
        cctx.state(),
        CctxStatus::PendingInbound | CctxStatus::Aborted
    ) {
        return false;
    }
    let window = flags.window.max(0) as u64;
    let start = height.saturating_sub(window.saturating_sub(1));
    let finalized = cctx.inbound.finalized_zeta_height;
    finalized >= start && finalized <= height
}

/// Sum of values admitted in the window ending at `height`.
pub fn window_value<'a>(
    flags: &RateLimiterFlags,
    height: u64,
    cctxs: impl IntoIterator<Item = &'a CrossChainTx>,
) -> U256 {
    cctxs
        .into_iter()
        .filter(|cctx| counts_in_window(flags, cctx, height))
        .fold(U256::zero(), |acc, cctx| {
            acc.saturating_add(cctx_value(flags, cctx))
        })
}

/// Decide whether `candidate` may be admitted at `height`.
///
/// `admitted` is every stored CCTX; the candidate itself must not be in it.
pub fn check_admission<'a>(
    flags: &RateLimiterFlags,
    height: u64,
    candidate: &CrossChainTx,
    admitted: impl IntoIterator<Item = &'a CrossChainTx>,
) -> Admission {
    if !flags.is_usable() {
        return Admission::Admitted;
    }

    let window_value = window_value(flags, height, admitted);
    let value = cctx_value(flags, candidate);
    let limit = flags.window_limit();

    if window_value.saturating_add(value) <= limit {
        Admission::Admitted
    } else {
        Admission::Throttled {
            window_value,
            value,
            limit,
        }
    }
}
