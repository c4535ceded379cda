//! # Rate Limiter Flags
//!
//! Sliding-window admission configuration with per-asset conversion rates.
//! Rates are 18-decimal fixed point so every replica computes the same value.

use super::errors::{CrosschainError, CrosschainResult};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits in a [`DecimalRate`].
pub const DECIMAL_PRECISION: usize = 18;

/// 10^18.
pub fn decimal_one() -> U256 {
    U256::exp10(DECIMAL_PRECISION)
}

/// Non-negative fixed-point rate with 18 fractional digits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DecimalRate(U256);

impl DecimalRate {
    /// Rate from its raw scaled representation.
    pub fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    /// Whole-number rate.
    pub fn from_integer(value: u64) -> Self {
        Self(U256::from(value) * decimal_one())
    }

    /// Raw scaled value (rate * 10^18).
    pub fn raw(&self) -> U256 {
        self.0
    }

    /// Returns true for a zero rate.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `amount * rate`, truncated; saturates on overflow.
    pub fn apply(&self, amount: U256) -> U256 {
        let (product, overflow) = amount.overflowing_mul(self.0);
        if overflow {
            return U256::MAX / decimal_one();
        }
        product / decimal_one()
    }
}

impl FromStr for DecimalRate {
    type Err = CrosschainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CrosschainError::InvalidDecimal(s.to_string());
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if frac_part.len() > DECIMAL_PRECISION {
            return Err(invalid());
        }
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(invalid());
        }

        let int_value = if int_part.is_empty() {
            U256::zero()
        } else {
            U256::from_dec_str(int_part).map_err(|_| invalid())?
        };
        let padded = format!("{:0<width$}", frac_part, width = DECIMAL_PRECISION);
        let frac_value = U256::from_dec_str(&padded).map_err(|_| invalid())?;

        let scaled = int_value
            .checked_mul(decimal_one())
            .and_then(|v| v.checked_add(frac_value))
            .ok_or_else(invalid)?;
        Ok(Self(scaled))
    }
}

impl fmt::Display for DecimalRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let one = decimal_one();
        let int_part = self.0 / one;
        let frac_part = self.0 % one;
        if frac_part.is_zero() {
            return write!(f, "{}", int_part);
        }
        let frac = format!("{:0>width$}", frac_part.to_string(), width = DECIMAL_PRECISION);
        write!(f, "{}.{}", int_part, frac.trim_end_matches('0'))
    }
}

impl TryFrom<String> for DecimalRate {
    type Error = CrosschainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DecimalRate> for String {
    fn from(rate: DecimalRate) -> Self {
        rate.to_string()
    }
}

/// Conversion rate of one asset into ZETA.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    /// Asset (ZRC20 address).
    pub zrc20: String,
    /// Rate; `None` when absent from the configuration.
    pub rate: Option<DecimalRate>,
}

impl Conversion {
    /// Conversion with a rate.
    pub fn new(zrc20: &str, rate: DecimalRate) -> Self {
        Self {
            zrc20: zrc20.to_string(),
            rate: Some(rate),
        }
    }
}

/// Rate limiter configuration singleton.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiterFlags {
    /// Whether admission control is active.
    pub enabled: bool,
    /// Window length in blocks; must be non-negative.
    pub window: i64,
    /// Per-block budget in ZETA base units.
    pub rate: U256,
    /// Per-asset conversion rates; asset ids are unique.
    pub conversions: Vec<Conversion>,
}

impl RateLimiterFlags {
    /// Configuration check.
    pub fn validate(&self) -> CrosschainResult<()> {
        if self.window < 0 {
            return Err(CrosschainError::NegativeWindow(self.window));
        }

        let mut seen = HashSet::new();
        for conversion in &self.conversions {
            if !seen.insert(conversion.zrc20.as_str()) {
                return Err(CrosschainError::DuplicateConversion(
                    conversion.zrc20.clone(),
                ));
            }
            if conversion.rate.is_none() {
                return Err(CrosschainError::MissingConversionRate(
                    conversion.zrc20.clone(),
                ));
            }
        }
        Ok(())
    }

    /// Rate configured for `zrc20` and whether one was found.
    ///
    /// Not found yields a zero rate, never an error.
    pub fn get_conversion(&self, zrc20: &str) -> (DecimalRate, bool) {
        for conversion in &self.conversions {
            if conversion.zrc20 == zrc20 {
                return (conversion.rate.unwrap_or_default(), true);
            }
        }
        (DecimalRate::default(), false)
    }

    /// Enabled with a positive window and a positive rate.
    pub fn is_usable(&self) -> bool {
        self.enabled && self.window > 0 && !self.rate.is_zero()
    }

    /// `rate * window`, saturating.
    pub fn window_limit(&self) -> U256 {
        if self.window <= 0 {
            return U256::zero();
        }
        self.rate.saturating_mul(U256::from(self.window as u64))
    }
}
