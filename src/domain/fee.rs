//! Fee and split arithmetic.
//!
//! Everything here is integer-only over `U256` base units and truncates on
//! division. The fee rate is a percentage in fixed point scaled by 10^18, so
//! `fee = amount * numerator / (100 * 10^18)`.

use crate::error::{Result, SplitterError};
use alloy_primitives::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-point scale of the fee numerator.
pub const WAD: u64 = 1_000_000_000_000_000_000;

const ONE_HUNDRED_PERCENT: u128 = 100 * WAD as u128;

/// Percentage applied when no fee rate is configured.
pub const DEFAULT_FEE_PERCENT: Decimal = dec!(10);

fn denominator() -> U256 {
    U256::from(ONE_HUNDRED_PERCENT)
}

/// Share of every payment retained as platform fee.
///
/// Serialized as a plain percentage (`10` means 10%) so configuration files stay
/// readable; the numerator is always bounded by 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct FeeRate(U256);

impl FeeRate {
    /// Builds a rate from its raw numerator (percent scaled by 10^18).
    pub fn from_numerator(numerator: U256) -> Result<Self> {
        if numerator > denominator() {
            return Err(SplitterError::Config(format!(
                "fee numerator {numerator} exceeds 100%"
            )));
        }
        Ok(Self(numerator))
    }

    pub fn from_percent(percent: Decimal) -> Result<Self> {
        if percent.is_sign_negative() {
            return Err(SplitterError::Config(format!(
                "fee percent {percent} is negative"
            )));
        }
        let scaled = percent
            .checked_mul(Decimal::from(WAD))
            .ok_or_else(|| SplitterError::Config(format!("fee percent {percent} is too large")))?;
        if !scaled.fract().is_zero() {
            return Err(SplitterError::Config(format!(
                "fee percent {percent} has more than 18 decimal places"
            )));
        }
        let numerator = scaled
            .to_u128()
            .ok_or_else(|| SplitterError::Config(format!("fee percent {percent} is out of range")))?;
        Self::from_numerator(U256::from(numerator))
    }

    pub fn numerator(&self) -> U256 {
        self.0
    }

    pub fn percent(&self) -> Decimal {
        let numerator = self.0.saturating_to::<u128>();
        Decimal::from_i128_with_scale(numerator as i128, 18).normalize()
    }

    /// `floor(amount * numerator / (100 * 10^18))`.
    pub fn fee_on(&self, amount: U256) -> Result<U256> {
        let scaled = amount
            .checked_mul(self.0)
            .ok_or(SplitterError::Overflow("amount times fee rate"))?;
        Ok(scaled / denominator())
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        Self(U256::from(10 * WAD))
    }
}

impl TryFrom<Decimal> for FeeRate {
    type Error = SplitterError;

    fn try_from(percent: Decimal) -> Result<Self> {
        Self::from_percent(percent)
    }
}

impl From<FeeRate> for Decimal {
    fn from(rate: FeeRate) -> Self {
        rate.percent()
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// How one payment is divided.
///
/// `fee + share * recipients + dust == amount` always holds; `dust` is the
/// truncation remainder of the equal split and is strictly smaller than the
/// recipient count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Distribution {
    pub amount: U256,
    pub fee: U256,
    pub share: U256,
    pub recipients: usize,
    pub dust: U256,
}

impl Distribution {
    pub fn compute(amount: U256, rate: FeeRate, recipients: usize) -> Result<Self> {
        if recipients == 0 {
            return Err(SplitterError::InvalidRecipients("recipient list is empty"));
        }

        let fee = rate.fee_on(amount)?;
        let remainder = amount
            .checked_sub(fee)
            .ok_or(SplitterError::Overflow("fee exceeds amount"))?;
        let count = U256::from(recipients);
        let share = remainder / count;
        let dust = remainder - share * count;

        Ok(Self {
            amount,
            fee,
            share,
            recipients,
            dust,
        })
    }

    /// Total sent to recipients.
    pub fn distributed(&self) -> U256 {
        self.share * U256::from(self.recipients)
    }
}
