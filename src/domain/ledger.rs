use super::asset::Asset;
use crate::error::{Result, SplitterError};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Fee ledger entry for one asset.
///
/// Fees move through two phases. A payment first books its fee as `pending`
/// and only promotes it to `accrued` once its transfers have settled, so a
/// withdrawal can never take a fee whose payment is later rolled back. A
/// withdrawal moves `accrued` into `withdrawing` before transferring, which is
/// what a reentrant call observes.
///
/// `accrued == collected - withdrawn - withdrawing` holds between calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBalance {
    pub asset: Asset,
    /// Withdrawable fees.
    pub accrued: U256,
    /// Fees of payments still settling.
    pub pending: U256,
    /// Fees taken by a withdrawal still settling.
    pub withdrawing: U256,
    /// Rounding remainder of equal splits, kept in custody and never withdrawn.
    pub dust: U256,
    pub collected: U256,
    pub withdrawn: U256,
}

fn add(a: U256, b: U256) -> Result<U256> {
    a.checked_add(b)
        .ok_or(SplitterError::Overflow("fee ledger balance"))
}

fn sub(a: U256, b: U256) -> Result<U256> {
    a.checked_sub(b)
        .ok_or(SplitterError::Overflow("fee ledger underflow"))
}

impl FeeBalance {
    pub fn new(asset: Asset) -> Self {
        Self {
            asset,
            accrued: U256::ZERO,
            pending: U256::ZERO,
            withdrawing: U256::ZERO,
            dust: U256::ZERO,
            collected: U256::ZERO,
            withdrawn: U256::ZERO,
        }
    }

    /// Books the fee of a payment that has not settled yet.
    pub fn reserve(&mut self, fee: U256) -> Result<()> {
        self.pending = add(self.pending, fee)?;
        Ok(())
    }

    /// Drops a reservation after its payment failed.
    pub fn release(&mut self, fee: U256) -> Result<()> {
        self.pending = sub(self.pending, fee)?;
        Ok(())
    }

    /// Promotes a reserved fee to withdrawable once its payment settled.
    pub fn settle(&mut self, fee: U256, dust: U256) -> Result<()> {
        let pending = sub(self.pending, fee)?;
        let accrued = add(self.accrued, fee)?;
        let collected = add(self.collected, fee)?;
        let dust = add(self.dust, dust)?;

        self.pending = pending;
        self.accrued = accrued;
        self.collected = collected;
        self.dust = dust;
        Ok(())
    }

    /// Zeroes the withdrawable balance and returns what it held.
    pub fn take(&mut self) -> Result<U256> {
        let amount = self.accrued;
        self.withdrawing = add(self.withdrawing, amount)?;
        self.accrued = U256::ZERO;
        Ok(amount)
    }

    /// Records a withdrawal whose transfer went through.
    pub fn confirm(&mut self, amount: U256) -> Result<()> {
        let withdrawing = sub(self.withdrawing, amount)?;
        self.withdrawn = add(self.withdrawn, amount)?;
        self.withdrawing = withdrawing;
        Ok(())
    }

    /// Puts back an amount whose withdrawal transfer failed.
    pub fn restore(&mut self, amount: U256) -> Result<()> {
        let withdrawing = sub(self.withdrawing, amount)?;
        self.accrued = add(self.accrued, amount)?;
        self.withdrawing = withdrawing;
        Ok(())
    }
}
