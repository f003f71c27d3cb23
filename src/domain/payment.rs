use super::asset::Asset;
use super::fee::Distribution;
use crate::error::{Result, SplitterError};
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An incoming payment to be divided among `recipients`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub recipients: Vec<Address>,
    pub asset: Asset,
    pub amount: U256,
    /// Native value sent along with the call. Must equal `amount` for native
    /// payments and be zero for token payments.
    pub attached_value: U256,
}

impl PaymentRequest {
    pub fn native(recipients: Vec<Address>, amount: U256) -> Self {
        Self {
            recipients,
            asset: Asset::Native,
            amount,
            attached_value: amount,
        }
    }

    /// The zero address stands for the native currency, so passing it yields
    /// a native request.
    pub fn token(recipients: Vec<Address>, token: Address, amount: U256) -> Self {
        Self {
            recipients,
            asset: token.into(),
            amount,
            attached_value: U256::ZERO,
        }
    }

    pub fn with_attached_value(mut self, value: U256) -> Self {
        self.attached_value = value;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.asset.ensure_canonical()?;

        if self.recipients.is_empty() {
            return Err(SplitterError::InvalidRecipients("recipient list is empty"));
        }

        let mut seen = HashSet::with_capacity(self.recipients.len());
        if !self.recipients.iter().all(|recipient| seen.insert(recipient)) {
            return Err(SplitterError::InvalidRecipients("duplicate recipient"));
        }

        let expected = if self.asset.is_native() {
            self.amount
        } else {
            U256::ZERO
        };
        if self.attached_value != expected {
            return Err(SplitterError::AmountMismatch {
                amount: self.amount,
                attached: self.attached_value,
            });
        }

        Ok(())
    }
}

/// Journal entry for a settled payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: u64,
    pub payer: Address,
    pub asset: Asset,
    pub amount: U256,
    pub fee: U256,
    pub share: U256,
    pub dust: U256,
    pub recipients: Vec<Address>,
}

impl PaymentRecord {
    pub fn new(id: u64, payer: Address, request: PaymentRequest, split: &Distribution) -> Self {
        Self {
            id,
            payer,
            asset: request.asset,
            amount: request.amount,
            fee: split.fee,
            share: split.share,
            dust: split.dust,
            recipients: request.recipients,
        }
    }
}
