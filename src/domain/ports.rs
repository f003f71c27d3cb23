use super::asset::Asset;
use super::ledger::FeeBalance;
use super::payment::PaymentRecord;
use super::transfer::{Transfer, TransferError};
use crate::error::Result;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;

#[async_trait]
pub trait FeeLedgerStore: Send + Sync {
    async fn store(&self, balance: FeeBalance) -> Result<()>;
    async fn get(&self, asset: &Asset) -> Result<Option<FeeBalance>>;
    async fn get_all(&self) -> Result<Vec<FeeBalance>>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Hands out the id for the next record. Ids are unique per store.
    async fn next_id(&self) -> Result<u64>;
    async fn store(&self, record: PaymentRecord) -> Result<()>;
    async fn get(&self, id: u64) -> Result<Option<PaymentRecord>>;
    async fn get_all(&self) -> Result<Vec<PaymentRecord>>;
}

/// Moves assets on behalf of the splitter.
///
/// `settle` is all-or-nothing: either every instruction in the batch takes
/// effect or none does. Implementations may call back into the splitter while
/// settling, the way a receiving contract would.
#[async_trait]
pub trait TransferService: Send + Sync {
    async fn settle(&self, batch: &[Transfer]) -> std::result::Result<(), TransferError>;

    async fn transfer_native(&self, to: Address, amount: U256) -> std::result::Result<(), TransferError> {
        self.settle(&[Transfer::Native { to, amount }]).await
    }

    async fn transfer_token(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> std::result::Result<(), TransferError> {
        self.settle(&[Transfer::Token {
            token,
            from,
            to,
            amount,
        }])
        .await
    }

    async fn pull_token(
        &self,
        token: Address,
        from: Address,
        amount: U256,
    ) -> std::result::Result<(), TransferError> {
        self.settle(&[Transfer::Pull {
            token,
            from,
            amount,
        }])
        .await
    }
}

/// Answers who is making the current call.
pub trait IdentityService: Send + Sync {
    fn caller_identity(&self) -> Address;
}

impl IdentityService for Address {
    fn caller_identity(&self) -> Address {
        *self
    }
}

pub type FeeLedgerStoreBox = Box<dyn FeeLedgerStore>;
pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type TransferServiceBox = Box<dyn TransferService>;

/// Builds a fresh store, one per splitter instance.
pub type FeeLedgerStoreFactory = Box<dyn Fn() -> FeeLedgerStoreBox + Send + Sync>;
