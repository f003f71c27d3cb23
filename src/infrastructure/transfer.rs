use crate::domain::asset::Asset;
use crate::domain::ports::TransferService;
use crate::domain::transfer::{Transfer, TransferError};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default, Clone)]
struct Books {
    balances: HashMap<(Asset, Address), U256>,
    /// Amount of `token` that `owner` lets custody pull, keyed by `(token, owner)`.
    allowances: HashMap<(Address, Address), U256>,
    rejecting: HashSet<Address>,
}

impl Books {
    fn balance(&self, asset: Asset, holder: Address) -> U256 {
        self.balances
            .get(&(asset, holder))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    fn credit(&mut self, asset: Asset, holder: Address, amount: U256) -> Result<(), TransferError> {
        let entry = self.balances.entry((asset, holder)).or_default();
        *entry = entry
            .checked_add(amount)
            .ok_or(TransferError::BalanceOverflow { asset, holder })?;
        Ok(())
    }

    fn debit(&mut self, asset: Asset, holder: Address, amount: U256) -> Result<(), TransferError> {
        let available = self.balance(asset, holder);
        let remaining =
            available
                .checked_sub(amount)
                .ok_or(TransferError::InsufficientBalance {
                    asset,
                    holder,
                    required: amount,
                    available,
                })?;
        self.balances.insert((asset, holder), remaining);
        Ok(())
    }

    fn spend_allowance(
        &mut self,
        token: Address,
        owner: Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        let available = self
            .allowances
            .get(&(token, owner))
            .copied()
            .unwrap_or(U256::ZERO);
        let remaining =
            available
                .checked_sub(amount)
                .ok_or(TransferError::InsufficientAllowance {
                    token,
                    owner,
                    required: amount,
                    available,
                })?;
        self.allowances.insert((token, owner), remaining);
        Ok(())
    }

    fn apply(&mut self, custody: Address, transfer: &Transfer) -> Result<(), TransferError> {
        if let Some(to) = transfer.recipient()
            && self.rejecting.contains(&to)
        {
            return Err(TransferError::Rejected { to });
        }

        match *transfer {
            Transfer::Attach { from, amount } => {
                self.debit(Asset::Native, from, amount)?;
                self.credit(Asset::Native, custody, amount)
            }
            Transfer::Native { to, amount } => {
                self.debit(Asset::Native, custody, amount)?;
                self.credit(Asset::Native, to, amount)
            }
            Transfer::Token {
                token,
                from,
                to,
                amount,
            } => {
                if from != custody {
                    self.spend_allowance(token, from, amount)?;
                }
                self.debit(Asset::Token(token), from, amount)?;
                self.credit(Asset::Token(token), to, amount)
            }
            Transfer::Pull {
                token,
                from,
                amount,
            } => {
                self.spend_allowance(token, from, amount)?;
                self.debit(Asset::Token(token), from, amount)?;
                self.credit(Asset::Token(token), custody, amount)
            }
        }
    }
}

/// Simulated asset backend holding native and token balances in memory.
///
/// Batches are applied to a scratch copy of the books and committed only when
/// every instruction succeeds, which gives `settle` its all-or-nothing
/// semantics. Addresses marked with [`reject_incoming`](Self::reject_incoming)
/// refuse every transfer sent to them, like a receiver that reverts.
///
/// `Clone` shares the underlying books.
#[derive(Clone)]
pub struct InMemoryTransferService {
    custody: Address,
    books: Arc<RwLock<Books>>,
}

impl InMemoryTransferService {
    pub fn new(custody: Address) -> Self {
        Self {
            custody,
            books: Arc::default(),
        }
    }

    pub fn custody(&self) -> Address {
        self.custody
    }

    /// Credits `holder` out of thin air.
    pub async fn fund(
        &self,
        holder: Address,
        asset: Asset,
        amount: U256,
    ) -> Result<(), TransferError> {
        let mut books = self.books.write().await;
        books.credit(asset, holder, amount)
    }

    /// Lets custody pull up to `amount` of `token` from `owner`, replacing any
    /// previous allowance.
    pub async fn approve(&self, token: Address, owner: Address, amount: U256) {
        let mut books = self.books.write().await;
        books.allowances.insert((token, owner), amount);
    }

    pub async fn allowance(&self, token: Address, owner: Address) -> U256 {
        let books = self.books.read().await;
        books
            .allowances
            .get(&(token, owner))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    pub async fn reject_incoming(&self, address: Address) {
        self.books.write().await.rejecting.insert(address);
    }

    pub async fn accept_incoming(&self, address: Address) {
        self.books.write().await.rejecting.remove(&address);
    }

    pub async fn balance_of(&self, asset: Asset, holder: Address) -> U256 {
        self.books.read().await.balance(asset, holder)
    }

    /// Non-zero balances as `(holder, asset, amount)`, ordered by holder then asset.
    pub async fn balances(&self) -> Vec<(Address, Asset, U256)> {
        let books = self.books.read().await;
        let mut all: Vec<(Address, Asset, U256)> = books
            .balances
            .iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|((asset, holder), amount)| (*holder, *asset, *amount))
            .collect();
        all.sort_by_key(|(holder, asset, _)| (*holder, *asset));
        all
    }
}

#[async_trait]
impl TransferService for InMemoryTransferService {
    async fn settle(&self, batch: &[Transfer]) -> Result<(), TransferError> {
        let mut books = self.books.write().await;
        let mut scratch = books.clone();
        for transfer in batch {
            scratch.apply(self.custody, transfer)?;
        }
        *books = scratch;
        Ok(())
    }
}
