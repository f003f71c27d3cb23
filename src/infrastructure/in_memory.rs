use crate::domain::asset::Asset;
use crate::domain::ledger::FeeBalance;
use crate::domain::payment::PaymentRecord;
use crate::domain::ports::{FeeLedgerStore, PaymentStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// A thread-safe in-memory store for the fee ledger.
///
/// Uses `Arc<RwLock<HashMap<Asset, FeeBalance>>>` to allow shared concurrent access.
/// Ideal for testing or single-run use where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryFeeLedgerStore {
    balances: Arc<RwLock<HashMap<Asset, FeeBalance>>>,
}

impl InMemoryFeeLedgerStore {
    /// Creates a new, empty in-memory fee ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeeLedgerStore for InMemoryFeeLedgerStore {
    async fn store(&self, balance: FeeBalance) -> Result<()> {
        let mut balances = self.balances.write().await;
        balances.insert(balance.asset, balance);
        Ok(())
    }

    async fn get(&self, asset: &Asset) -> Result<Option<FeeBalance>> {
        let balances = self.balances.read().await;
        Ok(balances.get(asset).cloned())
    }

    async fn get_all(&self) -> Result<Vec<FeeBalance>> {
        let balances = self.balances.read().await;
        let mut all: Vec<FeeBalance> = balances.values().cloned().collect();
        all.sort_by_key(|balance| balance.asset);
        Ok(all)
    }
}

/// A thread-safe in-memory journal of settled payments.
///
/// Ids start at 1 and are handed out by an atomic counter.
#[derive(Clone)]
pub struct InMemoryPaymentStore {
    records: Arc<RwLock<BTreeMap<u64, PaymentRecord>>>,
    next_id: Arc<AtomicU64>,
}

impl Default for InMemoryPaymentStore {
    fn default() -> Self {
        Self {
            records: Arc::default(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory payment journal.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn next_id(&self) -> Result<u64> {
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn store(&self, record: PaymentRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert(record.id, record);
        Ok(())
    }

    async fn get(&self, id: u64) -> Result<Option<PaymentRecord>> {
        let records = self.records.read().await;
        Ok(records.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<PaymentRecord>> {
        let records = self.records.read().await;
        Ok(records.values().cloned().collect())
    }
}
