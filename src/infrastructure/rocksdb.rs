use crate::domain::asset::Asset;
use crate::domain::ledger::FeeBalance;
use crate::domain::payment::PaymentRecord;
use crate::domain::ports::{FeeLedgerStore, PaymentStore};
use crate::error::{Result, SplitterError};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Column Family for storing fee ledger entries, keyed by asset address.
pub const CF_FEES: &str = "fees";
/// Column Family for storing the payment journal, keyed by big-endian id.
pub const CF_PAYMENTS: &str = "payments";

/// A persistent store implementation using RocksDB.
///
/// Handles storage for both `FeeBalance` and `PaymentRecord` entities using
/// separate Column Families. The payment id counter resumes after the highest
/// id found on open.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    next_id: Arc<AtomicU64>,
}

fn missing_cf(name: &str) -> SplitterError {
    SplitterError::IoError(std::io::Error::other(format!(
        "{name} column family not found"
    )))
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("fees" and "payments") exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_fees = ColumnFamilyDescriptor::new(CF_FEES, Options::default());
        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_fees, cf_payments])?;

        let last_id = {
            let cf = db.cf_handle(CF_PAYMENTS).ok_or_else(|| missing_cf(CF_PAYMENTS))?;
            match db.iterator_cf(&cf, IteratorMode::End).next() {
                Some(item) => {
                    let (key, _) = item?;
                    let bytes: [u8; 8] = key.as_ref().try_into().map_err(|_| {
                        SplitterError::IoError(std::io::Error::other("malformed payment key"))
                    })?;
                    u64::from_be_bytes(bytes)
                }
                None => 0,
            }
        };

        Ok(Self {
            db: Arc::new(db),
            next_id: Arc::new(AtomicU64::new(last_id + 1)),
        })
    }
}

#[async_trait]
impl FeeLedgerStore for RocksDBStore {
    async fn store(&self, balance: FeeBalance) -> Result<()> {
        let cf = self.db.cf_handle(CF_FEES).ok_or_else(|| missing_cf(CF_FEES))?;
        let key = balance.asset.address();
        self.db.put_cf(&cf, key.as_slice(), encode(&balance)?)?;
        Ok(())
    }

    async fn get(&self, asset: &Asset) -> Result<Option<FeeBalance>> {
        let cf = self.db.cf_handle(CF_FEES).ok_or_else(|| missing_cf(CF_FEES))?;
        let key = asset.address();
        match self.db.get_cf(&cf, key.as_slice())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> Result<Vec<FeeBalance>> {
        let cf = self.db.cf_handle(CF_FEES).ok_or_else(|| missing_cf(CF_FEES))?;
        let mut balances = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_key, value) = item?;
            balances.push(decode::<FeeBalance>(&value)?);
        }
        balances.sort_by_key(|balance| balance.asset);
        Ok(balances)
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn next_id(&self) -> Result<u64> {
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn store(&self, record: PaymentRecord) -> Result<()> {
        let cf = self
            .db
            .cf_handle(CF_PAYMENTS)
            .ok_or_else(|| missing_cf(CF_PAYMENTS))?;
        self.db
            .put_cf(&cf, record.id.to_be_bytes(), encode(&record)?)?;
        Ok(())
    }

    async fn get(&self, id: u64) -> Result<Option<PaymentRecord>> {
        let cf = self
            .db
            .cf_handle(CF_PAYMENTS)
            .ok_or_else(|| missing_cf(CF_PAYMENTS))?;
        match self.db.get_cf(&cf, id.to_be_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> Result<Vec<PaymentRecord>> {
        let cf = self
            .db
            .cf_handle(CF_PAYMENTS)
            .ok_or_else(|| missing_cf(CF_PAYMENTS))?;
        let mut records = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_key, value) = item?;
            records.push(decode::<PaymentRecord>(&value)?);
        }
        Ok(records)
    }
}
