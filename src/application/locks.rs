use crate::domain::asset::Asset;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per asset, created on first use.
///
/// Serializes read-modify-write of a fee balance without making payments in
/// different assets wait on each other.
#[derive(Default)]
pub struct AssetLocks {
    shards: Mutex<HashMap<Asset, Arc<Mutex<()>>>>,
}

impl AssetLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, asset: &Asset) -> OwnedMutexGuard<()> {
        let lock = {
            let mut shards = self.shards.lock().await;
            shards.entry(*asset).or_default().clone()
        };
        lock.lock_owned().await
    }
}
