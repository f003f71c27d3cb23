use crate::application::locks::AssetLocks;
use crate::config::SplitterConfig;
use crate::domain::asset::Asset;
use crate::domain::fee::{Distribution, FeeRate};
use crate::domain::ledger::FeeBalance;
use crate::domain::payment::{PaymentRecord, PaymentRequest};
use crate::domain::ports::{
    FeeLedgerStoreBox, IdentityService, PaymentStoreBox, TransferServiceBox,
};
use crate::domain::transfer::Transfer;
use crate::error::{Result, SplitterError};
use alloy_primitives::{Address, U256};
use tracing::{debug, error, info, warn};

/// Splits incoming payments among recipients and keeps the per-asset fee
/// ledger.
///
/// Every mutation of a fee balance happens under that asset's lock, and no lock
/// is held while the transfer service runs. A transfer that calls back into the
/// splitter therefore sees the ledger as already updated for the call in
/// progress: a withdrawal has already zeroed the balance, a payment's fee is
/// still pending and cannot be withdrawn.
///
/// The splitter is `Send + Sync`; share it behind an `Arc`.
pub struct PaymentSplitter {
    config: SplitterConfig,
    fee_store: FeeLedgerStoreBox,
    payment_store: PaymentStoreBox,
    transfers: TransferServiceBox,
    locks: AssetLocks,
}

impl PaymentSplitter {
    /// Creates a new `PaymentSplitter`.
    ///
    /// # Arguments
    ///
    /// * `config` - Admin identity, custody account and fee rate.
    /// * `fee_store` - Backing store for the per-asset fee ledger.
    /// * `payment_store` - Journal of settled payments.
    /// * `transfers` - Backend that moves the assets.
    pub fn new(
        config: SplitterConfig,
        fee_store: FeeLedgerStoreBox,
        payment_store: PaymentStoreBox,
        transfers: TransferServiceBox,
    ) -> Self {
        Self {
            config,
            fee_store,
            payment_store,
            transfers,
            locks: AssetLocks::new(),
        }
    }

    pub fn admin(&self) -> Address {
        self.config.admin
    }

    pub fn custody(&self) -> Address {
        self.config.custody
    }

    pub fn fee_rate(&self) -> FeeRate {
        self.config.fee_rate
    }

    /// Divides `request.amount` equally among its recipients after taking the
    /// fee.
    ///
    /// The fee is reserved before any asset moves and becomes withdrawable once
    /// the whole transfer batch has settled. If the batch fails nothing moves,
    /// the reservation is dropped and the call returns `TransferFailed`.
    ///
    /// Once the batch has settled the payment is final and the call succeeds.
    /// A ledger or journal write failing after that point is logged.
    pub async fn send_payment(
        &self,
        identity: &dyn IdentityService,
        request: PaymentRequest,
    ) -> Result<PaymentRecord> {
        let payer = identity.caller_identity();
        request.validate()?;

        let split = Distribution::compute(
            request.amount,
            self.config.fee_rate,
            request.recipients.len(),
        )?;
        debug!(
            %payer,
            asset = %request.asset,
            amount = %split.amount,
            fee = %split.fee,
            share = %split.share,
            dust = %split.dust,
            "computed distribution"
        );

        let id = self.payment_store.next_id().await?;
        let asset = request.asset;
        let fee = split.fee;
        let dust = split.dust;
        self.update(&asset, move |balance| balance.reserve(fee))
            .await?;

        let batch = self.payment_batch(payer, &request, &split);
        for transfer in &batch {
            debug!(id, %transfer, "queued transfer");
        }
        if let Err(e) = self.transfers.settle(&batch).await {
            warn!(id, %payer, %asset, error = %e, "payment transfers failed, releasing fee");
            self.update(&asset, move |balance| balance.release(fee))
                .await?;
            return Err(e.into());
        }

        if let Err(e) = self
            .update(&asset, move |balance| balance.settle(fee, dust))
            .await
        {
            error!(id, %asset, %fee, error = %e, "payment settled but its fee stays pending");
        }

        let record = PaymentRecord::new(id, payer, request, &split);
        if let Err(e) = self.payment_store.store(record.clone()).await {
            warn!(id, error = %e, "payment settled but its journal entry was not written");
        }

        info!(
            id,
            %payer,
            %asset,
            amount = %record.amount,
            fee = %record.fee,
            recipients = record.recipients.len(),
            "payment settled"
        );
        Ok(record)
    }

    /// Sends the accrued fees of `asset` to `destination` and returns the
    /// amount moved. An empty balance returns zero without touching the
    /// transfer service.
    pub async fn withdraw_fees(
        &self,
        identity: &dyn IdentityService,
        asset: Asset,
        destination: Address,
    ) -> Result<U256> {
        self.authorize(identity)?;
        asset.ensure_canonical()?;

        let amount = self.update(&asset, FeeBalance::take).await?;
        if amount.is_zero() {
            debug!(%asset, "no fees to withdraw");
            return Ok(U256::ZERO);
        }

        let payout = self.payout(asset, destination, amount);
        if let Err(e) = self.transfers.settle(&[payout]).await {
            warn!(transfer = %payout, error = %e, "fee withdrawal failed, restoring balance");
            self.update(&asset, move |balance| balance.restore(amount))
                .await?;
            return Err(e.into());
        }

        if let Err(e) = self
            .update(&asset, move |balance| balance.confirm(amount))
            .await
        {
            error!(%asset, %amount, error = %e, "fees sent but the withdrawal was not confirmed");
        }
        info!(%asset, %destination, %amount, "fees withdrawn");
        Ok(amount)
    }

    /// Sends the accrued fees of every asset to `destination` in one batch.
    ///
    /// Returns the non-zero amounts moved, ordered by asset. Either every
    /// asset is paid out or every balance is restored.
    pub async fn withdraw_all_fees(
        &self,
        identity: &dyn IdentityService,
        destination: Address,
    ) -> Result<Vec<(Asset, U256)>> {
        self.authorize(identity)?;

        let mut assets: Vec<Asset> = self
            .fee_store
            .get_all()
            .await?
            .into_iter()
            .map(|balance| balance.asset)
            .collect();
        assets.sort();

        let mut taken = Vec::with_capacity(assets.len());
        for asset in assets {
            match self.update(&asset, FeeBalance::take).await {
                Ok(amount) if amount.is_zero() => {}
                Ok(amount) => taken.push((asset, amount)),
                Err(e) => {
                    self.restore_all(&taken).await?;
                    return Err(e);
                }
            }
        }

        if taken.is_empty() {
            debug!("no fees to withdraw");
            return Ok(taken);
        }

        let batch: Vec<Transfer> = taken
            .iter()
            .map(|(asset, amount)| self.payout(*asset, destination, *amount))
            .collect();
        if let Err(e) = self.transfers.settle(&batch).await {
            warn!(%destination, assets = taken.len(), error = %e, "fee sweep failed, restoring balances");
            self.restore_all(&taken).await?;
            return Err(e.into());
        }

        for (asset, amount) in &taken {
            let amount = *amount;
            if let Err(e) = self
                .update(asset, move |balance| balance.confirm(amount))
                .await
            {
                error!(%asset, %amount, error = %e, "fees sent but the withdrawal was not confirmed");
            }
        }
        info!(%destination, assets = taken.len(), "all fees withdrawn");
        Ok(taken)
    }

    /// Current ledger entry for `asset`; an asset never paid in reads as zero.
    pub async fn fee_balance(&self, asset: &Asset) -> Result<FeeBalance> {
        Ok(self
            .fee_store
            .get(asset)
            .await?
            .unwrap_or_else(|| FeeBalance::new(*asset)))
    }

    pub async fn fee_balances(&self) -> Result<Vec<FeeBalance>> {
        let mut balances = self.fee_store.get_all().await?;
        balances.sort_by_key(|balance| balance.asset);
        Ok(balances)
    }

    pub async fn payment(&self, id: u64) -> Result<Option<PaymentRecord>> {
        self.payment_store.get(id).await
    }

    pub async fn payments(&self) -> Result<Vec<PaymentRecord>> {
        let mut records = self.payment_store.get_all().await?;
        records.sort_by_key(|record| record.id);
        Ok(records)
    }

    fn authorize(&self, identity: &dyn IdentityService) -> Result<()> {
        let caller = identity.caller_identity();
        if caller != self.config.admin {
            warn!(%caller, "rejected fee withdrawal from non-admin");
            return Err(SplitterError::Unauthorized { caller });
        }
        Ok(())
    }

    fn payment_batch(
        &self,
        payer: Address,
        request: &PaymentRequest,
        split: &Distribution,
    ) -> Vec<Transfer> {
        let mut batch = Vec::with_capacity(request.recipients.len() + 1);
        match request.asset {
            Asset::Native => {
                batch.push(Transfer::Attach {
                    from: payer,
                    amount: request.attached_value,
                });
                batch.extend(request.recipients.iter().map(|to| Transfer::Native {
                    to: *to,
                    amount: split.share,
                }));
            }
            Asset::Token(token) => {
                batch.push(Transfer::Pull {
                    token,
                    from: payer,
                    amount: request.amount,
                });
                batch.extend(request.recipients.iter().map(|to| Transfer::Token {
                    token,
                    from: self.config.custody,
                    to: *to,
                    amount: split.share,
                }));
            }
        }
        batch
    }

    fn payout(&self, asset: Asset, destination: Address, amount: U256) -> Transfer {
        match asset {
            Asset::Native => Transfer::Native {
                to: destination,
                amount,
            },
            Asset::Token(token) => Transfer::Token {
                token,
                from: self.config.custody,
                to: destination,
                amount,
            },
        }
    }

    async fn restore_all(&self, taken: &[(Asset, U256)]) -> Result<()> {
        for (asset, amount) in taken {
            let amount = *amount;
            self.update(asset, move |balance| balance.restore(amount))
                .await?;
        }
        Ok(())
    }

    /// Applies `f` to the ledger entry of `asset` under its lock and persists
    /// the result if anything changed. A failing `f` leaves the store as is.
    async fn update<T, F>(&self, asset: &Asset, f: F) -> Result<T>
    where
        F: FnOnce(&mut FeeBalance) -> Result<T> + Send,
        T: Send,
    {
        let _guard = self.locks.acquire(asset).await;

        let before = self
            .fee_store
            .get(asset)
            .await?
            .unwrap_or_else(|| FeeBalance::new(*asset));
        let mut balance = before.clone();
        let out = f(&mut balance)?;
        if balance != before {
            self.fee_store.store(balance).await?;
        }
        Ok(out)
    }
}
