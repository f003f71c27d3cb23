use alloy_primitives::U256;
use fee_splitter::application::splitter::PaymentSplitter;
use fee_splitter::config::SplitterConfig;
use fee_splitter::domain::asset::Asset;
use fee_splitter::domain::ledger::FeeBalance;
use fee_splitter::domain::payment::PaymentRequest;
use fee_splitter::domain::ports::{FeeLedgerStoreBox, FeeLedgerStoreFactory};
use fee_splitter::infrastructure::in_memory::{InMemoryFeeLedgerStore, InMemoryPaymentStore};
use fee_splitter::infrastructure::transfer::InMemoryTransferService;

mod common;
use common::*;

#[tokio::test]
async fn test_factory_instantiation() {
    let factory: FeeLedgerStoreFactory =
        Box::new(|| Box::new(InMemoryFeeLedgerStore::new()) as FeeLedgerStoreBox);

    let store = factory();
    let mut balance = FeeBalance::new(Asset::Token(TOKEN));
    balance.dust = U256::from(2);

    // Verify it works
    store.store(balance.clone()).await.unwrap();
    assert_eq!(store.get(&Asset::Token(TOKEN)).await.unwrap(), Some(balance));
    assert!(factory().get(&Asset::Token(TOKEN)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_factory_gives_splitters_separate_ledgers() {
    let factory: FeeLedgerStoreFactory =
        Box::new(|| Box::new(InMemoryFeeLedgerStore::new()) as FeeLedgerStoreBox);
    let transfers = InMemoryTransferService::new(CUSTODY);
    transfers
        .fund(PAYER, Asset::Native, U256::from(1_000))
        .await
        .unwrap();

    let build = |store: FeeLedgerStoreBox| {
        PaymentSplitter::new(
            SplitterConfig::new(ADMIN, CUSTODY),
            store,
            Box::new(InMemoryPaymentStore::new()),
            Box::new(transfers.clone()),
        )
    };
    let first = build(factory());
    let second = build(factory());

    first
        .send_payment(&PAYER, PaymentRequest::native(recipients(2), U256::from(100)))
        .await
        .unwrap();

    assert_eq!(
        first.fee_balance(&Asset::Native).await.unwrap().accrued,
        U256::from(10)
    );
    assert!(second.fee_balances().await.unwrap().is_empty());
}
