use alloy_primitives::U256;
use fee_splitter::domain::asset::Asset;
use fee_splitter::domain::payment::PaymentRequest;
use fee_splitter::domain::transfer::TransferError;
use fee_splitter::error::SplitterError;

mod common;
use common::*;

#[tokio::test]
async fn test_native_split_four_ways() {
    let h = harness();
    h.transfers.fund(PAYER, Asset::Native, ether(500)).await.unwrap();

    let record = h
        .splitter
        .send_payment(&PAYER, PaymentRequest::native(recipients(4), ether(500)))
        .await
        .unwrap();

    let share = U256::from(112_500_000_000_000_000u64);
    assert_eq!(record.fee, ether(50));
    assert_eq!(record.share, share);
    assert_eq!(record.dust, U256::ZERO);
    for recipient in recipients(4) {
        assert_eq!(h.transfers.balance_of(Asset::Native, recipient).await, share);
    }
    assert_eq!(h.transfers.balance_of(Asset::Native, CUSTODY).await, ether(50));

    let balance = h.splitter.fee_balance(&Asset::Native).await.unwrap();
    assert_eq!(balance.accrued, ether(50));
    assert_eq!(balance.pending, U256::ZERO);
}

#[tokio::test]
async fn test_token_split_five_ways() {
    let h = harness();
    let token = Asset::Token(TOKEN);
    h.transfers.fund(PAYER, token, U256::from(250)).await.unwrap();
    h.transfers.approve(TOKEN, PAYER, U256::from(250)).await;

    let record = h
        .splitter
        .send_payment(
            &PAYER,
            PaymentRequest::token(recipients(5), TOKEN, U256::from(250)),
        )
        .await
        .unwrap();

    assert_eq!(record.fee, U256::from(25));
    assert_eq!(record.share, U256::from(45));
    for recipient in recipients(5) {
        assert_eq!(h.transfers.balance_of(token, recipient).await, U256::from(45));
    }
    assert_eq!(h.transfers.balance_of(token, PAYER).await, U256::ZERO);
    assert_eq!(h.transfers.balance_of(token, CUSTODY).await, U256::from(25));
    assert_eq!(h.transfers.allowance(TOKEN, PAYER).await, U256::ZERO);
    assert_eq!(
        h.splitter.fee_balance(&token).await.unwrap().accrued,
        U256::from(25)
    );
}

#[tokio::test]
async fn test_empty_recipients_rejected() {
    let h = harness();
    h.transfers.fund(PAYER, Asset::Native, ether(1000)).await.unwrap();

    let result = h
        .splitter
        .send_payment(&PAYER, PaymentRequest::native(vec![], ether(1000)))
        .await;

    assert!(matches!(result, Err(SplitterError::InvalidRecipients(_))));
    assert!(h.splitter.fee_balances().await.unwrap().is_empty());
    assert!(h.splitter.payments().await.unwrap().is_empty());
    assert_eq!(h.transfers.balance_of(Asset::Native, PAYER).await, ether(1000));
}

#[tokio::test]
async fn test_attached_value_must_match_amount() {
    let h = harness();
    h.transfers.fund(PAYER, Asset::Native, U256::from(100)).await.unwrap();

    let request =
        PaymentRequest::native(recipients(2), U256::from(100)).with_attached_value(U256::from(99));
    let result = h.splitter.send_payment(&PAYER, request).await;

    assert!(matches!(result, Err(SplitterError::AmountMismatch { .. })));
    assert_eq!(h.transfers.balance_of(Asset::Native, PAYER).await, U256::from(100));
    assert!(h.splitter.fee_balances().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_withdraw_native_leaves_token_fees() {
    let h = harness();
    let token = Asset::Token(TOKEN);
    h.transfers.fund(PAYER, Asset::Native, ether(500)).await.unwrap();
    h.transfers.fund(PAYER, token, U256::from(250)).await.unwrap();
    h.transfers.approve(TOKEN, PAYER, U256::from(250)).await;

    h.splitter
        .send_payment(&PAYER, PaymentRequest::native(recipients(4), ether(500)))
        .await
        .unwrap();
    h.splitter
        .send_payment(
            &PAYER,
            PaymentRequest::token(recipients(5), TOKEN, U256::from(250)),
        )
        .await
        .unwrap();

    let withdrawn = h
        .splitter
        .withdraw_fees(&ADMIN, Asset::Native, DEST)
        .await
        .unwrap();

    assert_eq!(withdrawn, ether(50));
    assert_eq!(h.transfers.balance_of(Asset::Native, DEST).await, ether(50));

    let native = h.splitter.fee_balance(&Asset::Native).await.unwrap();
    assert_eq!(native.accrued, U256::ZERO);
    assert_eq!(native.withdrawn, ether(50));

    let tokens = h.splitter.fee_balance(&token).await.unwrap();
    assert_eq!(tokens.accrued, U256::from(25));
    assert_eq!(h.transfers.balance_of(token, DEST).await, U256::ZERO);
}

#[tokio::test]
async fn test_sweep_moves_every_asset() {
    let h = harness();
    let token = Asset::Token(TOKEN);
    h.transfers.fund(PAYER, Asset::Native, ether(500)).await.unwrap();
    h.transfers.fund(PAYER, token, U256::from(250)).await.unwrap();
    h.transfers.approve(TOKEN, PAYER, U256::from(250)).await;

    h.splitter
        .send_payment(&PAYER, PaymentRequest::native(recipients(4), ether(500)))
        .await
        .unwrap();
    h.splitter
        .send_payment(
            &PAYER,
            PaymentRequest::token(recipients(5), TOKEN, U256::from(250)),
        )
        .await
        .unwrap();

    let moved = h.splitter.withdraw_all_fees(&ADMIN, DEST).await.unwrap();
    assert_eq!(
        moved,
        vec![(Asset::Native, ether(50)), (token, U256::from(25))]
    );
    assert_eq!(h.transfers.balance_of(Asset::Native, DEST).await, ether(50));
    assert_eq!(h.transfers.balance_of(token, DEST).await, U256::from(25));

    // Nothing left for a second sweep.
    assert!(
        h.splitter
            .withdraw_all_fees(&ADMIN, DEST)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_custody_holds_fees_and_dust() {
    let h = harness();
    h.transfers.fund(PAYER, Asset::Native, U256::from(1_000)).await.unwrap();

    // 101 wei to three recipients: fee 10, share 30, dust 1.
    for _ in 0..3 {
        let record = h
            .splitter
            .send_payment(&PAYER, PaymentRequest::native(recipients(3), U256::from(101)))
            .await
            .unwrap();
        assert_eq!(record.fee, U256::from(10));
        assert_eq!(record.share, U256::from(30));
        assert_eq!(record.dust, U256::from(1));
    }
    h.splitter
        .withdraw_fees(&ADMIN, Asset::Native, DEST)
        .await
        .unwrap();

    let balance = h.splitter.fee_balance(&Asset::Native).await.unwrap();
    assert_eq!(balance.collected, U256::from(30));
    assert_eq!(balance.withdrawn, U256::from(30));
    assert_eq!(balance.dust, U256::from(3));
    assert_eq!(
        h.transfers.balance_of(Asset::Native, CUSTODY).await,
        balance.collected - balance.withdrawn + balance.dust
    );

    // Dust never leaves custody.
    assert_eq!(
        h.splitter
            .withdraw_fees(&ADMIN, Asset::Native, DEST)
            .await
            .unwrap(),
        U256::ZERO
    );
    assert_eq!(h.transfers.balance_of(Asset::Native, CUSTODY).await, U256::from(3));
}

#[tokio::test]
async fn test_failed_payment_moves_nothing() {
    let h = harness();
    h.transfers.fund(PAYER, Asset::Native, ether(500)).await.unwrap();
    let to = recipients(4);
    h.transfers.reject_incoming(to[2]).await;

    let result = h
        .splitter
        .send_payment(&PAYER, PaymentRequest::native(to.clone(), ether(500)))
        .await;

    assert!(matches!(
        result,
        Err(SplitterError::TransferFailed(TransferError::Rejected { .. }))
    ));
    assert_eq!(h.transfers.balance_of(Asset::Native, PAYER).await, ether(500));
    assert_eq!(h.transfers.balance_of(Asset::Native, to[0]).await, U256::ZERO);

    let balance = h.splitter.fee_balance(&Asset::Native).await.unwrap();
    assert_eq!(balance.pending, U256::ZERO);
    assert_eq!(balance.accrued, U256::ZERO);
    assert!(h.splitter.payments().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_payment_journal() {
    let h = harness();
    h.transfers.fund(PAYER, Asset::Native, ether(2000)).await.unwrap();

    for _ in 0..2 {
        h.splitter
            .send_payment(&PAYER, PaymentRequest::native(recipients(2), ether(1000)))
            .await
            .unwrap();
    }

    let records = h.splitter.payments().await.unwrap();
    assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
    assert!(records.iter().all(|r| r.payer == PAYER && r.fee == ether(100)));
    assert_eq!(h.splitter.payment(2).await.unwrap(), Some(records[1].clone()));
    assert_eq!(h.splitter.payment(3).await.unwrap(), None);
}
