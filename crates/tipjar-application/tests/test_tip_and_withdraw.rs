mod common;

use tokio::sync::watch;

use common::{Chain, fan, owner};
use tipjar_application::withdraw_service::FIAT_UNAVAILABLE;
use tipjar_application::{TipService, WithdrawService};
use tipjar_core::ledger::{LedgerReader, TransactionStatus, Wei};
use tipjar_core::tipping::{FALLBACK_USD_RATE, TipComposer};

#[tokio::test]
async fn test_tip_uses_latest_rate() {
    let chain = Chain::new();
    let profile = chain.claim(owner(), "alice").await;
    let (rates, rx) = watch::channel(None);
    let tips = TipService::new(chain.ledger.clone(), profile.clone(), rx, FALLBACK_USD_RATE);

    let mut composer = TipComposer::new();
    composer.select(10);
    assert!(composer.set_message("keep it up"));
    assert_eq!(tips.current_rate(), FALLBACK_USD_RATE);
    assert_eq!(tips.quote(&composer).unwrap(), Wei(5_000_000_000_000_000));

    rates.send(Some(2500.0)).unwrap();
    assert_eq!(tips.quote(&composer).unwrap(), Wei(4_000_000_000_000_000));

    chain.ledger.connect(Some(fan()));
    tips.send(&composer).await.expect("Should send tip");
    assert!(matches!(tips.status(), TransactionStatus::Success { .. }));

    let record = chain.ledger.profile_details(&profile).await.unwrap();
    assert_eq!(chain.ledger.balance(&profile).await.unwrap(), Wei(4_000_000_000_000_000));
    assert_eq!(record.recent_tips.len(), 1);
    assert_eq!(record.recent_tips[0].message, "keep it up");
}

#[tokio::test]
async fn test_tip_requires_wallet_and_amount() {
    let chain = Chain::new();
    let profile = chain.claim(owner(), "alice").await;
    let (_rates, rx) = watch::channel(Some(3000.0));
    let tips = TipService::new(chain.ledger.clone(), profile.clone(), rx, FALLBACK_USD_RATE);

    let mut composer = TipComposer::new();
    composer.set_custom("abc");
    assert!(tips.send(&composer).await.unwrap_err().is_validation());

    composer.set_custom("7.5");
    chain.ledger.connect(None);
    assert!(tips.send(&composer).await.unwrap_err().is_unauthorized());
    assert!(chain.ledger.balance(&profile).await.unwrap().is_zero());
}

#[tokio::test]
async fn test_withdraw_flow() {
    let chain = Chain::new();
    let profile = chain.claim(owner(), "alice").await;
    chain.tip(fan(), &profile, 12_500_000_000_000_000, "one").await;
    let withdrawals =
        WithdrawService::new(chain.ledger.clone(), chain.ledger.clone(), profile.clone());

    chain.ledger.connect(Some(fan()));
    let summary = withdrawals.summary(None).await.unwrap();
    assert_eq!(summary.ether, "0.0125");
    assert_eq!(summary.fiat, FIAT_UNAVAILABLE);
    assert!(!summary.can_withdraw);
    assert!(withdrawals.withdraw().await.unwrap_err().is_unauthorized());

    chain.ledger.connect(Some(owner()));
    let summary = withdrawals.summary(Some(2000.0)).await.unwrap();
    assert_eq!(summary.fiat, "25.00");
    assert!(summary.can_withdraw);

    withdrawals.withdraw().await.expect("Should withdraw");
    assert_eq!(
        chain.ledger.account_balance(&owner()),
        Wei(12_500_000_000_000_000)
    );
    let summary = withdrawals.summary(Some(2000.0)).await.unwrap();
    assert_eq!(summary.ether, "0");
    assert!(!summary.can_withdraw);
    assert!(withdrawals.withdraw().await.unwrap_err().is_validation());
}
