//! Send flow through the orchestrator: guards, settlement, balance refresh.

mod common;

use common::{test_config, test_services, MockProvider};
use custody_client::{InputOutcome, Key, SendPhase, Wallet};

async fn authed_wallet() -> (
    std::sync::Arc<Wallet>,
    std::sync::Arc<common::MockService>,
) {
    let provider = MockProvider::with_persisted_auth();
    let (factory, wallet_svc, _fiduciary) = test_services();
    wallet_svc.set_address("bcrt1qaddr");
    wallet_svc.set_balance("bcrt1qaddr", 10_000);
    let wallet = Wallet::new(test_config(), provider, factory);
    wallet.init().await;
    (wallet, wallet_svc)
}

#[tokio::test]
async fn confirm_disabled_without_destination_or_amount() {
    let (wallet, _svc) = authed_wallet().await;

    // destination="", amount=5
    wallet.amount_paste(0..1, "5");
    assert!(!wallet.can_confirm());
    assert!(!wallet.open_confirmation());

    // destination set, amount=0
    wallet.set_destination("addr1");
    wallet.amount_paste(0..1, "0");
    assert!(!wallet.can_confirm());

    wallet.amount_paste(0..1, "500");
    assert!(wallet.can_confirm());
}

#[tokio::test]
async fn successful_send_settles_and_refreshes_balance() {
    let (wallet, svc) = authed_wallet().await;
    let calls_before = svc.balance_call_count();

    wallet.set_destination("addr1");
    wallet.amount_paste(0..1, "500");
    assert!(wallet.open_confirmation());
    assert_eq!(wallet.send_phase(), SendPhase::Confirming);

    svc.set_balance("bcrt1qaddr", 9_500);
    let outcome = wallet.submit_send().await.expect("send ran");

    assert!(outcome.succeeded);
    assert!(outcome.message.contains("txid123"));
    assert_eq!(wallet.send_phase(), SendPhase::Settled);

    // Exactly one call with the confirmed request.
    let sent = svc.sent_args();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].destination_address, "addr1");
    assert_eq!(sent[0].amount_in_satoshi, 500);

    // Success triggered a balance refresh for the current address.
    assert_eq!(svc.balance_call_count(), calls_before + 1);
    assert_eq!(wallet.balance_sats(), Some(9_500));
}

#[tokio::test]
async fn failed_send_surfaces_message_verbatim() {
    let (wallet, svc) = authed_wallet().await;
    svc.set_send_result(Err("InsufficientFunds: needed 500, have 10".into()));
    let calls_before = svc.balance_call_count();

    wallet.set_destination("addr1");
    wallet.amount_paste(0..1, "500");
    wallet.open_confirmation();
    let outcome = wallet.submit_send().await.expect("send ran");

    assert!(!outcome.succeeded);
    assert_eq!(outcome.message, "InsufficientFunds: needed 500, have 10");
    assert_eq!(wallet.send_phase(), SendPhase::Settled);
    assert_eq!(svc.balance_call_count(), calls_before, "no refresh on failure");

    wallet.dismiss_outcome();
    assert_eq!(wallet.send_phase(), SendPhase::Idle);
    assert!(wallet.send_outcome().is_none());
}

#[tokio::test]
async fn send_without_client_does_not_start() {
    let provider = MockProvider::with_persisted_auth();
    let (factory, _wallet_svc, _fiduciary) = test_services();
    factory.fail_create.store(true, std::sync::atomic::Ordering::SeqCst);

    let wallet = Wallet::new(test_config(), provider, factory);
    wallet.init().await;

    wallet.set_destination("addr1");
    wallet.amount_paste(0..1, "500");
    wallet.open_confirmation();
    assert!(wallet.submit_send().await.is_none());
    // The flow never left Confirming; nothing settled.
    assert_eq!(wallet.send_phase(), SendPhase::Confirming);
}

#[tokio::test]
async fn amount_edits_flow_into_the_request_only_when_canonical() {
    let (wallet, _svc) = authed_wallet().await;
    wallet.set_destination("addr1");

    // "0" -> "5" -> "50": every committed keystroke updates the amount.
    assert_eq!(
        wallet.amount_key_down(0..1, Key::Char('5')),
        InputOutcome::Accepted { committed: Some(5.0) }
    );
    assert_eq!(
        wallet.amount_key_down(1..1, Key::Char('0')),
        InputOutcome::Accepted { committed: Some(50.0) }
    );
    assert!(wallet.can_confirm());

    // A rejected keystroke changes nothing.
    let rejected = wallet.amount_key_down(2..2, Key::Char('a'));
    assert_eq!(rejected, InputOutcome::Rejected { text: "50a".into() });
    assert_eq!(wallet.amount_text(), "50");
    assert!(wallet.can_confirm());
}

#[tokio::test]
async fn field_edit_after_settlement_returns_to_idle() {
    let (wallet, _svc) = authed_wallet().await;
    wallet.set_destination("addr1");
    wallet.amount_paste(0..1, "500");
    wallet.open_confirmation();
    wallet.submit_send().await.expect("send ran");
    assert_eq!(wallet.send_phase(), SendPhase::Settled);

    wallet.set_destination("addr2");
    assert_eq!(wallet.send_phase(), SendPhase::Idle);
    assert!(wallet.send_outcome().is_none());
}
