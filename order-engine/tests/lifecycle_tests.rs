//! End-to-end lifecycle tests across the engine boundary

use adapters::{MockFulfillmentClient, NoopNotifier};
use ledger_core::{Account, AccountId, Ledger, MemoryLedgerStore, Profile, TxnKind, TxnStatus};
use order_engine::{
    MemoryOrderStore, OrderConfig, OrderEngine, OrderStatus, PlaceOrder, ProgressionConfig,
};
use std::sync::Arc;
use std::time::Duration;

async fn funded_ledger(balance: i64) -> (Arc<Ledger>, AccountId) {
    let ledger = Arc::new(Ledger::new(Arc::new(MemoryLedgerStore::new())));
    let account = AccountId::new(1001);
    ledger
        .create_account(Account::new(account, Profile::default(), None))
        .await
        .unwrap();
    ledger
        .credit(account, balance, TxnKind::Deposit, "seed")
        .await
        .unwrap();
    (ledger, account)
}

fn engine_without_progression(ledger: Arc<Ledger>) -> Arc<OrderEngine> {
    let config = OrderConfig {
        fulfillment_timeout_ms: 1_000,
        progression: ProgressionConfig {
            enabled: false,
            ..ProgressionConfig::fast()
        },
    };
    OrderEngine::start(
        ledger,
        Arc::new(MemoryOrderStore::new()),
        Arc::new(MockFulfillmentClient::new(1, 1.0)),
        Arc::new(NoopNotifier),
        config,
    )
}

fn request(price: i64) -> PlaceOrder {
    PlaceOrder {
        service_ref: "ig-followers".to_string(),
        service_name: "Instagram Followers".to_string(),
        link: "https://instagram.com/someone".to_string(),
        quantity: 1_000,
        price,
    }
}

/// Cancelling a processing order restores the exact pre-purchase balance
#[tokio::test]
async fn test_cancellation_round_trip() {
    let (ledger, account) = funded_ledger(30_000).await;
    let engine = engine_without_progression(ledger.clone());

    let pre_purchase = ledger.balance(account).unwrap();
    let order = engine.place_order(account, request(7_000)).await.unwrap();
    assert_eq!(ledger.balance(account).unwrap(), pre_purchase - 7_000);

    engine
        .update_status(&order.id, OrderStatus::Processing, Some(35))
        .await
        .unwrap();

    let cancelled = engine.cancel(&order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.progress, 35);
    assert_eq!(ledger.balance(account).unwrap(), pre_purchase);

    // charge and refund cancel out in the trail
    let sum: i64 = ledger
        .history(account)
        .unwrap()
        .iter()
        .filter(|t| t.status == TxnStatus::Completed)
        .map(|t| t.amount)
        .sum();
    assert_eq!(sum, pre_purchase);
}

/// A cancellation racing the scheduled progression settles on exactly one
/// terminal state with a consistent balance
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancel_races_progression() {
    let (ledger, account) = funded_ledger(30_000).await;
    let config = OrderConfig {
        fulfillment_timeout_ms: 1_000,
        progression: ProgressionConfig::fast(),
    };
    let engine = OrderEngine::start(
        ledger.clone(),
        Arc::new(MemoryOrderStore::new()),
        Arc::new(MockFulfillmentClient::new(1, 1.0)),
        Arc::new(NoopNotifier),
        config,
    );

    let pre_purchase = ledger.balance(account).unwrap();
    let order = engine.place_order(account, request(7_000)).await.unwrap();

    // race the driver; the cancel may land before or after completion
    let _ = engine.cancel(&order.id).await;
    tokio::time::sleep(Duration::from_millis(400)).await;

    let settled = engine.get(&order.id).unwrap();
    match settled.status {
        OrderStatus::Cancelled => {
            assert_eq!(ledger.balance(account).unwrap(), pre_purchase);
        }
        OrderStatus::Completed => {
            assert_eq!(ledger.balance(account).unwrap(), pre_purchase - 7_000);
            assert_eq!(settled.progress, 100);
        }
        other => panic!("order failed to settle: {other}"),
    }

    // whichever way the race went, the trail still sums to the balance
    let sum: i64 = ledger
        .history(account)
        .unwrap()
        .iter()
        .filter(|t| t.status == TxnStatus::Completed)
        .map(|t| t.amount)
        .sum();
    assert_eq!(ledger.balance(account).unwrap(), sum);
}

/// Placement and cancellation across many accounts keeps every trail intact
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_accounts_stay_consistent() {
    let ledger = Arc::new(Ledger::new(Arc::new(MemoryLedgerStore::new())));
    let engine = engine_without_progression(ledger.clone());

    let mut handles = Vec::new();
    for i in 1..=6 {
        let ledger = ledger.clone();
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let account = AccountId::new(i);
            ledger
                .create_account(Account::new(account, Profile::default(), None))
                .await
                .unwrap();
            ledger
                .credit(account, 50_000, TxnKind::Deposit, "seed")
                .await
                .unwrap();

            for _ in 0..5 {
                let order = engine.place_order(account, request(4_000)).await.unwrap();
                engine.cancel(&order.id).await.unwrap();
            }
            account
        }));
    }

    for handle in handles {
        let account = handle.await.unwrap();
        assert_eq!(ledger.balance(account).unwrap(), 50_000);
        // seed + 5 x (purchase + refund)
        assert_eq!(ledger.history(account).unwrap().len(), 11);
    }
}
