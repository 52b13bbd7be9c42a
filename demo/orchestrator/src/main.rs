// Demo Orchestrator - runs the full panel flow end to end
// Signup + referral, deposit, promo redemption, order lifecycle, cancellation

use account_service::{AccountConfig, AccountManager};
use adapters::{MockFulfillmentClient, TracingNotifier};
use anyhow::Result;
use ledger_core::{AccountId, Ledger, MemoryLedgerStore, Profile};
use order_engine::{
    MemoryOrderStore, OrderConfig, OrderEngine, PlaceOrder, ProgressionConfig,
};
use promo_engine::{MemoryPromoStore, PromoEngine};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    info!("panel demo starting");

    // Core wiring: in-memory stores, mock panel, log-backed notifications
    let ledger = Arc::new(Ledger::new(Arc::new(MemoryLedgerStore::new())));
    let notifier = Arc::new(TracingNotifier);
    let fulfillment = Arc::new(MockFulfillmentClient::new(50, 0.9));

    let accounts = AccountManager::new(
        ledger.clone(),
        notifier.clone(),
        AccountConfig {
            deposit_confirm_delay_ms: 300,
            ..Default::default()
        },
    );
    let promos = PromoEngine::new(Arc::new(MemoryPromoStore::seeded()));
    let orders = OrderEngine::start(
        ledger.clone(),
        Arc::new(MemoryOrderStore::new()),
        fulfillment,
        notifier,
        OrderConfig {
            fulfillment_timeout_ms: 2_000,
            progression: ProgressionConfig {
                enabled: true,
                to_processing_ms: 300,
                to_midway_ms: 300,
                to_completion_ms: 300,
                completion_jitter_ms: 200,
            },
        },
    );

    // 1. Alice signs up, Bob follows through her referral link
    let alice = AccountId::new(1001);
    let bob = AccountId::new(2002);

    accounts
        .authenticate(
            alice,
            Profile {
                first_name: "Alice".into(),
                last_name: String::new(),
                username: "alice".into(),
            },
            None,
        )
        .await?;
    accounts
        .authenticate(
            bob,
            Profile {
                first_name: "Bob".into(),
                last_name: String::new(),
                username: "bob".into(),
            },
            Some("REF1001"),
        )
        .await?;
    info!(
        alice = ledger.balance(alice)?,
        bob = ledger.balance(bob)?,
        "after signup + referral"
    );

    // 2. Bob tops up; the simulated gateway confirms shortly after
    accounts.request_deposit(bob, 50_000, "card").await?;
    tokio::time::sleep(Duration::from_millis(600)).await;
    info!(bob = ledger.balance(bob)?, "after deposit confirmation");

    // 3. Bob redeems the launch promo against a 20 000 order
    let discount = promos.redeem("yangi20", bob, Some(20_000)).await?;
    info!(code = %discount.code, discount = discount.amount, "promo applied");

    // 4. Bob places the discounted order and lets it run to completion
    let order = orders
        .place_order(
            bob,
            PlaceOrder {
                service_ref: "tg-members".into(),
                service_name: "Telegram Members".into(),
                link: "https://t.me/bobs_channel".into(),
                quantity: 2_000,
                price: 20_000 - discount.amount,
            },
        )
        .await?;
    tokio::time::sleep(Duration::from_millis(1_800)).await;
    let settled = orders.get(&order.id)?;
    info!(order = %settled.id, status = %settled.status, progress = settled.progress, "order settled");

    // 5. A second order gets cancelled mid-flight and refunded in full
    let doomed = orders
        .place_order(
            bob,
            PlaceOrder {
                service_ref: "yt-views".into(),
                service_name: "YouTube Views".into(),
                link: "https://youtu.be/demo".into(),
                quantity: 5_000,
                price: 7_000,
            },
        )
        .await?;
    tokio::time::sleep(Duration::from_millis(400)).await;
    let cancelled = orders.cancel(&doomed.id).await?;
    info!(order = %cancelled.id, refunded = cancelled.price, "order cancelled");

    // Final state
    let bob_account = ledger.get_account(bob)?;
    info!(
        balance = bob_account.balance,
        total_orders = bob_account.total_orders,
        total_spent = bob_account.total_spent,
        "bob's final account"
    );
    for txn in ledger.history(bob)? {
        info!(txn = %txn.id, kind = %txn.kind, amount = txn.amount, "trail entry");
    }

    info!("panel demo finished");
    Ok(())
}
