//! Order lifecycle engine
//!
//! Placement sequence: balance pre-check, order row insert, ledger debit
//! (rolling the row back if the debit loses a race), lifetime counters,
//! best-effort fulfillment dispatch, progression scheduling, notification.
//! The charge is reflected in the ledger before dispatch is attempted; a
//! dispatch failure never touches the charge.
//!
//! All transitions for one order serialize through a per-order mutex, so an
//! administrative cancellation and a scheduled progression tick can race
//! safely: whichever loses observes a terminal state and reports
//! `InvalidTransition` without mutating anything.

use crate::{
    config::OrderConfig,
    metrics::Metrics,
    scheduler::ProgressionHandle,
    store::OrderStore,
    types::{Order, OrderId, OrderStatus, PlaceOrder},
    Error, Result,
};
use adapters::{FulfillmentClient, Notifier, NotifyEvent};
use chrono::Utc;
use dashmap::DashMap;
use ledger_core::{AccountId, Ledger, TxnKind};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

/// Progress assigned by the first processing tick
pub(crate) const FIRST_PROGRESS: u8 = 10;

/// Order lifecycle engine
pub struct OrderEngine {
    ledger: Arc<Ledger>,
    store: Arc<dyn OrderStore>,
    fulfillment: Arc<dyn FulfillmentClient>,
    notifier: Arc<dyn Notifier>,
    config: OrderConfig,
    metrics: Metrics,

    /// Per-order critical sections for status transitions
    locks: DashMap<OrderId, Arc<Mutex<()>>>,

    /// Attached progression driver, if any
    progression: RwLock<Option<ProgressionHandle>>,
}

impl OrderEngine {
    /// Create an engine; call [`OrderEngine::start`] instead when automatic
    /// progression is wanted
    pub fn new(
        ledger: Arc<Ledger>,
        store: Arc<dyn OrderStore>,
        fulfillment: Arc<dyn FulfillmentClient>,
        notifier: Arc<dyn Notifier>,
        config: OrderConfig,
    ) -> Self {
        Self {
            ledger,
            store,
            fulfillment,
            notifier,
            config,
            metrics: Metrics::default(),
            locks: DashMap::new(),
            progression: RwLock::new(None),
        }
    }

    /// Create an engine and spawn its progression driver
    ///
    /// Must run inside a tokio runtime.
    pub fn start(
        ledger: Arc<Ledger>,
        store: Arc<dyn OrderStore>,
        fulfillment: Arc<dyn FulfillmentClient>,
        notifier: Arc<dyn Notifier>,
        config: OrderConfig,
    ) -> Arc<Self> {
        let progression = config.progression.clone();
        let engine = Arc::new(Self::new(ledger, store, fulfillment, notifier, config));
        if progression.enabled {
            let handle = crate::scheduler::spawn_progression_driver(engine.clone(), progression);
            engine.attach_progression(handle);
        }
        engine
    }

    /// Attach a progression driver after construction
    pub fn attach_progression(&self, handle: ProgressionHandle) {
        *self.progression.write() = Some(handle);
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    async fn order_lock(&self, id: &OrderId) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Place an order: charge the ledger, dispatch fulfillment, schedule
    /// progression
    pub async fn place_order(&self, account: AccountId, request: PlaceOrder) -> Result<Order> {
        if request.quantity == 0 {
            return Err(Error::InvalidRequest("quantity must be positive".into()));
        }
        if request.price <= 0 {
            return Err(Error::InvalidRequest("price must be positive".into()));
        }
        if request.link.trim().is_empty() {
            return Err(Error::InvalidRequest("link is required".into()));
        }

        let record = self.ledger.get_account(account)?;
        if record.balance < request.price {
            return Err(Error::InsufficientFunds {
                required: request.price,
                available: record.balance,
            });
        }

        let mut order = Order::new(account, &request);
        self.store.insert(&order)?;

        // the balance may have moved since the pre-check; the debit decides
        if let Err(err) = self
            .ledger
            .debit(
                account,
                request.price,
                TxnKind::Purchase,
                format!("Order: {}", request.service_name),
            )
            .await
        {
            self.store.remove(&order.id)?;
            return Err(err.into());
        }

        self.ledger
            .record_purchase_stats(account, request.price)
            .await?;
        self.metrics.record_order_placed();

        let dispatch = tokio::time::timeout(
            Duration::from_millis(self.config.fulfillment_timeout_ms),
            self.fulfillment
                .submit(&request.service_ref, &request.link, request.quantity),
        )
        .await;
        match dispatch {
            Ok(Ok(reference)) => {
                order.external_ref = Some(reference.to_string());
                order.updated_at = Utc::now();
                self.store.update(&order)?;
                info!(order = %order.id, external = %reference, "fulfillment dispatched");
            }
            Ok(Err(err)) => {
                self.metrics.record_dispatch_failure();
                warn!(order = %order.id, error = %err, "fulfillment dispatch failed; order left pending");
            }
            Err(_) => {
                self.metrics.record_dispatch_failure();
                warn!(order = %order.id, "fulfillment dispatch timed out; order left pending");
            }
        }

        self.schedule_progression(&order.id);
        self.notify(
            account,
            NotifyEvent::OrderAccepted {
                order_id: order.id.to_string(),
                service_name: order.service_name.clone(),
                quantity: order.quantity,
                price: order.price,
            },
        )
        .await;

        info!(order = %order.id, account = %account, price = order.price, "order placed");
        Ok(order)
    }

    /// Apply a state transition
    ///
    /// Permitted transitions: `pending|processing → processing` (progress
    /// tick, monotone, clamped to 1-99), `pending|processing → completed`
    /// (progress forced to 100), `pending|processing → cancelled` (full
    /// refund, progress frozen). Anything else reports
    /// [`Error::InvalidTransition`] and mutates nothing.
    pub async fn update_status(
        &self,
        id: &OrderId,
        new_status: OrderStatus,
        progress: Option<u8>,
    ) -> Result<Order> {
        let _guard = self.order_lock(id).await;
        let mut order = self
            .store
            .get(id)?
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let from = order.status;

        if from.is_terminal() {
            return Err(Error::InvalidTransition {
                from,
                to: new_status,
            });
        }

        match new_status {
            // nothing transitions back to pending
            OrderStatus::Pending => {
                return Err(Error::InvalidTransition {
                    from,
                    to: new_status,
                });
            }
            OrderStatus::Processing => {
                let target = progress.unwrap_or(FIRST_PROGRESS).clamp(1, 99);
                order.status = OrderStatus::Processing;
                // progress never decreases
                order.progress = order.progress.max(target);
            }
            OrderStatus::Completed => {
                order.status = OrderStatus::Completed;
                order.progress = 100;
                order.completed_at = Some(Utc::now());
            }
            OrderStatus::Cancelled => {
                // progress frozen at its last value
                order.status = OrderStatus::Cancelled;
            }
        }
        order.updated_at = Utc::now();
        self.store.update(&order)?;

        match order.status {
            OrderStatus::Completed => {
                self.metrics.record_order_completed();
                info!(order = %order.id, "order completed");
                self.notify(
                    order.account,
                    NotifyEvent::OrderCompleted {
                        order_id: order.id.to_string(),
                        service_name: order.service_name.clone(),
                    },
                )
                .await;
            }
            OrderStatus::Cancelled => {
                self.ledger
                    .credit(
                        order.account,
                        order.price,
                        TxnKind::Refund,
                        format!("Refund: {}", order.service_name),
                    )
                    .await?;
                self.metrics.record_order_cancelled();
                info!(order = %order.id, refunded = order.price, "order cancelled and refunded");
                self.notify(
                    order.account,
                    NotifyEvent::OrderCancelled {
                        order_id: order.id.to_string(),
                        refunded: order.price,
                    },
                )
                .await;
            }
            _ => {
                debug!(order = %order.id, progress = order.progress, "progress tick");
            }
        }

        Ok(order)
    }

    /// Cancel an order, refunding the full charged price
    pub async fn cancel(&self, id: &OrderId) -> Result<Order> {
        self.update_status(id, OrderStatus::Cancelled, None).await
    }

    /// Fetch an order
    pub fn get(&self, id: &OrderId) -> Result<Order> {
        self.store
            .get(id)?
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// All orders of an account, newest first
    pub fn orders_for(&self, account: AccountId) -> Result<Vec<Order>> {
        let mut orders = self.store.orders_for(account)?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    fn schedule_progression(&self, id: &OrderId) {
        match self.progression.read().as_ref() {
            Some(handle) => handle.schedule(id.clone()),
            None => debug!(order = %id, "no progression driver attached"),
        }
    }

    async fn notify(&self, account: AccountId, event: NotifyEvent) {
        if let Err(err) = self.notifier.notify(account, event).await {
            warn!(account = %account, error = %err, "notification dropped");
        }
    }
}
