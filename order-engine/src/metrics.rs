//! Metrics collection for the order lifecycle
//!
//! # Metrics
//!
//! - `orders_placed_total` - Orders successfully charged and created
//! - `orders_completed_total` - Orders delivered in full
//! - `orders_cancelled_total` - Orders cancelled and refunded
//! - `fulfillment_dispatch_failures_total` - Best-effort dispatches that
//!   failed or timed out

use prometheus::{IntCounter, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Orders successfully charged and created
    pub orders_placed_total: IntCounter,

    /// Orders delivered in full
    pub orders_completed_total: IntCounter,

    /// Orders cancelled and refunded
    pub orders_cancelled_total: IntCounter,

    /// Failed or timed-out fulfillment dispatches
    pub dispatch_failures_total: IntCounter,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let orders_placed_total = IntCounter::new(
            "orders_placed_total",
            "Orders successfully charged and created",
        )?;
        registry.register(Box::new(orders_placed_total.clone()))?;

        let orders_completed_total =
            IntCounter::new("orders_completed_total", "Orders delivered in full")?;
        registry.register(Box::new(orders_completed_total.clone()))?;

        let orders_cancelled_total =
            IntCounter::new("orders_cancelled_total", "Orders cancelled and refunded")?;
        registry.register(Box::new(orders_cancelled_total.clone()))?;

        let dispatch_failures_total = IntCounter::new(
            "fulfillment_dispatch_failures_total",
            "Failed or timed-out fulfillment dispatches",
        )?;
        registry.register(Box::new(dispatch_failures_total.clone()))?;

        Ok(Self {
            orders_placed_total,
            orders_completed_total,
            orders_cancelled_total,
            dispatch_failures_total,
            registry,
        })
    }

    /// Record a placed order
    pub fn record_order_placed(&self) {
        self.orders_placed_total.inc();
    }

    /// Record a completed order
    pub fn record_order_completed(&self) {
        self.orders_completed_total.inc();
    }

    /// Record a cancelled order
    pub fn record_order_cancelled(&self) {
        self.orders_cancelled_total.inc();
    }

    /// Record a failed dispatch
    pub fn record_dispatch_failure(&self) {
        self.dispatch_failures_total.inc();
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}
