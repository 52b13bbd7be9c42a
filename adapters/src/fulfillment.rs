//! Fulfillment panel client interface
//!
//! The real client is an HTTP integration owned by the surrounding system;
//! the engine only depends on this trait. [`MockFulfillmentClient`]
//! simulates latency and random failure for tests and demos.

use crate::error::{Error, Result};
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// Opaque order reference issued by the fulfillment panel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalOrderRef(String);

impl ExternalOrderRef {
    /// Wrap a panel-issued reference
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalOrderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Progress state reported by the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FulfillmentStatus {
    /// Accepted, not started
    Pending,
    /// Being delivered
    InProgress,
    /// Delivered in full
    Completed,
    /// Cancelled on the panel side
    Cancelled,
}

/// Client for the third-party fulfillment panel
#[async_trait]
pub trait FulfillmentClient: Send + Sync {
    /// Submit an order; returns the panel's reference on success
    async fn submit(
        &self,
        service_ref: &str,
        link: &str,
        quantity: u32,
    ) -> Result<ExternalOrderRef>;

    /// Query delivery status for a submitted order
    async fn order_status(&self, reference: &ExternalOrderRef) -> Result<FulfillmentStatus>;

    /// Ask the panel to cancel a submitted order
    async fn cancel(&self, reference: &ExternalOrderRef) -> Result<()>;

    /// Remaining prepaid balance on the panel, in panel currency units
    async fn panel_balance(&self) -> Result<f64>;
}

/// Simulated panel client with configurable latency and failure rate
pub struct MockFulfillmentClient {
    latency_ms: u64,
    success_rate: f64,
    orders: Arc<RwLock<HashMap<String, FulfillmentStatus>>>,
}

impl MockFulfillmentClient {
    /// Create a mock client
    ///
    /// `success_rate` in [0.0, 1.0]; submissions outside it fail with a
    /// simulated panel error.
    pub fn new(latency_ms: u64, success_rate: f64) -> Self {
        Self {
            latency_ms,
            success_rate,
            orders: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn should_succeed(&self) -> bool {
        let mut rng = rand::thread_rng();
        rng.gen::<f64>() <= self.success_rate
    }

    fn simulate_delivery(&self, reference: &str) {
        let orders = self.orders.clone();
        let reference = reference.to_string();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;

            let mut orders = orders.write().await;
            if let Some(status) = orders.get_mut(&reference) {
                if *status == FulfillmentStatus::InProgress {
                    *status = FulfillmentStatus::Completed;
                    info!("Mock panel order {} delivered", reference);
                }
            }
        });
    }
}

#[async_trait]
impl FulfillmentClient for MockFulfillmentClient {
    async fn submit(
        &self,
        service_ref: &str,
        link: &str,
        quantity: u32,
    ) -> Result<ExternalOrderRef> {
        info!(
            "Mock panel: submitting {} x{} for {}",
            service_ref, quantity, link
        );

        // Simulate network latency
        tokio::time::sleep(Duration::from_millis(self.latency_ms)).await;

        if !self.should_succeed() {
            warn!("Mock panel: simulated submission failure");
            return Err(Error::Dispatch("simulated panel failure".to_string()));
        }

        let reference = format!("MOCK-{}", Uuid::new_v4());
        self.orders
            .write()
            .await
            .insert(reference.clone(), FulfillmentStatus::InProgress);

        self.simulate_delivery(&reference);

        Ok(ExternalOrderRef::new(reference))
    }

    async fn order_status(&self, reference: &ExternalOrderRef) -> Result<FulfillmentStatus> {
        tokio::time::sleep(Duration::from_millis(self.latency_ms / 2)).await;

        let orders = self.orders.read().await;
        orders
            .get(reference.as_str())
            .copied()
            .ok_or_else(|| Error::OrderNotFound(reference.to_string()))
    }

    async fn cancel(&self, reference: &ExternalOrderRef) -> Result<()> {
        tokio::time::sleep(Duration::from_millis(self.latency_ms / 2)).await;

        let mut orders = self.orders.write().await;
        match orders.get_mut(reference.as_str()) {
            Some(status) if *status == FulfillmentStatus::InProgress => {
                *status = FulfillmentStatus::Cancelled;
                info!("Mock panel order {} cancelled", reference);
                Ok(())
            }
            Some(status) => Err(Error::Dispatch(format!(
                "cannot cancel order in status {:?}",
                status
            ))),
            None => Err(Error::OrderNotFound(reference.to_string())),
        }
    }

    async fn panel_balance(&self) -> Result<f64> {
        tokio::time::sleep(Duration::from_millis(self.latency_ms / 4)).await;
        // High enough to never block a demo run
        Ok(1_000_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_submit_success() {
        let client = MockFulfillmentClient::new(1, 1.0);
        let reference = client.submit("tg-members", "https://t.me/chan", 500).await.unwrap();
        assert!(reference.as_str().starts_with("MOCK-"));

        let status = client.order_status(&reference).await.unwrap();
        assert_eq!(status, FulfillmentStatus::InProgress);
    }

    #[tokio::test]
    async fn test_mock_submit_always_fails_at_zero_rate() {
        let client = MockFulfillmentClient::new(1, 0.0);
        let result = client.submit("ig-likes", "https://example.com/p/1", 100).await;
        assert!(matches!(result, Err(Error::Dispatch(_))));
    }

    #[tokio::test]
    async fn test_mock_cancel() {
        let client = MockFulfillmentClient::new(1, 1.0);
        let reference = client.submit("yt-views", "https://youtu.be/x", 1000).await.unwrap();

        client.cancel(&reference).await.unwrap();
        assert_eq!(
            client.order_status(&reference).await.unwrap(),
            FulfillmentStatus::Cancelled
        );

        // second cancel is rejected
        assert!(client.cancel(&reference).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_reference() {
        let client = MockFulfillmentClient::new(1, 1.0);
        let bogus = ExternalOrderRef::new("MOCK-missing");
        assert!(matches!(
            client.order_status(&bogus).await,
            Err(Error::OrderNotFound(_))
        ));
    }
}
