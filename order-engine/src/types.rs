//! Order types and state machine

use chrono::{DateTime, Utc};
use ledger_core::AccountId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique order identifier (`ORD-` prefixed)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(String);

impl OrderId {
    /// Generate a new id (UUIDv7 token, time-ordered)
    pub fn generate() -> Self {
        let token = Uuid::now_v7().simple().to_string().to_uppercase();
        Self(format!("ORD-{}", token))
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Charged, waiting for delivery to start
    Pending,
    /// Being delivered
    Processing,
    /// Delivered in full (terminal)
    Completed,
    /// Cancelled and refunded (terminal)
    Cancelled,
}

impl OrderStatus {
    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

/// Request to place an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrder {
    /// Panel service id
    pub service_ref: String,

    /// Human service label, used in descriptions and notifications
    pub service_name: String,

    /// Target link
    pub link: String,

    /// Ordered quantity
    pub quantity: u32,

    /// Price in minor units
    pub price: i64,
}

/// A purchase of a fulfillable service, tracked through its lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique id
    pub id: OrderId,

    /// Owning account
    pub account: AccountId,

    /// Panel service id
    pub service_ref: String,

    /// Human service label
    pub service_name: String,

    /// Target link
    pub link: String,

    /// Ordered quantity
    pub quantity: u32,

    /// Charged price in minor units
    pub price: i64,

    /// Lifecycle state
    pub status: OrderStatus,

    /// Delivery progress, 0-100
    pub progress: u8,

    /// Fulfillment panel reference when dispatch succeeded
    pub external_ref: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last transition timestamp
    pub updated_at: DateTime<Utc>,

    /// Completion timestamp (terminal `completed` only)
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Create a fresh pending order for a request
    pub fn new(account: AccountId, request: &PlaceOrder) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::generate(),
            account,
            service_ref: request.service_ref.clone(),
            service_name: request.service_name.clone(),
            link: request.link.clone(),
            quantity: request.quantity,
            price: request.price,
            status: OrderStatus::Pending,
            progress: 0,
            external_ref: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }
}
