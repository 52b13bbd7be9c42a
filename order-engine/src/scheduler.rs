//! Scheduled order progression
//!
//! Placed orders mature on their own: a driver task receives order ids
//! through a bounded mailbox and walks each one through the configured
//! delays — first processing tick, a midway tick with synthetic progress,
//! then completion. Every step goes through [`OrderEngine::update_status`],
//! which re-checks the current state, so a tick that arrives after an
//! administrative cancellation is a quiet no-op rather than a resurrection.

use crate::{
    config::ProgressionConfig,
    engine::{OrderEngine, FIRST_PROGRESS},
    types::{OrderId, OrderStatus},
    Error,
};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Handle for enqueueing orders into the progression driver
#[derive(Clone)]
pub struct ProgressionHandle {
    sender: mpsc::Sender<OrderId>,
}

impl ProgressionHandle {
    /// Enqueue an order for scheduled progression
    ///
    /// Fire-and-forget: a full mailbox is logged, never surfaced to the
    /// caller placing the order.
    pub fn schedule(&self, id: OrderId) {
        if let Err(err) = self.sender.try_send(id) {
            warn!(error = %err, "progression mailbox full; order will not auto-progress");
        }
    }
}

/// Spawn the progression driver
///
/// Returns the handle used by the engine to enqueue placed orders.
pub fn spawn_progression_driver(
    engine: Arc<OrderEngine>,
    config: ProgressionConfig,
) -> ProgressionHandle {
    let (sender, mut mailbox) = mpsc::channel(1024);

    tokio::spawn(async move {
        while let Some(order_id) = mailbox.recv().await {
            let engine = engine.clone();
            let config = config.clone();
            tokio::spawn(async move {
                drive_order(engine, order_id, config).await;
            });
        }
        debug!("progression mailbox closed");
    });

    ProgressionHandle { sender }
}

/// Walk one order through its lifecycle
async fn drive_order(engine: Arc<OrderEngine>, id: OrderId, config: ProgressionConfig) {
    tokio::time::sleep(Duration::from_millis(config.to_processing_ms)).await;
    if !apply(&engine, &id, OrderStatus::Processing, Some(FIRST_PROGRESS)).await {
        return;
    }

    tokio::time::sleep(Duration::from_millis(config.to_midway_ms)).await;
    let midway = rand::thread_rng().gen_range(30..70);
    if !apply(&engine, &id, OrderStatus::Processing, Some(midway)).await {
        return;
    }

    let jitter = if config.completion_jitter_ms > 0 {
        rand::thread_rng().gen_range(0..=config.completion_jitter_ms)
    } else {
        0
    };
    tokio::time::sleep(Duration::from_millis(config.to_completion_ms + jitter)).await;
    apply(&engine, &id, OrderStatus::Completed, None).await;
}

/// Apply one scheduled transition; false stops the remaining steps
async fn apply(
    engine: &OrderEngine,
    id: &OrderId,
    status: OrderStatus,
    progress: Option<u8>,
) -> bool {
    match engine.update_status(id, status, progress).await {
        Ok(_) => true,
        Err(Error::InvalidTransition { .. }) | Err(Error::NotFound(_)) => {
            debug!(order = %id, "progression stopped; order already settled");
            false
        }
        Err(err) => {
            warn!(order = %id, error = %err, "progression tick failed");
            false
        }
    }
}
