//! Configuration for the order engine

use serde::{Deserialize, Serialize};

/// Order engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfig {
    /// Upper bound on a fulfillment dispatch call (milliseconds); elapsed
    /// dispatch degrades to best-effort, it never fails the order
    pub fulfillment_timeout_ms: u64,

    /// Scheduled progression timing
    pub progression: ProgressionConfig,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            fulfillment_timeout_ms: 5_000,
            progression: ProgressionConfig::default(),
        }
    }
}

/// Timing for the scheduled order progression
///
/// Defaults reproduce the production timeline: processing after ~5s, a
/// midway progress tick ~15s in, completion between ~30s and ~60s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// Enable automatic progression of placed orders
    pub enabled: bool,

    /// Delay from placement to the first processing tick (milliseconds)
    pub to_processing_ms: u64,

    /// Delay from the first tick to the midway tick (milliseconds)
    pub to_midway_ms: u64,

    /// Delay from the midway tick to completion (milliseconds)
    pub to_completion_ms: u64,

    /// Random extra delay added before completion (milliseconds)
    pub completion_jitter_ms: u64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            to_processing_ms: 5_000,
            to_midway_ms: 10_000,
            to_completion_ms: 15_000,
            completion_jitter_ms: 30_000,
        }
    }
}

impl ProgressionConfig {
    /// Fast timings for tests and demos
    pub fn fast() -> Self {
        Self {
            enabled: true,
            to_processing_ms: 10,
            to_midway_ms: 10,
            to_completion_ms: 10,
            completion_jitter_ms: 0,
        }
    }
}

impl OrderConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("Failed to read config: {}", e)))?;
        let config: OrderConfig = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = OrderConfig::default();

        if let Ok(timeout) = std::env::var("ORDER_FULFILLMENT_TIMEOUT_MS") {
            config.fulfillment_timeout_ms = timeout
                .parse()
                .map_err(|e| crate::Error::Config(format!("ORDER_FULFILLMENT_TIMEOUT_MS: {}", e)))?;
        }

        if let Ok(enabled) = std::env::var("ORDER_PROGRESSION_ENABLED") {
            config.progression.enabled = enabled == "1" || enabled.eq_ignore_ascii_case("true");
        }

        Ok(config)
    }
}
