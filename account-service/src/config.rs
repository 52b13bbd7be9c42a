//! Configuration for the account manager

use serde::{Deserialize, Serialize};

/// Account manager configuration
///
/// Amounts are in minor currency units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Bonus credited to every new account
    pub signup_bonus: i64,

    /// Bonus credited to the referrer per referred signup
    pub referral_bonus: i64,

    /// Smallest accepted deposit
    pub min_deposit: i64,

    /// Delay before a simulated deposit auto-confirms (milliseconds)
    pub deposit_confirm_delay_ms: u64,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            signup_bonus: 10_000,
            referral_bonus: 5_000,
            min_deposit: 5_000,
            deposit_confirm_delay_ms: 3_000,
        }
    }
}

impl AccountConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("Failed to read config: {}", e)))?;
        let config: AccountConfig = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = AccountConfig::default();

        if let Ok(bonus) = std::env::var("ACCOUNT_SIGNUP_BONUS") {
            config.signup_bonus = bonus
                .parse()
                .map_err(|e| crate::Error::Config(format!("ACCOUNT_SIGNUP_BONUS: {}", e)))?;
        }

        if let Ok(bonus) = std::env::var("ACCOUNT_REFERRAL_BONUS") {
            config.referral_bonus = bonus
                .parse()
                .map_err(|e| crate::Error::Config(format!("ACCOUNT_REFERRAL_BONUS: {}", e)))?;
        }

        if let Ok(min) = std::env::var("ACCOUNT_MIN_DEPOSIT") {
            config.min_deposit = min
                .parse()
                .map_err(|e| crate::Error::Config(format!("ACCOUNT_MIN_DEPOSIT: {}", e)))?;
        }

        Ok(config)
    }
}
