//! Promo code redemption engine
//!
//! Validates and atomically redeems discount codes against per-account
//! usage history and global usage caps. Redemption for a given code is
//! serialized, so a concurrent double-redeem by the same account can never
//! both succeed.

pub mod engine;
pub mod error;
pub mod memory;
pub mod store;
pub mod types;

pub use engine::PromoEngine;
pub use error::{Error, Result};
pub use memory::MemoryPromoStore;
pub use store::PromoStore;
pub use types::{Discount, PromoCode, PromoUsage};
