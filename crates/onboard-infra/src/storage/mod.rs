//! Coupon and redemption storage implementations.

mod memory;

pub use memory::{InMemoryCouponRepository, InMemoryRedemptionRepository};
