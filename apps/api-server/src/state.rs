//! Application state - shared across all handlers.

use std::sync::Arc;

use onboard_core::ports::{CouponRepository, RedemptionRepository, TokenVerifier};
use onboard_infra::{InMemoryCouponRepository, InMemoryRedemptionRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub coupons: Arc<dyn CouponRepository>,
    pub redemptions: Arc<dyn RedemptionRepository>,
    pub tokens: Arc<dyn TokenVerifier>,
}

impl AppState {
    /// Build the state with in-memory storage.
    pub fn in_memory(tokens: Arc<dyn TokenVerifier>) -> Self {
        tracing::info!("Running with in-memory storage");

        Self {
            coupons: Arc::new(InMemoryCouponRepository::new()),
            redemptions: Arc::new(InMemoryRedemptionRepository::new()),
            tokens,
        }
    }
}
