//! # Onboard Infrastructure
//!
//! Concrete implementations of the ports defined in `onboard-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `auth` - JWT access token verification

pub mod observability;
pub mod storage;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use observability::TracingReporter;
pub use storage::{InMemoryCouponRepository, InMemoryRedemptionRepository};

#[cfg(feature = "auth")]
pub use auth::{AccessClaims, JwtConfig, JwtVerifier};
