//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod observability;
mod repository;

pub use auth::{AuthError, TokenClaims, TokenVerifier};
pub use observability::{ErrorReport, ErrorReporter, ReportError, Severity};
pub use repository::{BaseRepository, CouponRepository, RedemptionCheck, RedemptionRepository};
