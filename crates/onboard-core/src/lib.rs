//! # Onboard Core
//!
//! The domain layer of the Onboard backend: the exception taxonomy, the
//! pipeline that turns exceptions into client-facing error bodies, coupon
//! rules, and the ports infrastructure implements.
//! This crate performs no I/O.

pub mod context;
pub mod domain;
pub mod error;
pub mod handling;
pub mod ports;
pub mod taxonomy;
pub mod validation;

pub use context::ErrorContext;
pub use error::{AppException, Detail, FrameworkDetail, FrameworkError, RepoError};
pub use handling::ExceptionRouter;
pub use taxonomy::ErrorKind;
pub use validation::{Violation, Violations};
