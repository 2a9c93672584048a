//! Exception handling pipeline.
//!
//! An [`ExceptionRouter`] walks [`Handler::CHAIN`] in order; the first handler
//! that claims the exception builds a draft body (see [`detail`]), which the
//! [`normalizer`] validates before it is returned. Exceptions nobody claims go
//! to the end-of-chain handler, which reports them and answers with a generic
//! server error.

pub mod detail;
pub mod handlers;
pub mod literal;
pub mod normalizer;
mod router;


pub use handlers::Handler;
pub use router::ExceptionRouter;

use crate::context::ErrorContext;
use crate::ports::{ErrorReport, ErrorReporter};

/// Collaborators available while handling one exception.
pub struct Scope<'a> {
    pub reporter: &'a dyn ErrorReporter,
    pub context: &'a ErrorContext,
}

impl<'a> Scope<'a> {
    pub fn new(reporter: &'a dyn ErrorReporter, context: &'a ErrorContext) -> Self {
        Self { reporter, context }
    }

    /// Best-effort report; a failing sink is logged and otherwise ignored.
    pub fn report(&self, report: ErrorReport) {
        let error_type = report.error_type.clone();
        if let Err(err) = self.reporter.capture_exception(report) {
            tracing::warn!(error = %err, error_type = %error_type, "Failed to report exception");
        }
    }
}
