use std::sync::Arc;

use onboard_shared::ErrorBody;

use super::handlers::Handler;
use super::{Scope, normalizer};
use crate::context::ErrorContext;
use crate::error::AppException;
use crate::ports::ErrorReporter;

/// Converts any exception into an `(ErrorBody, status)` pair.
///
/// Holds no per-request state; one instance is shared by every request.
#[derive(Clone)]
pub struct ExceptionRouter {
    reporter: Arc<dyn ErrorReporter>,
}

impl ExceptionRouter {
    pub fn new(reporter: Arc<dyn ErrorReporter>) -> Self {
        Self { reporter }
    }

    /// The handler that will build the body for `exc`.
    pub fn handler_for(exc: &AppException) -> Handler {
        Handler::CHAIN
            .into_iter()
            .find(|handler| handler.claims(exc))
            .unwrap_or(Handler::END_OF_CHAIN)
    }

    pub fn route(&self, exc: &AppException, context: &ErrorContext) -> (ErrorBody, u16) {
        let scope = Scope::new(self.reporter.as_ref(), context);

        let (draft, status) = Self::handler_for(exc).build(exc, &scope);
        normalizer::finalize(draft, status, &scope)
    }
}
