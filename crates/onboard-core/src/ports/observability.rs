//! Observability sink port - where unexpected exceptions get reported.

use crate::context::ErrorContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

/// One captured exception with the request it happened in.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub severity: Severity,
    pub error_type: String,
    pub message: String,
    pub trace: Option<String>,
    pub context: ErrorContext,
}

impl ErrorReport {
    pub fn new(
        severity: Severity,
        error_type: impl Into<String>,
        message: impl Into<String>,
        context: &ErrorContext,
    ) -> Self {
        Self {
            severity,
            error_type: error_type.into(),
            message: message.into(),
            trace: None,
            context: context.clone(),
        }
    }

    pub fn with_trace(mut self, trace: Option<String>) -> Self {
        self.trace = trace;
        self
    }
}

/// Error reporting sink. Implementations must be safe to call from many
/// requests at once and must not block.
pub trait ErrorReporter: Send + Sync {
    fn capture_exception(&self, report: ErrorReport) -> Result<(), ReportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Reporter unavailable: {0}")]
    Unavailable(String),
}
