//! Error reporter that turns captured exceptions into tracing events.

use onboard_core::ports::{ErrorReport, ErrorReporter, ReportError};

/// Emits one `ERROR` event per report, with the request context as JSON.
#[derive(Debug, Default, Clone)]
pub struct TracingReporter;

impl TracingReporter {
    pub fn new() -> Self {
        Self
    }
}

impl ErrorReporter for TracingReporter {
    fn capture_exception(&self, report: ErrorReport) -> Result<(), ReportError> {
        let context = serde_json::to_string(&report.context)
            .map_err(|e| ReportError::Unavailable(e.to_string()))?;

        tracing::error!(
            severity = report.severity.as_str(),
            error_type = %report.error_type,
            context = %context,
            trace = report.trace.as_deref().unwrap_or(""),
            "{}",
            report.message
        );

        Ok(())
    }
}
