//! Observability sink implementations.

mod tracing_reporter;

pub use tracing_reporter::TracingReporter;
