//! Observability module - exception alerting.

mod alert;

pub use alert::{AlertConfig, AlertError, AlertMessage, AlertReporter, AlertSender};
