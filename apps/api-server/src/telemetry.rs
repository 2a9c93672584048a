//! Telemetry initialization - tracing subscriber and the exception reporter.

use std::sync::Arc;

use onboard_core::ports::ErrorReporter;
use onboard_infra::TracingReporter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::observability::AlertReporter;

/// Telemetry configuration.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Enable JSON logging (for production).
    pub json_logs: bool,
    /// Service name for tracing.
    pub service_name: String,
    /// Forward reported exceptions to an alert channel.
    pub alerts_enabled: bool,
    /// Webhook URL for alerts (Slack, Discord, etc.).
    pub alert_webhook_url: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json_logs: false,
            service_name: "onboard-api".to_string(),
            alerts_enabled: true,
            alert_webhook_url: None,
        }
    }
}

/// Initialize the global tracing subscriber.
pub fn init_telemetry(config: &TelemetryConfig) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,api_server=debug,onboard_core=debug,onboard_infra=debug")
    });

    if config.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        alerts_enabled = config.alerts_enabled,
        "Telemetry initialized"
    );
}

/// Pick the sink unexpected exceptions are reported to.
///
/// Must be called from within the async runtime when alerts are enabled.
pub fn build_reporter(config: &TelemetryConfig) -> Arc<dyn ErrorReporter> {
    if !config.alerts_enabled {
        return Arc::new(TracingReporter::new());
    }

    match &config.alert_webhook_url {
        Some(url) => {
            tracing::info!("Alert webhook configured");
            Arc::new(AlertReporter::webhook(url.clone()))
        }
        None => Arc::new(AlertReporter::console()),
    }
}
