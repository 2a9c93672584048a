//! Alerting for reported exceptions.
//!
//! [`AlertReporter`] is an [`ErrorReporter`] that logs each report and queues
//! an alert for a background task, which dispatches it to a configured
//! channel (console, Slack/Discord webhook).

use std::sync::Arc;

use onboard_core::ports::{ErrorReport, ErrorReporter, ReportError, Severity};
use tokio::sync::mpsc;

/// Alert message containing error details.
#[derive(Debug, Clone)]
pub struct AlertMessage {
    pub severity: Severity,
    pub error_type: String,
    pub message: String,
    pub trace: Option<String>,
    pub context: serde_json::Value,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl From<ErrorReport> for AlertMessage {
    fn from(report: ErrorReport) -> Self {
        Self {
            severity: report.severity,
            error_type: report.error_type,
            message: report.message,
            trace: report.trace,
            context: serde_json::to_value(&report.context).unwrap_or_default(),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl AlertMessage {
    fn request_line(&self) -> String {
        let field = |key: &str| {
            self.context
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or("-")
                .to_string()
        };
        format!(
            "{} {} (request {})",
            field("method"),
            field("path"),
            field("request_id")
        )
    }
}

/// Configuration for the alert reporter.
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Reports below this severity are logged but not alerted.
    pub min_severity: Severity,
    /// Channel buffer size.
    pub buffer_size: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            min_severity: Severity::Error,
            buffer_size: 100,
        }
    }
}

/// Trait for alert senders - implement this for different backends.
#[async_trait::async_trait]
pub trait AlertSender: Send + Sync {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("Failed to send alert: {0}")]
    SendError(String),
}

/// Console alert sender - prints alerts to stderr (for development).
pub struct ConsoleAlertSender;

#[async_trait::async_trait]
impl AlertSender for ConsoleAlertSender {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
        eprintln!(
            "\n🚨 {} ALERT 🚨\n\
             Type: {}\n\
             Message: {}\n\
             Request: {}\n\
             Time: {}\n",
            alert.severity.as_str().to_uppercase(),
            alert.error_type,
            alert.message,
            alert.request_line(),
            alert.timestamp
        );
        if let Some(trace) = &alert.trace {
            eprintln!("{trace}");
        }
        Ok(())
    }
}

/// Webhook alert sender - posts alerts to a webhook URL (Slack, Discord, etc.).
pub struct WebhookAlertSender {
    url: String,
    client: reqwest::Client,
}

impl WebhookAlertSender {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl AlertSender for WebhookAlertSender {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
        let payload = serde_json::json!({
            "text": format!(
                "🚨 *{} ERROR*\n*Type:* {}\n*Message:* {}\n*Request:* {}\n*Time:* {}",
                alert.severity.as_str().to_uppercase(),
                alert.error_type,
                alert.message,
                alert.request_line(),
                alert.timestamp
            )
        });

        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| AlertError::SendError(e.to_string()))?;

        Ok(())
    }
}

/// Reporter that logs every report and forwards alerts without blocking the
/// request that raised them.
pub struct AlertReporter {
    sender: mpsc::Sender<AlertMessage>,
    min_severity: Severity,
}

impl AlertReporter {
    /// Create a reporter dispatching to `alert_sender` from a background task.
    pub fn new(alert_sender: Arc<dyn AlertSender>, config: AlertConfig) -> Self {
        let (tx, mut rx) = mpsc::channel::<AlertMessage>(config.buffer_size);

        tokio::spawn(async move {
            while let Some(alert) = rx.recv().await {
                if let Err(e) = alert_sender.send(alert).await {
                    tracing::warn!(error = %e, "Failed to send alert");
                }
            }
        });

        Self {
            sender: tx,
            min_severity: config.min_severity,
        }
    }

    /// Create a reporter that alerts to the console.
    pub fn console() -> Self {
        Self::new(Arc::new(ConsoleAlertSender), AlertConfig::default())
    }

    /// Create a reporter that alerts to a webhook.
    pub fn webhook(url: String) -> Self {
        Self::new(
            Arc::new(WebhookAlertSender::new(url)),
            AlertConfig::default(),
        )
    }

    fn should_alert(&self, severity: Severity) -> bool {
        match self.min_severity {
            Severity::Error => true,
            Severity::Critical => severity == Severity::Critical,
        }
    }
}

impl ErrorReporter for AlertReporter {
    fn capture_exception(&self, report: ErrorReport) -> Result<(), ReportError> {
        tracing::error!(
            severity = report.severity.as_str(),
            error_type = %report.error_type,
            request_id = report.context.request_id.as_deref().unwrap_or(""),
            "{}",
            report.message
        );

        if !self.should_alert(report.severity) {
            return Ok(());
        }

        self.sender
            .try_send(AlertMessage::from(report))
            .map_err(|e| ReportError::Unavailable(e.to_string()))
    }
}
