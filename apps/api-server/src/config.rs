//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use onboard_core::{Violation, Violations};
use onboard_infra::JwtConfig;

use crate::telemetry::TelemetryConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, Violations> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source, collecting every invalid
    /// value instead of stopping at the first.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Violations> {
        let mut violations = Violations::new();

        let port = parse_or(&lookup, "PORT", 8080, &mut violations);

        let jwt_defaults = JwtConfig::default();
        let jwt = JwtConfig {
            secret: lookup("JWT_SECRET").unwrap_or(jwt_defaults.secret),
            issuer: lookup("JWT_ISSUER").unwrap_or(jwt_defaults.issuer),
            leeway_seconds: parse_or(
                &lookup,
                "JWT_LEEWAY_SECONDS",
                jwt_defaults.leeway_seconds,
                &mut violations,
            ),
        };
        if jwt.secret.is_empty() {
            violations.push(Violation::field("JWT_SECRET", "Must not be empty."));
        }

        let telemetry_defaults = TelemetryConfig::default();
        let alert_webhook_url = lookup("ALERT_WEBHOOK_URL").filter(|url| !url.is_empty());
        if let Some(url) = &alert_webhook_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                violations.push(Violation::field(
                    "ALERT_WEBHOOK_URL",
                    "Must be an http(s) URL.",
                ));
            }
        }

        let telemetry = TelemetryConfig {
            json_logs: lookup("LOG_FORMAT")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(telemetry_defaults.json_logs),
            service_name: lookup("OTEL_SERVICE_NAME").unwrap_or(telemetry_defaults.service_name),
            alerts_enabled: lookup("ALERTS_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(telemetry_defaults.alerts_enabled),
            alert_webhook_url,
        };

        violations.into_result()?;

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            jwt,
            telemetry,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    violations: &mut Violations,
) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            violations.push(Violation::field(key, format!("Invalid value '{raw}'.")));
            default
        }),
    }
}
