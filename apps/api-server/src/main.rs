//! # Onboard API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use onboard_core::ExceptionRouter;
use onboard_core::ports::TokenVerifier;
use onboard_infra::JwtVerifier;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

#[cfg(test)]
mod tests;

use config::AppConfig;
use middleware::error::ExceptionRouting;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(violations) => {
            telemetry::init_telemetry(&TelemetryConfig::default());
            tracing::error!(errors = ?violations.to_field_errors(), "Invalid configuration");
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                violations.to_string(),
            ));
        }
    };

    telemetry::init_telemetry(&config.telemetry);

    tracing::info!(
        "Starting Onboard API Server on {}:{}",
        config.host,
        config.port
    );

    let router = Arc::new(ExceptionRouter::new(telemetry::build_reporter(
        &config.telemetry,
    )));
    let tokens: Arc<dyn TokenVerifier> = Arc::new(JwtVerifier::new(&config.jwt));
    let state = AppState::in_memory(tokens);

    HttpServer::new(move || {
        App::new()
            .wrap(ExceptionRouting::new(router.clone()))
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
