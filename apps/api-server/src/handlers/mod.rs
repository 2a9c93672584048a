//! HTTP handlers and route configuration.

mod auth;
mod coupons;
mod health;
mod redemptions;

use actix_web::{HttpRequest, HttpResponse, web};

use onboard_core::AppException;

use crate::middleware::error::AppResult;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(web::scope("/auth").route("/me", web::get().to(auth::me)))
            // Static segments must precede `{id}`
            .service(
                web::scope("/coupons")
                    .route("", web::get().to(coupons::list))
                    .route("", web::post().to(coupons::create))
                    .route("/balance", web::get().to(coupons::balance))
                    .route("/{id}", web::get().to(coupons::get))
                    .route("/{id}", web::put().to(coupons::update))
                    .route("/{id}", web::patch().to(coupons::patch))
                    .route("/{id}", web::delete().to(coupons::delete)),
            )
            .service(
                web::scope("/redemptions")
                    .route("", web::get().to(redemptions::list))
                    .route("", web::post().to(redemptions::create))
                    .route("/recent", web::get().to(redemptions::recent))
                    .route("/{id}", web::get().to(redemptions::get))
                    .route("/{id}", web::delete().to(redemptions::delete)),
            ),
    )
    .default_service(web::to(not_found));
}

/// Fallback for requests no route matches.
async fn not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppException::UnknownRoute(format!("{} {}", req.method(), req.path())).into())
}
