//! Authentication handlers.

use actix_web::HttpResponse;

use onboard_shared::dto::UserResponse;

use crate::middleware::auth::Identity;

/// GET /api/auth/me
pub async fn me(identity: Identity) -> HttpResponse {
    HttpResponse::Ok().json(UserResponse {
        id: identity.user_id.to_string(),
        email: identity.email,
        roles: identity.roles,
    })
}
