//! Coupon handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use onboard_core::domain::Coupon;
use onboard_core::ports::BaseRepository;
use onboard_core::{AppException, RepoError, Violation, Violations};
use onboard_shared::dto::{BalanceEntry, CouponResponse, CreateCouponRequest, UpdateCouponRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

const MAX_CODE_LENGTH: usize = 32;

pub fn coupon_response(coupon: Coupon) -> CouponResponse {
    CouponResponse {
        id: coupon.id,
        code: coupon.code,
        description: coupon.description,
        max_redemptions: coupon.max_redemptions,
        available: coupon.available,
        created_at: coupon.created_at,
    }
}

fn validate_coupon(req: &CreateCouponRequest) -> Result<(), Violations> {
    let mut violations = Violations::new();

    let code = req.code.trim();
    if code.is_empty() {
        violations.push(Violation::field("code", "This field may not be blank."));
    } else if code.len() > MAX_CODE_LENGTH {
        violations.push(Violation::field(
            "code",
            format!("Ensure this field has no more than {MAX_CODE_LENGTH} characters."),
        ));
    }
    if code.chars().any(char::is_whitespace) {
        violations.push(Violation::field("code", "Codes may not contain spaces."));
    }
    if req.description.trim().is_empty() {
        violations.push(Violation::field(
            "description",
            "This field may not be blank.",
        ));
    }

    violations.into_result()
}

/// GET /api/coupons
pub async fn list(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let coupons = if identity.is_staff() {
        state.coupons.list().await?
    } else {
        state.coupons.list_available().await?
    };

    let body: Vec<CouponResponse> = coupons.into_iter().map(coupon_response).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/coupons
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateCouponRequest>,
) -> AppResult<HttpResponse> {
    if !identity.is_staff() {
        return Err(
            AppException::permission_denied("Only administrators can create coupons.").into(),
        );
    }

    let req = body.into_inner();
    validate_coupon(&req)?;

    let coupon = Coupon::new(
        req.code.trim().to_uppercase(),
        req.description.trim().to_string(),
        req.max_redemptions,
    )?
    .with_availability(req.available.unwrap_or(true));

    let saved = state.coupons.save(coupon).await?;
    tracing::info!(coupon_id = %saved.id, code = %saved.code, "Coupon created");

    Ok(HttpResponse::Created().json(coupon_response(saved)))
}

/// GET /api/coupons/{id}
pub async fn get(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let coupon = state
        .coupons
        .find_by_id(path.into_inner())
        .await?
        .ok_or(RepoError::NotFound)?;

    Ok(HttpResponse::Ok().json(coupon_response(coupon)))
}

/// PUT /api/coupons/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CreateCouponRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    edit(&state, &identity, path.into_inner(), |_| req).await
}

/// PATCH /api/coupons/{id}
pub async fn patch(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCouponRequest>,
) -> AppResult<HttpResponse> {
    let changes = body.into_inner();
    edit(&state, &identity, path.into_inner(), |current| merge(current, changes)).await
}

/// Fill the fields a partial edit leaves out from the stored coupon.
/// `max_redemptions` cannot be cleared this way; use PUT for that.
fn merge(current: &Coupon, changes: UpdateCouponRequest) -> CreateCouponRequest {
    CreateCouponRequest {
        code: changes.code.unwrap_or_else(|| current.code.clone()),
        description: changes
            .description
            .unwrap_or_else(|| current.description.clone()),
        max_redemptions: changes.max_redemptions.or(current.max_redemptions),
        available: Some(changes.available.unwrap_or(current.available)),
    }
}

async fn edit(
    state: &AppState,
    identity: &Identity,
    id: Uuid,
    request: impl FnOnce(&Coupon) -> CreateCouponRequest,
) -> AppResult<HttpResponse> {
    if !identity.is_staff() {
        return Err(
            AppException::permission_denied("Only administrators can edit coupons.").into(),
        );
    }

    let coupon = state
        .coupons
        .find_by_id(id)
        .await?
        .ok_or(RepoError::NotFound)?;

    let req = request(&coupon);
    validate_coupon(&req)?;

    let revised = coupon.revise(
        req.code.trim().to_uppercase(),
        req.description.trim().to_string(),
        req.max_redemptions,
        req.available.unwrap_or(true),
    )?;

    let saved = state.coupons.save(revised).await?;
    tracing::info!(coupon_id = %saved.id, code = %saved.code, "Coupon updated");

    Ok(HttpResponse::Ok().json(coupon_response(saved)))
}

/// DELETE /api/coupons/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    if !identity.is_staff() {
        return Err(
            AppException::permission_denied("Only administrators can delete coupons.").into(),
        );
    }

    let id = path.into_inner();
    state.coupons.delete(id).await?;
    tracing::info!(coupon_id = %id, "Coupon deleted");

    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/coupons/balance
pub async fn balance(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let mut entries = Vec::new();

    for coupon in state.coupons.list_available().await? {
        let redeemed = state
            .redemptions
            .count_for(identity.user_id, coupon.id)
            .await?;
        entries.push(BalanceEntry {
            remaining: coupon.remaining(redeemed),
            coupon: coupon_response(coupon),
        });
    }

    Ok(HttpResponse::Ok().json(entries))
}
