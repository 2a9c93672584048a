//! Redemption handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use onboard_core::domain::Redemption;
use onboard_core::ports::BaseRepository;
use onboard_core::{AppException, RepoError};
use onboard_shared::dto::{RedeemRequest, RedemptionResponse};

use super::coupons::coupon_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

const RECENT_LIMIT: usize = 20;

/// Pair a redemption with its coupon; `None` once the coupon is deleted.
async fn redemption_response(
    state: &AppState,
    redemption: Redemption,
) -> AppResult<Option<RedemptionResponse>> {
    let coupon = state.coupons.find_by_id(redemption.coupon_id).await?;

    Ok(coupon.map(|coupon| RedemptionResponse {
        id: redemption.id,
        user_id: redemption.user_id,
        coupon: coupon_response(coupon),
        redeemed_at: redemption.redeemed_at,
    }))
}

async fn redemption_responses(
    state: &AppState,
    redemptions: Vec<Redemption>,
) -> AppResult<Vec<RedemptionResponse>> {
    let mut body = Vec::with_capacity(redemptions.len());
    for redemption in redemptions {
        if let Some(response) = redemption_response(state, redemption).await? {
            body.push(response);
        }
    }
    Ok(body)
}

/// GET /api/redemptions
pub async fn list(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let redemptions = state.redemptions.list_for_user(identity.user_id).await?;
    let body = redemption_responses(&state, redemptions).await?;

    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/redemptions
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<RedeemRequest>,
) -> AppResult<HttpResponse> {
    let coupon_id = body.into_inner().coupon_id;

    let coupon = state
        .coupons
        .find_by_id(coupon_id)
        .await?
        .ok_or_else(|| AppException::not_found("Coupon does not exist."))?;

    let redemption = state
        .redemptions
        .save_checked(
            Redemption::new(identity.user_id, coupon.id),
            &|redeemed: u32| coupon.check_redeemable(redeemed),
        )
        .await?;
    tracing::info!(
        redemption_id = %redemption.id,
        coupon_id = %coupon.id,
        user_id = %identity.user_id,
        "Coupon redeemed"
    );

    Ok(HttpResponse::Created().json(RedemptionResponse {
        id: redemption.id,
        user_id: redemption.user_id,
        coupon: coupon_response(coupon),
        redeemed_at: redemption.redeemed_at,
    }))
}

/// GET /api/redemptions/recent
pub async fn recent(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let redemptions = state.redemptions.recent(RECENT_LIMIT).await?;
    let body = redemption_responses(&state, redemptions).await?;

    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/redemptions/{id}
pub async fn get(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    // Other users' redemptions are indistinguishable from missing ones
    let redemption = state
        .redemptions
        .find_by_id(path.into_inner())
        .await?
        .filter(|redemption| redemption.user_id == identity.user_id)
        .ok_or(RepoError::NotFound)?;

    let body = redemption_response(&state, redemption)
        .await?
        .ok_or(RepoError::NotFound)?;

    Ok(HttpResponse::Ok().json(body))
}

/// DELETE /api/redemptions/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let redemption = state
        .redemptions
        .find_by_id(path.into_inner())
        .await?
        .filter(|redemption| redemption.user_id == identity.user_id)
        .ok_or(RepoError::NotFound)?;

    state.redemptions.delete(redemption.id).await?;
    tracing::info!(
        redemption_id = %redemption.id,
        user_id = %identity.user_id,
        "Redemption deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}
