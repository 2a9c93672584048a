//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to create a coupon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCouponRequest {
    pub code: String,
    pub description: String,
    #[serde(default)]
    pub max_redemptions: Option<u32>,
    #[serde(default)]
    pub available: Option<bool>,
}

/// Partial coupon edit; absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCouponRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub max_redemptions: Option<u32>,
    #[serde(default)]
    pub available: Option<bool>,
}

/// A coupon as exposed to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponResponse {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    pub max_redemptions: Option<u32>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

/// How many more times the caller may redeem a coupon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub coupon: CouponResponse,
    pub remaining: u32,
}

/// Request to redeem a coupon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemRequest {
    pub coupon_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub coupon: CouponResponse,
    pub redeemed_at: DateTime<Utc>,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub roles: Vec<String>,
}
