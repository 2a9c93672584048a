use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Redemption entity - one use of a coupon by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Redemption {
    pub id: Uuid,
    pub user_id: Uuid,
    pub coupon_id: Uuid,
    pub redeemed_at: DateTime<Utc>,
}

impl Redemption {
    pub fn new(user_id: Uuid, coupon_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            coupon_id,
            redeemed_at: Utc::now(),
        }
    }
}
