use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppException;

/// Coupon entity - a code users can redeem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    /// `None` means each user may redeem it once.
    pub max_redemptions: Option<u32>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    /// Create an available coupon with generated ID and timestamp.
    pub fn new(
        code: String,
        description: String,
        max_redemptions: Option<u32>,
    ) -> Result<Self, AppException> {
        check_max_redemptions(max_redemptions)?;

        Ok(Self {
            id: Uuid::new_v4(),
            code,
            description,
            max_redemptions,
            available: true,
            created_at: Utc::now(),
        })
    }

    /// Replace the editable fields, keeping the ID and creation time.
    pub fn revise(
        self,
        code: String,
        description: String,
        max_redemptions: Option<u32>,
        available: bool,
    ) -> Result<Self, AppException> {
        check_max_redemptions(max_redemptions)?;

        Ok(Self {
            code,
            description,
            max_redemptions,
            available,
            ..self
        })
    }

    pub fn with_availability(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// How many more times a user who already redeemed `redeemed` times may redeem.
    pub fn remaining(&self, redeemed: u32) -> u32 {
        match self.max_redemptions {
            None if redeemed >= 1 => 0,
            None => 1,
            Some(max) => max.saturating_sub(redeemed),
        }
    }

    /// Check whether a user who already redeemed `redeemed` times may redeem again.
    pub fn check_redeemable(&self, redeemed: u32) -> Result<(), AppException> {
        if !self.available {
            return Err(AppException::validation(
                "This coupon is not available for redemption.",
            ));
        }

        match self.max_redemptions {
            None if redeemed > 0 => Err(AppException::validation(
                "This coupon can only be redeemed once per user.",
            )),
            Some(max) if redeemed >= max => Err(AppException::validation(
                "You have reached the redemption limit for this coupon.",
            )),
            _ => Ok(()),
        }
    }
}

fn check_max_redemptions(max_redemptions: Option<u32>) -> Result<(), AppException> {
    if max_redemptions == Some(0) {
        return Err(AppException::validation(
            "Maximum redemptions must be greater than zero, or empty for single use.",
        ));
    }
    Ok(())
}
