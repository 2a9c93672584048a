use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Coupon, Redemption};
use crate::error::{AppException, RepoError};

/// Decides from a user's redemption count whether another redemption is allowed.
pub type RedemptionCheck<'a> = &'a (dyn Fn(u32) -> Result<(), AppException> + Send + Sync);

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;
}

/// Coupon repository. Coupon codes are unique.
#[async_trait]
pub trait CouponRepository: BaseRepository<Coupon, Uuid> {
    /// All coupons, newest first.
    async fn list(&self) -> Result<Vec<Coupon>, RepoError>;

    /// Coupons that can currently be redeemed, newest first.
    async fn list_available(&self) -> Result<Vec<Coupon>, RepoError>;

    /// Delete a coupon; `RepoError::NotFound` when absent.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Redemption repository.
#[async_trait]
pub trait RedemptionRepository: BaseRepository<Redemption, Uuid> {
    /// How many times a user redeemed a coupon.
    async fn count_for(&self, user_id: Uuid, coupon_id: Uuid) -> Result<u32, RepoError>;

    /// A user's redemptions, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Redemption>, RepoError>;

    /// Latest redemptions across all users.
    async fn recent(&self, limit: usize) -> Result<Vec<Redemption>, RepoError>;

    /// Store a new redemption if `check` accepts the user's current count for
    /// that coupon. No other redemption can be stored between count and insert.
    async fn save_checked(
        &self,
        redemption: Redemption,
        check: RedemptionCheck<'_>,
    ) -> Result<Redemption, AppException>;

    /// Delete a redemption; `RepoError::NotFound` when absent.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}
