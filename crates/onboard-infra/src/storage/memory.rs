//! In-memory storage - used when no database is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use onboard_core::domain::{Coupon, Redemption};
use onboard_core::ports::{BaseRepository, CouponRepository, RedemptionCheck, RedemptionRepository};
use onboard_core::{AppException, RepoError};

/// In-memory coupon store using a HashMap with async RwLock.
///
/// Note: Data is lost on process restart.
pub struct InMemoryCouponRepository {
    store: RwLock<HashMap<Uuid, Coupon>>,
}

impl InMemoryCouponRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryCouponRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first(mut coupons: Vec<Coupon>) -> Vec<Coupon> {
    coupons.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    coupons
}

#[async_trait]
impl BaseRepository<Coupon, Uuid> for InMemoryCouponRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Coupon>, RepoError> {
        let store = self.store.read().await;
        Ok(store.get(&id).cloned())
    }

    async fn save(&self, coupon: Coupon) -> Result<Coupon, RepoError> {
        let mut store = self.store.write().await;

        // Mirrors the unique index on `code`
        let duplicate = store
            .values()
            .any(|existing| existing.code == coupon.code && existing.id != coupon.id);
        if duplicate {
            return Err(RepoError::Integrity(format!(
                "coupon code '{}' already exists",
                coupon.code
            )));
        }

        store.insert(coupon.id, coupon.clone());
        Ok(coupon)
    }
}

#[async_trait]
impl CouponRepository for InMemoryCouponRepository {
    async fn list(&self) -> Result<Vec<Coupon>, RepoError> {
        let store = self.store.read().await;
        Ok(newest_first(store.values().cloned().collect()))
    }

    async fn list_available(&self) -> Result<Vec<Coupon>, RepoError> {
        let store = self.store.read().await;
        Ok(newest_first(
            store.values().filter(|c| c.available).cloned().collect(),
        ))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        store.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

/// In-memory redemption store.
pub struct InMemoryRedemptionRepository {
    store: RwLock<Vec<Redemption>>,
}

impl InMemoryRedemptionRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryRedemptionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Redemption, Uuid> for InMemoryRedemptionRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Redemption>, RepoError> {
        let store = self.store.read().await;
        Ok(store.iter().find(|r| r.id == id).cloned())
    }

    async fn save(&self, redemption: Redemption) -> Result<Redemption, RepoError> {
        let mut store = self.store.write().await;
        match store.iter_mut().find(|r| r.id == redemption.id) {
            Some(existing) => *existing = redemption.clone(),
            None => store.push(redemption.clone()),
        }
        Ok(redemption)
    }
}

#[async_trait]
impl RedemptionRepository for InMemoryRedemptionRepository {
    async fn count_for(&self, user_id: Uuid, coupon_id: Uuid) -> Result<u32, RepoError> {
        let store = self.store.read().await;
        count_in(&store, user_id, coupon_id)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Redemption>, RepoError> {
        let store = self.store.read().await;
        let mut redemptions: Vec<Redemption> =
            store.iter().filter(|r| r.user_id == user_id).cloned().collect();
        redemptions.sort_by(|a, b| b.redeemed_at.cmp(&a.redeemed_at));
        Ok(redemptions)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Redemption>, RepoError> {
        let store = self.store.read().await;
        let mut redemptions = store.clone();
        redemptions.sort_by(|a, b| b.redeemed_at.cmp(&a.redeemed_at));
        redemptions.truncate(limit);
        Ok(redemptions)
    }

    async fn save_checked(
        &self,
        redemption: Redemption,
        check: RedemptionCheck<'_>,
    ) -> Result<Redemption, AppException> {
        let mut store = self.store.write().await;
        check(count_in(&store, redemption.user_id, redemption.coupon_id)?)?;

        store.push(redemption.clone());
        Ok(redemption)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        let index = store
            .iter()
            .position(|r| r.id == id)
            .ok_or(RepoError::NotFound)?;
        store.remove(index);
        Ok(())
    }
}

fn count_in(store: &[Redemption], user_id: Uuid, coupon_id: Uuid) -> Result<u32, RepoError> {
    let count = store
        .iter()
        .filter(|r| r.user_id == user_id && r.coupon_id == coupon_id)
        .count();
    u32::try_from(count).map_err(|e| RepoError::Unavailable(e.to_string()))
}
