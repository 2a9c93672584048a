//! Domain entities - the core business objects.

mod coupon;
mod redemption;

pub use coupon::Coupon;
pub use redemption::Redemption;
