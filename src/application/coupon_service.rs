use std::sync::Arc;

use uuid::Uuid;

use crate::domain::coupon::{self, normalize_code, Coupon, NewCoupon};
use crate::domain::errors::DomainError;
use crate::domain::money::Money;
use crate::domain::ports::{Clock, CouponRepository};
use crate::domain::user::Caller;

/// Coupon lookup, quoting and back-office creation.
pub struct CouponService {
    repo: Arc<dyn CouponRepository>,
    clock: Arc<dyn Clock>,
}

impl CouponService {
    pub fn new(repo: Arc<dyn CouponRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    fn find(&self, code: &str) -> Result<Coupon, DomainError> {
        let code = normalize_code(code);
        if code.is_empty() {
            return Err(DomainError::invalid("Coupon code is required"));
        }
        self.repo
            .find_coupon(&code)?
            .ok_or_else(|| DomainError::invalid("Invalid or expired coupon code"))
    }

    /// The coupon behind `code` if it can be redeemed right now.
    pub fn lookup(&self, code: &str) -> Result<Coupon, DomainError> {
        let coupon = self.find(code)?;
        coupon.check_available(self.clock.now())?;
        Ok(coupon)
    }

    /// Live coupons that still have uses left.
    pub fn available(&self) -> Result<Vec<Coupon>, DomainError> {
        let now = self.clock.now();
        Ok(self
            .repo
            .list_live_coupons(now)?
            .into_iter()
            .filter(|c| c.check_available(now).is_ok())
            .collect())
    }

    /// Prices `code` against a cart worth `order_total` for this customer.
    /// Nothing is redeemed until the order is placed.
    pub fn apply(&self, caller: &Caller, code: &str, order_total: &Money) -> Result<(Coupon, Money), DomainError> {
        if order_total.is_negative() {
            return Err(DomainError::invalid("Order total cannot be negative"));
        }
        let coupon = self.find(code)?;
        let used = self.repo.redemptions_by(coupon.id, caller.id)?;
        let discount = coupon::quote(&coupon, used, self.clock.now(), order_total, &Money::zero())?;
        Ok((coupon, discount))
    }

    pub fn create(&self, mut input: NewCoupon) -> Result<Coupon, DomainError> {
        input.validate()?;
        input.code = normalize_code(&input.code);
        let coupon = self.repo.create_coupon(Uuid::new_v4(), input)?;
        log::info!("Coupon {} created", coupon.code);
        Ok(coupon)
    }
}
