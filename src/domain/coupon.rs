//! Discount coupons: availability rules and the discount they grant.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponKind {
    Percentage,
    Fixed,
    FreeShipping,
}

impl CouponKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CouponKind::Percentage => "PERCENTAGE",
            CouponKind::Fixed => "FIXED",
            CouponKind::FreeShipping => "FREE_SHIPPING",
        }
    }
}

impl fmt::Display for CouponKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CouponKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PERCENTAGE" => Ok(CouponKind::Percentage),
            "FIXED" => Ok(CouponKind::Fixed),
            "FREE_SHIPPING" => Ok(CouponKind::FreeShipping),
            other => Err(DomainError::invalid(format!("Unknown coupon type '{}'", other))),
        }
    }
}

/// Codes are matched case-insensitively and stored upper-case.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: CouponKind,
    #[schema(value_type = f64)]
    pub value: Money,
    #[schema(value_type = Option<f64>)]
    pub min_order_value: Option<Money>,
    #[schema(value_type = Option<f64>)]
    pub max_discount: Option<Money>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub user_limit: i32,
    pub is_active: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.start_date <= now && now <= self.end_date
    }

    /// Active, inside its validity window and not used up.
    pub fn check_available(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.is_live(now) {
            return Err(DomainError::invalid("Invalid or expired coupon code"));
        }
        if self.usage_limit.is_some_and(|limit| self.used_count >= limit) {
            return Err(DomainError::invalid("Coupon usage limit reached"));
        }
        Ok(())
    }

    /// The discount on an order of `order_total` with `shipping` to pay.
    /// Never more than the order total itself.
    pub fn discount_for(&self, order_total: &Money, shipping: &Money) -> Result<Money, DomainError> {
        if let Some(minimum) = &self.min_order_value {
            if order_total < minimum {
                return Err(DomainError::invalid(format!(
                    "Minimum order value of ₹{} required for this coupon",
                    minimum
                )));
            }
        }
        let discount = match self.kind {
            CouponKind::Percentage => {
                let raw = order_total.percent(&self.value);
                match &self.max_discount {
                    Some(cap) if &raw > cap => cap.clone(),
                    _ => raw,
                }
            }
            CouponKind::Fixed => self.value.clone(),
            CouponKind::FreeShipping => shipping.clone(),
        };
        Ok(discount.min(order_total.clone()))
    }
}

/// Everything needed to price `coupon` for one customer.
pub fn quote(
    coupon: &Coupon,
    redemptions_by_user: i64,
    now: DateTime<Utc>,
    order_total: &Money,
    shipping: &Money,
) -> Result<Money, DomainError> {
    coupon.check_available(now)?;
    if redemptions_by_user >= i64::from(coupon.user_limit) {
        return Err(DomainError::invalid("You have already used this coupon"));
    }
    coupon.discount_for(order_total, shipping)
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCoupon {
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: CouponKind,
    #[schema(value_type = f64)]
    pub value: Money,
    #[schema(value_type = Option<f64>)]
    pub min_order_value: Option<Money>,
    #[schema(value_type = Option<f64>)]
    pub max_discount: Option<Money>,
    pub usage_limit: Option<i32>,
    #[serde(default = "default_user_limit")]
    pub user_limit: i32,
    #[serde(default)]
    pub is_active: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

fn default_user_limit() -> i32 {
    1
}

impl NewCoupon {
    pub fn validate(&self) -> Result<(), DomainError> {
        if normalize_code(&self.code).is_empty() || self.title.trim().is_empty() {
            return Err(DomainError::invalid("Missing required fields"));
        }
        if self.value.is_negative() {
            return Err(DomainError::invalid("Coupon value cannot be negative"));
        }
        if self.kind == CouponKind::Percentage && self.value > Money::from_rupees(100) {
            return Err(DomainError::invalid("A percentage coupon cannot exceed 100%"));
        }
        if self.usage_limit.is_some_and(|l| l < 1) || self.user_limit < 1 {
            return Err(DomainError::invalid("Usage limits must be at least 1"));
        }
        if self.end_date <= self.start_date {
            return Err(DomainError::invalid("End date must be after the start date"));
        }
        Ok(())
    }
}

/// A validated coupon travelling with the order that redeems it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redemption {
    pub coupon_id: Uuid,
    pub code: String,
}
