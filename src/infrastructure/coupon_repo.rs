use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::coupon::{normalize_code, Coupon, NewCoupon};
use crate::domain::errors::DomainError;
use crate::domain::ports::CouponRepository;
use crate::schema::{coupons, user_coupons};

use super::models::CouponRow;

pub struct DieselCouponRepository {
    pool: DbPool,
}

impl DieselCouponRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CouponRepository for DieselCouponRepository {
    fn find_coupon(&self, code: &str) -> Result<Option<Coupon>, DomainError> {
        let mut conn = self.pool.get()?;
        coupons::table
            .filter(coupons::code.eq(code))
            .select(CouponRow::as_select())
            .first::<CouponRow>(&mut conn)
            .optional()?
            .map(CouponRow::into_coupon)
            .transpose()
    }

    fn list_live_coupons(&self, now: DateTime<Utc>) -> Result<Vec<Coupon>, DomainError> {
        let mut conn = self.pool.get()?;
        coupons::table
            .filter(coupons::is_active.eq(true))
            .filter(coupons::start_date.le(now))
            .filter(coupons::end_date.ge(now))
            .order(coupons::created_at.desc())
            .select(CouponRow::as_select())
            .load::<CouponRow>(&mut conn)?
            .into_iter()
            .map(CouponRow::into_coupon)
            .collect()
    }

    fn create_coupon(&self, id: Uuid, coupon: NewCoupon) -> Result<Coupon, DomainError> {
        let mut conn = self.pool.get()?;
        let row = CouponRow {
            id,
            code: normalize_code(&coupon.code),
            title: coupon.title,
            description: coupon.description,
            kind: coupon.kind.as_str().to_string(),
            value: coupon.value.into_inner(),
            min_order_value: coupon.min_order_value.map(|m| m.into_inner()),
            max_discount: coupon.max_discount.map(|m| m.into_inner()),
            usage_limit: coupon.usage_limit,
            used_count: 0,
            user_limit: coupon.user_limit,
            is_active: coupon.is_active,
            start_date: coupon.start_date,
            end_date: coupon.end_date,
            created_at: Utc::now(),
        };
        diesel::insert_into(coupons::table)
            .values(&row)
            .returning(CouponRow::as_returning())
            .get_result::<CouponRow>(&mut conn)?
            .into_coupon()
    }

    fn redemptions_by(&self, coupon_id: Uuid, user_id: Uuid) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(user_coupons::table
            .filter(user_coupons::coupon_id.eq(coupon_id))
            .filter(user_coupons::user_id.eq(user_id))
            .count()
            .get_result(&mut conn)?)
    }
}
