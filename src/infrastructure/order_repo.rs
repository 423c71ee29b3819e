use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::money::Money;
use crate::domain::notification::OutboxMessage;
use crate::domain::order::{
    verify_subtotal, ListResult, NewOrder, OrderFilter, OrderStatus, OrderUpdate, OrderView,
    PaymentStatus, PricedLine,
};
use crate::domain::paging;
use crate::domain::ports::OrderRepository;
use crate::domain::coupon::Redemption;
use crate::schema::{
    cart_items, coupons, order_items, order_status_history, orders, products, user_addresses,
    user_coupons,
};

use super::models::{
    DeliveryDetailsChangeset, NewAddressRow, NewOrderItemRow, NewOrderRow, NewStatusHistoryRow,
    NewUserCouponRow, OrderItemRow, OrderRow,
};
use super::outbox_repo;

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn record_history(
    conn: &mut PgConnection,
    order_id: Uuid,
    status: OrderStatus,
    note: &str,
) -> QueryResult<usize> {
    diesel::insert_into(order_status_history::table)
        .values(&NewStatusHistoryRow {
            id: Uuid::new_v4(),
            order_id,
            status: status.as_str().to_string(),
            note: Some(note.to_string()),
        })
        .execute(conn)
}

/// Resolves each cart line against the live, active catalog row.
fn price_lines(conn: &mut PgConnection, order: &NewOrder) -> Result<Vec<PricedLine>, DomainError> {
    order
        .lines
        .iter()
        .map(|line| {
            let product: Option<(String, BigDecimal)> = products::table
                .filter(products::id.eq(&line.product_id))
                .filter(products::is_active.eq(true))
                .select((products::title_en, products::price))
                .first(conn)
                .optional()?;
            let (product_name, price) = product.ok_or_else(|| {
                DomainError::invalid(format!("Product '{}' is not available", line.product_id))
            })?;
            Ok(PricedLine {
                product_id: line.product_id.clone(),
                product_name,
                unit_price: Money::new(price),
                quantity: line.quantity,
            })
        })
        .collect()
}

/// Check-and-decrement in one statement; a short row aborts the transaction.
fn take_stock(conn: &mut PgConnection, line: &PricedLine) -> Result<(), DomainError> {
    let updated = diesel::update(
        products::table
            .filter(products::id.eq(&line.product_id))
            .filter(products::stock.ge(line.quantity)),
    )
    .set((
        products::stock.eq(products::stock - line.quantity),
        products::sales_count.eq(products::sales_count + line.quantity),
        products::updated_at.eq(Utc::now()),
    ))
    .execute(conn)?;

    if updated == 0 {
        return Err(DomainError::invalid(format!(
            "Insufficient stock for product '{}'",
            line.product_id
        )));
    }
    Ok(())
}

/// Counts the redemption against the coupon's global limit in one
/// conditional update and records who used it on which order.
fn redeem_coupon(
    conn: &mut PgConnection,
    redemption: &Redemption,
    user_id: Uuid,
    order_id: Uuid,
) -> Result<(), DomainError> {
    let updated = diesel::update(
        coupons::table.filter(coupons::id.eq(redemption.coupon_id)).filter(
            coupons::usage_limit
                .is_null()
                .or(coupons::used_count.lt(coupons::usage_limit.assume_not_null())),
        ),
    )
    .set(coupons::used_count.eq(coupons::used_count + 1))
    .execute(conn)?;

    if updated == 0 {
        return Err(DomainError::invalid("Coupon usage limit reached"));
    }

    diesel::insert_into(user_coupons::table)
        .values(&NewUserCouponRow {
            id: Uuid::new_v4(),
            coupon_id: redemption.coupon_id,
            user_id,
            order_id,
        })
        .execute(conn)?;
    Ok(())
}

fn load_view(conn: &mut PgConnection, id: Uuid) -> Result<Option<OrderView>, DomainError> {
    let Some(order) = orders::table
        .find(id)
        .select(OrderRow::as_select())
        .first(conn)
        .optional()?
    else {
        return Ok(None);
    };

    let items = OrderItemRow::belonging_to(&order)
        .select(OrderItemRow::as_select())
        .order(order_items::created_at.asc())
        .load(conn)?;
    order.into_view(items).map(Some)
}

fn with_items(conn: &mut PgConnection, rows: Vec<OrderRow>) -> Result<Vec<OrderView>, DomainError> {
    let items = OrderItemRow::belonging_to(&rows)
        .select(OrderItemRow::as_select())
        .order(order_items::created_at.asc())
        .load(conn)?;
    items
        .grouped_by(&rows)
        .into_iter()
        .zip(rows)
        .map(|(items, order)| order.into_view(items))
        .collect()
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: NewOrder, outbox: Vec<OutboxMessage>) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let priced = price_lines(conn, &order)?;
            verify_subtotal(&priced, &order.subtotal)?;

            let address_id = Uuid::new_v4();
            let address = &order.address;
            diesel::insert_into(user_addresses::table)
                .values(&NewAddressRow {
                    id: address_id,
                    user_id: order.user_id,
                    full_name: address.full_name.clone(),
                    phone: address.phone.clone(),
                    address_line1: address.address_line1.clone(),
                    address_line2: address.address_line2.clone(),
                    city: address.city.clone(),
                    state: address.state.clone(),
                    pincode: address.pincode.clone(),
                    is_default: false,
                })
                .execute(conn)?;

            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order.id,
                    order_number: order.order_number.clone(),
                    user_id: order.user_id,
                    address_id,
                    subtotal: order.subtotal.clone().into_inner(),
                    shipping_cost: order.shipping_cost.clone().into_inner(),
                    tax_amount: order.tax_amount.clone().into_inner(),
                    discount_amount: order.discount_amount.clone().into_inner(),
                    total_amount: order.total_amount.clone().into_inner(),
                    status: OrderStatus::Pending.as_str().to_string(),
                    payment_status: PaymentStatus::Pending.as_str().to_string(),
                    payment_method: order.payment_method.as_str().to_string(),
                    coupon_code: order.coupon.as_ref().map(|c| c.code.clone()),
                    shipping_address: address.one_line(),
                    shipping_method: order.shipping_method.clone(),
                    estimated_delivery: order.estimated_delivery,
                })
                .execute(conn)?;

            for line in &priced {
                take_stock(conn, line)?;
            }

            let items: Vec<NewOrderItemRow> = priced
                .iter()
                .map(|line| NewOrderItemRow {
                    id: Uuid::new_v4(),
                    order_id: order.id,
                    product_id: line.product_id.clone(),
                    product_name: line.product_name.clone(),
                    price: line.unit_price.clone().into_inner(),
                    quantity: line.quantity,
                    total: line.total().into_inner(),
                })
                .collect();
            diesel::insert_into(order_items::table)
                .values(&items)
                .execute(conn)?;

            if let Some(redemption) = &order.coupon {
                redeem_coupon(conn, redemption, order.user_id, order.id)?;
            }

            let ordered: Vec<&str> = priced.iter().map(|l| l.product_id.as_str()).collect();
            diesel::delete(
                cart_items::table
                    .filter(cart_items::user_id.eq(order.user_id))
                    .filter(cart_items::product_id.eq_any(ordered)),
            )
            .execute(conn)?;

            record_history(conn, order.id, OrderStatus::Pending, "Order placed successfully")?;
            outbox_repo::enqueue(conn, outbox)?;

            load_view(conn, order.id)?
                .ok_or_else(|| DomainError::Internal("order vanished after insert".into()))
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;
        load_view(&mut conn, id)
    }

    fn find_by_number(&self, order_number: &str) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;
        let id = orders::table
            .filter(orders::order_number.eq(order_number))
            .select(orders::id)
            .first::<Uuid>(&mut conn)
            .optional()?;
        match id {
            Some(id) => load_view(&mut conn, id),
            None => Ok(None),
        }
    }

    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = orders::table
            .filter(orders::user_id.eq(user_id))
            .order(orders::created_at.desc())
            .select(OrderRow::as_select())
            .load(&mut conn)?;
        with_items(&mut conn, rows)
    }

    fn list(&self, filter: &OrderFilter) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        let offset = paging::offset(filter.page, filter.limit);
        conn.transaction::<_, DomainError, _>(|conn| {
            let mut count = orders::table.into_boxed();
            let mut page = orders::table.into_boxed();
            if let Some(status) = filter.status {
                count = count.filter(orders::status.eq(status.as_str()));
                page = page.filter(orders::status.eq(status.as_str()));
            }

            let total: i64 = count.count().get_result(conn)?;
            let rows = page
                .select(OrderRow::as_select())
                .order(orders::created_at.desc())
                .limit(filter.limit)
                .offset(offset)
                .load(conn)?;

            Ok(ListResult {
                items: with_items(conn, rows)?,
                total,
            })
        })
    }

    fn apply_update(
        &self,
        id: Uuid,
        update: &OrderUpdate,
        outbox: Vec<OutboxMessage>,
    ) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            if let Some(status) = update.status {
                let updated = diesel::update(orders::table.find(id))
                    .set((
                        orders::status.eq(status.as_str()),
                        orders::updated_at.eq(Utc::now()),
                    ))
                    .execute(conn)?;
                if updated == 0 {
                    return Err(DomainError::NotFound("Order"));
                }
                record_history(conn, id, status, &format!("Status updated to {}", status))?;
            }

            if update.touches_delivery_details() {
                let updated = diesel::update(orders::table.find(id))
                    .set(&DeliveryDetailsChangeset {
                        delivery_agent_name: update.delivery_agent_name.clone(),
                        delivery_agent_phone: update.delivery_agent_phone.clone(),
                        tracking_number: update.tracking_number.clone(),
                        updated_at: Utc::now(),
                    })
                    .execute(conn)?;
                if updated == 0 {
                    return Err(DomainError::NotFound("Order"));
                }
            }

            outbox_repo::enqueue(conn, outbox)?;
            Ok(())
        })
    }

    fn confirm_payment(&self, id: Uuid, payment_id: &str) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let updated = diesel::update(orders::table.find(id))
                .set((
                    orders::payment_status.eq(PaymentStatus::Paid.as_str()),
                    orders::status.eq(OrderStatus::Confirmed.as_str()),
                    orders::payment_id.eq(Some(payment_id)),
                    orders::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;
            if updated == 0 {
                return Err(DomainError::NotFound("Order"));
            }
            record_history(conn, id, OrderStatus::Confirmed, "Payment received")?;
            Ok(())
        })
    }
}
