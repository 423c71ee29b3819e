use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::catalog::{Artisan, Banner, Category, Localized, Product};
use crate::domain::coupon::Coupon;
use crate::domain::errors::DomainError;
use crate::domain::inbox::InboxNotification;
use crate::domain::money::Money;
use crate::domain::notification::PendingNotification;
use crate::domain::order::{OrderItemView, OrderView};
use crate::domain::shopping::{CartItem, WishlistItem};
use crate::domain::user::{Language, UserAccount};
use crate::schema::{
    artisans, banners, cart_items, categories, coupons, notification_outbox, notifications,
    order_items, order_status_history, orders, products, security_events, user_addresses,
    user_coupons, users, wishlist_items,
};

// ── Accounts ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub preferred_language: String,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub mfa_enabled: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_account(self) -> Result<UserAccount, DomainError> {
        Ok(UserAccount {
            id: self.id,
            email: self.email,
            name: self.name,
            phone: self.phone,
            password_hash: self.password_hash,
            role: self.role.parse()?,
            preferred_language: Language::from_code(&self.preferred_language),
            failed_login_attempts: self.failed_login_attempts,
            locked_until: self.locked_until,
            mfa_enabled: self.mfa_enabled,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub preferred_language: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = security_events)]
pub struct NewSecurityEventRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub event_type: String,
    pub details: Value,
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Insertable)]
#[diesel(table_name = user_addresses)]
pub struct NewAddressRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub subtotal: BigDecimal,
    pub shipping_cost: BigDecimal,
    pub tax_amount: BigDecimal,
    pub discount_amount: BigDecimal,
    pub total_amount: BigDecimal,
    pub status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub payment_id: Option<String>,
    pub coupon_code: Option<String>,
    pub shipping_address: String,
    pub shipping_method: Option<String>,
    pub estimated_delivery: DateTime<Utc>,
    pub tracking_number: Option<String>,
    pub delivery_agent_name: Option<String>,
    pub delivery_agent_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRow {
    pub fn into_view(self, items: Vec<OrderItemRow>) -> Result<OrderView, DomainError> {
        let id = self.id;
        let stored = |e: DomainError| DomainError::Internal(format!("order {}: {}", id, e));
        Ok(OrderView {
            id,
            status: self.status.parse().map_err(stored)?,
            payment_status: self.payment_status.parse().map_err(stored)?,
            payment_method: self.payment_method.parse().map_err(stored)?,
            order_number: self.order_number,
            user_id: self.user_id,
            subtotal: Money::new(self.subtotal),
            shipping_cost: Money::new(self.shipping_cost),
            tax_amount: Money::new(self.tax_amount),
            discount_amount: Money::new(self.discount_amount),
            total_amount: Money::new(self.total_amount),
            payment_id: self.payment_id,
            coupon_code: self.coupon_code,
            shipping_address: self.shipping_address,
            shipping_method: self.shipping_method,
            estimated_delivery: self.estimated_delivery,
            tracking_number: self.tracking_number,
            delivery_agent_name: self.delivery_agent_name,
            delivery_agent_phone: self.delivery_agent_phone,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items: items.into_iter().map(OrderItemRow::into_view).collect(),
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub address_id: Uuid,
    pub subtotal: BigDecimal,
    pub shipping_cost: BigDecimal,
    pub tax_amount: BigDecimal,
    pub discount_amount: BigDecimal,
    pub total_amount: BigDecimal,
    pub status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub coupon_code: Option<String>,
    pub shipping_address: String,
    pub shipping_method: Option<String>,
    pub estimated_delivery: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: String,
    pub product_name: String,
    pub price: BigDecimal,
    pub quantity: i32,
    pub total: BigDecimal,
}

impl OrderItemRow {
    fn into_view(self) -> OrderItemView {
        OrderItemView {
            id: self.id,
            product_id: self.product_id,
            product_name: self.product_name,
            price: Money::new(self.price),
            quantity: self.quantity,
            total: Money::new(self.total),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: String,
    pub product_name: String,
    pub price: BigDecimal,
    pub quantity: i32,
    pub total: BigDecimal,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_status_history)]
pub struct NewStatusHistoryRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub status: String,
    pub note: Option<String>,
}

/// Delivery details written by the admin edit; `None` leaves a column as is.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = orders)]
pub struct DeliveryDetailsChangeset {
    pub delivery_agent_name: Option<String>,
    pub delivery_agent_phone: Option<String>,
    pub tracking_number: Option<String>,
    pub updated_at: DateTime<Utc>,
}

// ── Outbox ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = notification_outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OutboxRow {
    pub id: Uuid,
    pub aggregate_id: String,
    pub channel: String,
    pub kind: String,
    pub recipient: String,
    pub payload: Value,
    pub attempts: i32,
}

impl OutboxRow {
    pub fn into_pending(self) -> Result<PendingNotification, DomainError> {
        Ok(PendingNotification {
            id: self.id,
            aggregate_id: self.aggregate_id,
            channel: self.channel.parse()?,
            kind: self.kind.parse()?,
            recipient: self.recipient,
            payload: self.payload,
            attempts: self.attempts,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = notification_outbox)]
pub struct NewOutboxRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub channel: String,
    pub kind: String,
    pub recipient: String,
    pub payload: Value,
}

// ── Catalog ──────────────────────────────────────────────────────────────────

fn optional_localized(en: Option<String>, hi: Option<String>) -> Option<Localized> {
    en.map(|en| Localized {
        hi: hi.unwrap_or_else(|| en.clone()),
        en,
    })
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: String,
    pub slug: String,
    pub title_en: String,
    pub title_hi: String,
    pub description_en: Option<String>,
    pub description_hi: Option<String>,
    pub price: BigDecimal,
    pub stock: i32,
    pub category_id: Option<String>,
    pub artisan_id: Option<String>,
    pub featured: bool,
    pub best_seller: bool,
    pub new_arrival: bool,
    pub trending: bool,
    pub rating: BigDecimal,
    pub review_count: i32,
    pub view_count: i32,
    pub sales_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            slug: row.slug,
            title: Localized {
                en: row.title_en,
                hi: row.title_hi,
            },
            description: optional_localized(row.description_en, row.description_hi),
            price: Money::new(row.price),
            stock: row.stock,
            category_id: row.category_id,
            artisan_id: row.artisan_id,
            featured: row.featured,
            best_seller: row.best_seller,
            new_arrival: row.new_arrival,
            trending: row.trending,
            rating: row.rating.to_f64().unwrap_or_default(),
            review_count: row.review_count,
            view_count: row.view_count,
            sales_count: row.sales_count,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: String,
    pub slug: String,
    pub title_en: String,
    pub title_hi: String,
    pub description_en: Option<String>,
    pub description_hi: Option<String>,
    pub price: BigDecimal,
    pub stock: i32,
    pub category_id: Option<String>,
    pub artisan_id: Option<String>,
    pub featured: bool,
    pub best_seller: bool,
    pub new_arrival: bool,
    pub trending: bool,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductChangeset {
    pub slug: Option<String>,
    pub title_en: Option<String>,
    pub title_hi: Option<String>,
    pub description_en: Option<Option<String>>,
    pub description_hi: Option<Option<String>>,
    pub price: Option<BigDecimal>,
    pub stock: Option<i32>,
    pub category_id: Option<Option<String>>,
    pub artisan_id: Option<Option<String>>,
    pub featured: Option<bool>,
    pub best_seller: Option<bool>,
    pub new_arrival: Option<bool>,
    pub trending: Option<bool>,
    pub is_active: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryRow {
    pub id: String,
    pub slug: String,
    pub name_en: String,
    pub name_hi: String,
    pub description_en: Option<String>,
    pub description_hi: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            slug: row.slug,
            name: Localized {
                en: row.name_en,
                hi: row.name_hi,
            },
            description: optional_localized(row.description_en, row.description_hi),
            image_url: row.image_url,
            sort_order: row.sort_order,
            is_active: row.is_active,
        }
    }
}

/// Full replacement of a category's editable columns.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = categories)]
#[diesel(treat_none_as_null = true)]
pub struct CategoryRecord {
    pub slug: String,
    pub name_en: String,
    pub name_hi: String,
    pub description_en: Option<String>,
    pub description_hi: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = artisans)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ArtisanRow {
    pub id: String,
    pub slug: String,
    pub name_en: String,
    pub name_hi: String,
    pub bio_en: Option<String>,
    pub bio_hi: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

impl From<ArtisanRow> for Artisan {
    fn from(row: ArtisanRow) -> Self {
        Artisan {
            id: row.id,
            slug: row.slug,
            name: Localized {
                en: row.name_en,
                hi: row.name_hi,
            },
            bio: optional_localized(row.bio_en, row.bio_hi),
            location: row.location,
            image_url: row.image_url,
            sort_order: row.sort_order,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = artisans)]
#[diesel(treat_none_as_null = true)]
pub struct ArtisanRecord {
    pub slug: String,
    pub name_en: String,
    pub name_hi: String,
    pub bio_en: Option<String>,
    pub bio_hi: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = banners)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BannerRow {
    pub id: String,
    pub title_en: String,
    pub title_hi: String,
    pub subtitle_en: Option<String>,
    pub subtitle_hi: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

impl From<BannerRow> for Banner {
    fn from(row: BannerRow) -> Self {
        Banner {
            id: row.id,
            title: Localized {
                en: row.title_en,
                hi: row.title_hi,
            },
            subtitle: optional_localized(row.subtitle_en, row.subtitle_hi),
            image_url: row.image_url,
            link_url: row.link_url,
            sort_order: row.sort_order,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = banners)]
#[diesel(treat_none_as_null = true)]
pub struct BannerRecord {
    pub title_en: String,
    pub title_hi: String,
    pub subtitle_en: Option<String>,
    pub subtitle_hi: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

// ── Cart, wishlist, coupons ──────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = cart_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartItemRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: String,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        CartItem {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            quantity: row.quantity,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = wishlist_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WishlistItemRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<WishlistItemRow> for WishlistItem {
    fn from(row: WishlistItemRow) -> Self {
        WishlistItem {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = coupons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CouponRow {
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub kind: String,
    pub value: BigDecimal,
    pub min_order_value: Option<BigDecimal>,
    pub max_discount: Option<BigDecimal>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub user_limit: i32,
    pub is_active: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl CouponRow {
    pub fn into_coupon(self) -> Result<Coupon, DomainError> {
        Ok(Coupon {
            id: self.id,
            kind: self
                .kind
                .parse()
                .map_err(|e| DomainError::Internal(format!("coupon {}: {}", self.code, e)))?,
            code: self.code,
            title: self.title,
            description: self.description,
            value: Money::new(self.value),
            min_order_value: self.min_order_value.map(Money::new),
            max_discount: self.max_discount.map(Money::new),
            usage_limit: self.usage_limit,
            used_count: self.used_count,
            user_limit: self.user_limit,
            is_active: self.is_active,
            start_date: self.start_date,
            end_date: self.end_date,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_coupons)]
pub struct NewUserCouponRow {
    pub id: Uuid,
    pub coupon_id: Uuid,
    pub user_id: Uuid,
    pub order_id: Uuid,
}

// ── In-app notifications ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InboxRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub read: bool,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<InboxRow> for InboxNotification {
    fn from(row: InboxRow) -> Self {
        InboxNotification {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            message: row.message,
            kind: row.kind,
            read: row.read,
            reference_id: row.reference_id,
            reference_type: row.reference_type,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewInboxRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
}
