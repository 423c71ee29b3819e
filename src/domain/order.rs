use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::coupon::Redemption;
use super::errors::DomainError;
use super::money::Money;

/// Orders are promised for delivery a fixed number of days after checkout.
pub const DELIVERY_WINDOW_DAYS: i64 = 7;

const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

// ── Lifecycle ────────────────────────────────────────────────────────────────

/// Order lifecycle states. Any state may be set by an admin; reachability
/// from the current state is not checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    OutForDelivery,
    Delivered,
    Cancelled,
    Returned,
    Refunded,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 9] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Returned,
        OrderStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Returned => "RETURNED",
            OrderStatus::Refunded => "REFUNDED",
        }
    }

    /// Only the shipping leg of the lifecycle is announced to the customer.
    pub fn notifies_customer(&self) -> bool {
        matches!(
            self,
            OrderStatus::Shipped | OrderStatus::OutForDelivery | OrderStatus::Delivered
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::invalid("Invalid status"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "PAID" => Ok(PaymentStatus::Paid),
            "FAILED" => Ok(PaymentStatus::Failed),
            "REFUNDED" => Ok(PaymentStatus::Refunded),
            other => Err(DomainError::invalid(format!("Unknown payment status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cod,
    Razorpay,
    Stripe,
    Online,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Razorpay => "razorpay",
            PaymentMethod::Stripe => "stripe",
            PaymentMethod::Online => "online",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cod" => Ok(PaymentMethod::Cod),
            "razorpay" => Ok(PaymentMethod::Razorpay),
            "stripe" => Ok(PaymentMethod::Stripe),
            "online" => Ok(PaymentMethod::Online),
            other => Err(DomainError::invalid(format!("Unsupported payment method '{}'", other))),
        }
    }
}

// ── Identifiers ──────────────────────────────────────────────────────────────

fn base36_suffix<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// Human-facing order number: `ORD-<epoch ms>-<9 base36 chars>`.
pub fn generate_order_number<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> String {
    format!("ORD-{}-{}", now.timestamp_millis(), base36_suffix(rng, 9))
}

/// Short reference used by the payment endpoint when no order id is supplied.
pub fn generate_payment_reference<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> String {
    format!("ORD-{}-{}", now.timestamp_millis(), base36_suffix(rng, 5))
}

pub fn estimated_delivery(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(DELIVERY_WINDOW_DAYS)
}

// ── Checkout input ───────────────────────────────────────────────────────────

fn pincode_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[1-9][0-9]{5}$").expect("pincode pattern is valid"))
}

/// Six-digit Indian postal code, no leading zero.
pub fn is_valid_pincode(pincode: &str) -> bool {
    pincode_pattern().is_match(pincode)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl ShippingAddress {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !is_valid_pincode(&self.pincode) {
            return Err(DomainError::invalid(
                "Invalid pincode. Please enter a valid 6-digit Indian pincode.",
            ));
        }
        Ok(())
    }

    /// Free-text form stored on the order row.
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.full_name.as_str(), self.address_line1.as_str()];
        if let Some(line2) = self.address_line2.as_deref().filter(|l| !l.trim().is_empty()) {
            parts.push(line2);
        }
        parts.push(self.city.as_str());
        parts.push(self.state.as_str());
        format!("{} - {}, Phone: {}", parts.join(", "), self.pincode, self.phone)
    }
}

#[derive(Debug, Clone)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i32,
    /// Price the storefront displayed; the persisted price is the live one.
    pub quoted_price: Money,
}

#[derive(Debug, Clone)]
pub struct CheckoutInput {
    pub items: Vec<CartLine>,
    pub payment_method: PaymentMethod,
    pub shipping_address: ShippingAddress,
    pub shipping_method: Option<String>,
    pub subtotal: Money,
    pub shipping_cost: Money,
    /// Discount the storefront applied; must match what the coupon grants.
    pub discount_amount: Money,
    pub total_amount: Money,
    pub coupon_code: Option<String>,
}

impl CheckoutInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.items.is_empty() {
            return Err(DomainError::invalid("Missing required fields"));
        }
        if let Some(line) = self.items.iter().find(|l| l.quantity <= 0) {
            return Err(DomainError::invalid(format!(
                "Quantity for product '{}' must be at least 1",
                line.product_id
            )));
        }
        self.shipping_address.validate()?;
        if self.shipping_cost.is_negative()
            || self.subtotal.is_negative()
            || self.discount_amount.is_negative()
        {
            return Err(DomainError::invalid("Amounts cannot be negative"));
        }
        if self.discount_amount.is_positive() && self.coupon_code.is_none() {
            return Err(DomainError::invalid("A discount needs a coupon code"));
        }
        let expected =
            self.subtotal.clone() + self.shipping_cost.clone() - self.discount_amount.clone();
        if expected != self.total_amount {
            return Err(DomainError::invalid(format!(
                "Total amount {} does not match subtotal plus shipping minus discount ({})",
                self.total_amount, expected
            )));
        }
        Ok(())
    }
}

/// A cart line resolved against the live catalog row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: String,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: i32,
}

impl PricedLine {
    pub fn total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// The submitted subtotal must match what the catalog charges today.
pub fn verify_subtotal(lines: &[PricedLine], submitted: &Money) -> Result<(), DomainError> {
    let live: Money = lines.iter().map(PricedLine::total).sum();
    if &live != submitted {
        return Err(DomainError::invalid(format!(
            "Subtotal {} does not match current prices ({})",
            submitted, live
        )));
    }
    Ok(())
}

/// Everything the repository needs to persist a checkout in one transaction.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub address: ShippingAddress,
    pub lines: Vec<CartLine>,
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub tax_amount: Money,
    pub discount_amount: Money,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub shipping_method: Option<String>,
    pub coupon: Option<Redemption>,
    pub estimated_delivery: DateTime<Utc>,
}

// ── Read model ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub id: Uuid,
    pub product_id: String,
    pub product_name: String,
    pub price: Money,
    pub quantity: i32,
    pub total: Money,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub tax_amount: Money,
    pub discount_amount: Money,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
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
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<OrderView>,
    pub total: i64,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub page: i64,
    pub limit: i64,
}

/// Admin edit of an order. Status and delivery details are written through
/// separate statements but inside one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub delivery_agent_name: Option<String>,
    pub delivery_agent_phone: Option<String>,
    pub tracking_number: Option<String>,
}

impl OrderUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && !self.touches_delivery_details()
    }

    pub fn touches_delivery_details(&self) -> bool {
        self.delivery_agent_name.is_some()
            || self.delivery_agent_phone.is_some()
            || self.tracking_number.is_some()
    }

    /// The order as it will read once this update is committed.
    pub fn project(&self, order: &OrderView) -> OrderView {
        let mut next = order.clone();
        if let Some(status) = self.status {
            next.status = status;
        }
        if let Some(name) = &self.delivery_agent_name {
            next.delivery_agent_name = Some(name.clone());
        }
        if let Some(phone) = &self.delivery_agent_phone {
            next.delivery_agent_phone = Some(phone.clone());
        }
        if let Some(tracking) = &self.tracking_number {
            next.tracking_number = Some(tracking.clone());
        }
        next
    }
}
