use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::money::Money;
use crate::domain::order::{
    CartLine, CheckoutInput, OrderItemView, OrderStatus, OrderView, PaymentMethod, PaymentStatus,
    ShippingAddress,
};
use crate::errors::AppError;
use crate::state::AppState;

use super::auth::{AuthUser, Authorized};

// ── Request DTOs ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartProduct {
    pub id: String,
    /// Price the storefront displayed. The order is priced from the catalog.
    #[schema(value_type = f64)]
    pub price: Money,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartItemRequest {
    pub product: CartProduct,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub full_name: String,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Vec<CartItemRequest>,
    pub payment_method: PaymentMethod,
    pub shipping_address: Option<AddressRequest>,
    pub shipping_method: Option<String>,
    #[schema(value_type = f64)]
    pub subtotal: Money,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub shipping_cost: Money,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub discount_amount: Money,
    #[schema(value_type = Option<f64>)]
    pub total_amount: Option<Money>,
    pub coupon_code: Option<String>,
}

impl CreateOrderRequest {
    fn into_checkout(self) -> Result<CheckoutInput, DomainError> {
        let (Some(address), Some(total_amount)) = (self.shipping_address, self.total_amount) else {
            return Err(DomainError::invalid("Missing required fields"));
        };
        Ok(CheckoutInput {
            items: self
                .items
                .into_iter()
                .map(|item| CartLine {
                    product_id: item.product.id,
                    quantity: item.quantity,
                    quoted_price: item.product.price,
                })
                .collect(),
            payment_method: self.payment_method,
            shipping_address: ShippingAddress {
                full_name: address.full_name,
                phone: address.phone,
                address_line1: address.address_line1,
                address_line2: address.address_line2,
                city: address.city,
                state: address.state,
                pincode: address.pincode,
            },
            shipping_method: self.shipping_method,
            subtotal: self.subtotal,
            shipping_cost: self.shipping_cost,
            discount_amount: self.discount_amount,
            total_amount,
            coupon_code: self.coupon_code.filter(|c| !c.trim().is_empty()),
        })
    }
}

// ── Response DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: Uuid,
    pub order_number: String,
    pub status: OrderStatus,
    #[schema(value_type = f64)]
    pub total_amount: Money,
    pub estimated_delivery: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: String,
    pub product_name: String,
    #[schema(value_type = f64)]
    pub price: Money,
    pub quantity: i32,
    #[schema(value_type = f64)]
    pub total: Money,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub payment_id: Option<String>,
    #[schema(value_type = f64)]
    pub subtotal: Money,
    #[schema(value_type = f64)]
    pub shipping_cost: Money,
    #[schema(value_type = f64)]
    pub tax_amount: Money,
    #[schema(value_type = f64)]
    pub discount_amount: Money,
    #[schema(value_type = f64)]
    pub total_amount: Money,
    pub coupon_code: Option<String>,
    pub shipping_address: String,
    pub shipping_method: Option<String>,
    pub estimated_delivery: DateTime<Utc>,
    pub tracking_number: Option<String>,
    pub delivery_agent_name: Option<String>,
    pub delivery_agent_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderItemView> for OrderItemResponse {
    fn from(i: OrderItemView) -> Self {
        OrderItemResponse {
            id: i.id,
            product_id: i.product_id,
            product_name: i.product_name,
            price: i.price,
            quantity: i.quantity,
            total: i.total,
        }
    }
}

impl From<OrderView> for OrderResponse {
    fn from(o: OrderView) -> Self {
        OrderResponse {
            id: o.id,
            order_number: o.order_number,
            user_id: o.user_id,
            status: o.status,
            payment_status: o.payment_status,
            payment_method: o.payment_method,
            payment_id: o.payment_id,
            subtotal: o.subtotal,
            shipping_cost: o.shipping_cost,
            tax_amount: o.tax_amount,
            discount_amount: o.discount_amount,
            total_amount: o.total_amount,
            coupon_code: o.coupon_code,
            shipping_address: o.shipping_address,
            shipping_method: o.shipping_method,
            estimated_delivery: o.estimated_delivery,
            tracking_number: o.tracking_number,
            delivery_agent_name: o.delivery_agent_name,
            delivery_agent_phone: o.delivery_agent_phone,
            created_at: o.created_at,
            updated_at: o.updated_at,
            items: o.items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/orders
///
/// Places an order for the caller. The address, order, items, stock
/// decrements, coupon redemption and the confirmation email's outbox row are
/// written in one transaction; the email is sent once that transaction has
/// committed. Cached listings are dropped so they show the new stock.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order placed", body = OrderSummary),
        (status = 400, description = "Invalid cart, address, totals, coupon or insufficient stock"),
        (status = 401, description = "Not authenticated"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    AuthUser(caller): AuthUser,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let order = web::block(move || {
        let order = state.checkout.place_order(&caller, body.into_checkout()?)?;
        state.catalog.invalidate_listings();
        state.notifications.dispatch_for(&order.id.to_string());
        Ok::<_, DomainError>(order)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "order": OrderSummary {
            id: order.id,
            order_number: order.order_number,
            status: order.status,
            total_amount: order.total_amount,
            estimated_delivery: order.estimated_delivery,
        },
        "message": "Order created successfully"
    })))
}

/// GET /api/orders
///
/// The caller's orders, newest first.
#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "Caller's orders", body = [OrderResponse]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Role may not read orders"),
    ),
    tag = "orders"
)]
pub async fn list_my_orders(
    state: web::Data<AppState>,
    Authorized(caller): Authorized,
) -> Result<HttpResponse, AppError> {
    let orders = web::block(move || state.checkout.orders_for(&caller))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let orders: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(json!({ "success": true, "orders": orders })))
}

/// GET /api/orders/{order_number}
#[utoipa::path(
    get,
    path = "/api/orders/{order_number}",
    params(
        ("order_number" = String, Path, description = "Human-facing order number"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 403, description = "Order belongs to someone else"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_my_order(
    state: web::Data<AppState>,
    Authorized(caller): Authorized,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let order_number = path.into_inner();
    let order = web::block(move || state.checkout.order_for(&caller, &order_number))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "order": OrderResponse::from(order)
    })))
}
