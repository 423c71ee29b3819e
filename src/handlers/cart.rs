use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::errors::DomainError;
use crate::domain::shopping::{CartItem, WishlistItem};
use crate::errors::AppError;
use crate::state::AppState;

use super::auth::AuthUser;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLineRequest {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRefRequest {
    #[serde(default)]
    pub product_id: String,
}

// ── Cart ─────────────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Caller's cart lines", body = [CartItem]),
        (status = 401, description = "Not authenticated"),
    ),
    tag = "cart"
)]
pub async fn get_cart(state: web::Data<AppState>, AuthUser(caller): AuthUser) -> Result<HttpResponse, AppError> {
    let items = web::block(move || state.shopping.cart(caller.id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "items": items })))
}

/// POST /api/cart and POST /api/cart/add
///
/// Adds units to a line, creating it when the product is not in the cart yet.
#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = CartLineRequest,
    responses(
        (status = 200, description = "Line added or merged", body = CartItem),
        (status = 400, description = "Missing product or quantity"),
        (status = 404, description = "Product not found"),
    ),
    tag = "cart"
)]
pub async fn add_to_cart(
    state: web::Data<AppState>,
    AuthUser(caller): AuthUser,
    body: web::Json<CartLineRequest>,
) -> Result<HttpResponse, AppError> {
    let line = body.into_inner();
    let (item, items) = web::block(move || {
        let item = state.shopping.add_to_cart(caller.id, &line.product_id, line.quantity)?;
        let items = state.shopping.cart(caller.id)?;
        Ok::<_, DomainError>((item, items))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "cartItem": item,
        "items": items,
        "message": "Product added to cart successfully"
    })))
}

/// PUT /api/cart
///
/// Sets a line's quantity; zero or less removes it.
#[utoipa::path(
    put,
    path = "/api/cart",
    request_body = CartLineRequest,
    responses(
        (status = 200, description = "Line updated or removed"),
        (status = 404, description = "Product not found"),
    ),
    tag = "cart"
)]
pub async fn update_cart(
    state: web::Data<AppState>,
    AuthUser(caller): AuthUser,
    body: web::Json<CartLineRequest>,
) -> Result<HttpResponse, AppError> {
    let line = body.into_inner();
    let (item, items) = web::block(move || {
        let item = state.shopping.update_cart(caller.id, &line.product_id, line.quantity)?;
        let items = state.shopping.cart(caller.id)?;
        Ok::<_, DomainError>((item, items))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let message = if item.is_some() {
        "Cart updated successfully"
    } else {
        "Product removed from cart"
    };
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "cartItem": item,
        "items": items,
        "message": message
    })))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    request_body = ProductRefRequest,
    responses((status = 200, description = "Line removed")),
    tag = "cart"
)]
pub async fn remove_from_cart(
    state: web::Data<AppState>,
    AuthUser(caller): AuthUser,
    body: web::Json<ProductRefRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = body.into_inner().product_id;
    let items = web::block(move || {
        state.shopping.remove_from_cart(caller.id, &product_id)?;
        state.shopping.cart(caller.id)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "items": items,
        "message": "Product removed from cart"
    })))
}

/// GET /api/cart/count
///
/// Units across every line, for the cart badge.
#[utoipa::path(
    get,
    path = "/api/cart/count",
    responses((status = 200, description = "Unit count")),
    tag = "cart"
)]
pub async fn cart_count(state: web::Data<AppState>, AuthUser(caller): AuthUser) -> Result<HttpResponse, AppError> {
    let count = web::block(move || state.shopping.cart_count(caller.id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "count": count })))
}

#[utoipa::path(
    delete,
    path = "/api/cart/clear",
    responses((status = 200, description = "Cart emptied")),
    tag = "cart"
)]
pub async fn clear_cart(state: web::Data<AppState>, AuthUser(caller): AuthUser) -> Result<HttpResponse, AppError> {
    web::block(move || state.shopping.clear_cart(caller.id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "Cart cleared successfully" })))
}

// ── Wishlist ─────────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/wishlist",
    responses((status = 200, description = "Caller's wishlist", body = [WishlistItem])),
    tag = "cart"
)]
pub async fn get_wishlist(state: web::Data<AppState>, AuthUser(caller): AuthUser) -> Result<HttpResponse, AppError> {
    let items = web::block(move || state.shopping.wishlist(caller.id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "items": items })))
}

#[utoipa::path(
    post,
    path = "/api/wishlist",
    request_body = ProductRefRequest,
    responses(
        (status = 200, description = "Product listed", body = WishlistItem),
        (status = 404, description = "Product not found"),
    ),
    tag = "cart"
)]
pub async fn add_to_wishlist(
    state: web::Data<AppState>,
    AuthUser(caller): AuthUser,
    body: web::Json<ProductRefRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = body.into_inner().product_id;
    let item = web::block(move || state.shopping.add_to_wishlist(caller.id, &product_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "wishlistItem": item,
        "message": "Product added to wishlist"
    })))
}

#[utoipa::path(
    delete,
    path = "/api/wishlist",
    request_body = ProductRefRequest,
    responses((status = 200, description = "Product unlisted")),
    tag = "cart"
)]
pub async fn remove_from_wishlist(
    state: web::Data<AppState>,
    AuthUser(caller): AuthUser,
    body: web::Json<ProductRefRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = body.into_inner().product_id;
    web::block(move || state.shopping.remove_from_wishlist(caller.id, &product_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "Product removed from wishlist" })))
}

#[utoipa::path(
    get,
    path = "/api/wishlist/count",
    responses((status = 200, description = "Listed products")),
    tag = "cart"
)]
pub async fn wishlist_count(state: web::Data<AppState>, AuthUser(caller): AuthUser) -> Result<HttpResponse, AppError> {
    let count = web::block(move || state.shopping.wishlist_count(caller.id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "count": count })))
}

#[utoipa::path(
    delete,
    path = "/api/wishlist/clear",
    responses((status = 200, description = "Wishlist emptied")),
    tag = "cart"
)]
pub async fn clear_wishlist(state: web::Data<AppState>, AuthUser(caller): AuthUser) -> Result<HttpResponse, AppError> {
    web::block(move || state.shopping.clear_wishlist(caller.id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "Wishlist cleared successfully" })))
}
