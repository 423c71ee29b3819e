use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::domain::catalog::{ArtisanInput, BannerInput, CategoryInput, NewProduct, ProductPatch, ProductQuery};
use crate::domain::paging;
use crate::domain::ports::CatalogEntity;
use crate::errors::AppError;
use crate::state::AppState;

use super::auth::Authorized;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ProductListParams {
    /// Category id or slug.
    pub category: Option<String>,
    pub featured: Option<bool>,
    #[serde(default = "default_page")]
    pub page: i64,
    /// Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

// ── Storefront ───────────────────────────────────────────────────────────────

/// GET /api/products
///
/// Active products, newest first. Served from a short-lived cache.
#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductListParams),
    responses((status = 200, description = "One page of products", body = crate::domain::catalog::ProductPage)),
    tag = "catalog"
)]
pub async fn list_products(
    state: web::Data<AppState>,
    query: web::Query<ProductListParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let (page, limit) = paging::clamp(params.page, params.limit);
    let query = ProductQuery {
        category: params.category.filter(|c| !c.is_empty()),
        featured: params.featured,
        page,
        limit,
    };

    let result = web::block(move || state.catalog.list_products(&query))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "products": result.items,
        "total": result.total,
        "page": page,
        "limit": limit
    })))
}

/// GET /api/products/{slug}
#[utoipa::path(
    get,
    path = "/api/products/{slug}",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product found", body = crate::domain::catalog::Product),
        (status = 404, description = "No active product with this slug"),
    ),
    tag = "catalog"
)]
pub async fn get_product(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();
    let product = web::block(move || state.catalog.product(&slug))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "product": product })))
}

#[utoipa::path(get, path = "/api/categories", responses((status = 200, description = "Active categories")), tag = "catalog")]
pub async fn list_categories(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let categories = web::block(move || state.catalog.categories())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "categories": categories })))
}

#[utoipa::path(get, path = "/api/artisans", responses((status = 200, description = "Active artisans")), tag = "catalog")]
pub async fn list_artisans(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let artisans = web::block(move || state.catalog.artisans())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "artisans": artisans })))
}

#[utoipa::path(get, path = "/api/banners", responses((status = 200, description = "Active banners")), tag = "catalog")]
pub async fn list_banners(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let banners = web::block(move || state.catalog.banners())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "banners": banners })))
}

// ── Back office ──────────────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body = NewProduct,
    responses(
        (status = 201, description = "Product created", body = crate::domain::catalog::Product),
        (status = 400, description = "Invalid product or duplicate slug"),
        (status = 403, description = "Missing products:create or admin:write"),
    ),
    tag = "admin"
)]
pub async fn create_product(
    state: web::Data<AppState>,
    _caller: Authorized,
    body: web::Json<NewProduct>,
) -> Result<HttpResponse, AppError> {
    let input = body.into_inner();
    let product = web::block(move || state.catalog.create_product(input))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Created().json(json!({ "success": true, "product": product })))
}

#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    request_body = ProductPatch,
    responses(
        (status = 200, description = "Product updated", body = crate::domain::catalog::Product),
        (status = 404, description = "Product not found"),
    ),
    tag = "admin"
)]
pub async fn update_product(
    state: web::Data<AppState>,
    _caller: Authorized,
    path: web::Path<String>,
    body: web::Json<ProductPatch>,
) -> Result<HttpResponse, AppError> {
    let (id, patch) = (path.into_inner(), body.into_inner());
    let product = web::block(move || state.catalog.update_product(&id, patch))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "product": product })))
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CategoryInput,
    responses((status = 201, description = "Category created", body = crate::domain::catalog::Category)),
    tag = "admin"
)]
pub async fn create_category(
    state: web::Data<AppState>,
    _caller: Authorized,
    body: web::Json<CategoryInput>,
) -> Result<HttpResponse, AppError> {
    let input = body.into_inner();
    let category = web::block(move || state.catalog.create_category(input))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Created().json(json!({ "success": true, "category": category })))
}

#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}",
    params(("id" = String, Path, description = "Category id")),
    request_body = CategoryInput,
    responses((status = 200, description = "Category replaced", body = crate::domain::catalog::Category)),
    tag = "admin"
)]
pub async fn update_category(
    state: web::Data<AppState>,
    _caller: Authorized,
    path: web::Path<String>,
    body: web::Json<CategoryInput>,
) -> Result<HttpResponse, AppError> {
    let (id, input) = (path.into_inner(), body.into_inner());
    let category = web::block(move || state.catalog.update_category(&id, input))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "category": category })))
}

#[utoipa::path(
    post,
    path = "/api/admin/artisans",
    request_body = ArtisanInput,
    responses((status = 201, description = "Artisan created", body = crate::domain::catalog::Artisan)),
    tag = "admin"
)]
pub async fn create_artisan(
    state: web::Data<AppState>,
    _caller: Authorized,
    body: web::Json<ArtisanInput>,
) -> Result<HttpResponse, AppError> {
    let input = body.into_inner();
    let artisan = web::block(move || state.catalog.create_artisan(input))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Created().json(json!({ "success": true, "artisan": artisan })))
}

#[utoipa::path(
    put,
    path = "/api/admin/artisans/{id}",
    params(("id" = String, Path, description = "Artisan id")),
    request_body = ArtisanInput,
    responses((status = 200, description = "Artisan replaced", body = crate::domain::catalog::Artisan)),
    tag = "admin"
)]
pub async fn update_artisan(
    state: web::Data<AppState>,
    _caller: Authorized,
    path: web::Path<String>,
    body: web::Json<ArtisanInput>,
) -> Result<HttpResponse, AppError> {
    let (id, input) = (path.into_inner(), body.into_inner());
    let artisan = web::block(move || state.catalog.update_artisan(&id, input))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "artisan": artisan })))
}

#[utoipa::path(
    post,
    path = "/api/admin/banners",
    request_body = BannerInput,
    responses((status = 201, description = "Banner created", body = crate::domain::catalog::Banner)),
    tag = "admin"
)]
pub async fn create_banner(
    state: web::Data<AppState>,
    _caller: Authorized,
    body: web::Json<BannerInput>,
) -> Result<HttpResponse, AppError> {
    let input = body.into_inner();
    let banner = web::block(move || state.catalog.create_banner(input))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Created().json(json!({ "success": true, "banner": banner })))
}

#[utoipa::path(
    put,
    path = "/api/admin/banners/{id}",
    params(("id" = String, Path, description = "Banner id")),
    request_body = BannerInput,
    responses((status = 200, description = "Banner replaced", body = crate::domain::catalog::Banner)),
    tag = "admin"
)]
pub async fn update_banner(
    state: web::Data<AppState>,
    _caller: Authorized,
    path: web::Path<String>,
    body: web::Json<BannerInput>,
) -> Result<HttpResponse, AppError> {
    let (id, input) = (path.into_inner(), body.into_inner());
    let banner = web::block(move || state.catalog.update_banner(&id, input))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "banner": banner })))
}

async fn deactivate(
    state: web::Data<AppState>,
    entity: CatalogEntity,
    id: String,
) -> Result<HttpResponse, AppError> {
    web::block(move || state.catalog.remove(entity, &id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "Deactivated successfully" })))
}

/// DELETE /api/admin/products/{id}
///
/// Soft delete; the product disappears from the storefront.
#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses((status = 200, description = "Deactivated"), (status = 404, description = "Not found")),
    tag = "admin"
)]
pub async fn delete_product(
    state: web::Data<AppState>,
    _caller: Authorized,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    deactivate(state, CatalogEntity::Product, path.into_inner()).await
}

#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(("id" = String, Path, description = "Category id")),
    responses((status = 200, description = "Deactivated"), (status = 404, description = "Not found")),
    tag = "admin"
)]
pub async fn delete_category(
    state: web::Data<AppState>,
    _caller: Authorized,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    deactivate(state, CatalogEntity::Category, path.into_inner()).await
}

#[utoipa::path(
    delete,
    path = "/api/admin/artisans/{id}",
    params(("id" = String, Path, description = "Artisan id")),
    responses((status = 200, description = "Deactivated"), (status = 404, description = "Not found")),
    tag = "admin"
)]
pub async fn delete_artisan(
    state: web::Data<AppState>,
    _caller: Authorized,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    deactivate(state, CatalogEntity::Artisan, path.into_inner()).await
}

#[utoipa::path(
    delete,
    path = "/api/admin/banners/{id}",
    params(("id" = String, Path, description = "Banner id")),
    responses((status = 200, description = "Deactivated"), (status = 404, description = "Not found")),
    tag = "admin"
)]
pub async fn delete_banner(
    state: web::Data<AppState>,
    _caller: Authorized,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    deactivate(state, CatalogEntity::Banner, path.into_inner()).await
}
