use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{OrderFilter, OrderStatus, OrderUpdate};
use crate::domain::paging;
use crate::errors::AppError;
use crate::state::AppState;

use super::auth::Authorized;
use super::orders::OrderResponse;

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1, at most 10000.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Only orders in this status, e.g. `SHIPPED`.
    pub status: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersResponse {
    pub success: bool,
    pub orders: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

fn parse_status(raw: Option<&str>) -> Result<Option<OrderStatus>, DomainError> {
    raw.filter(|s| !s.is_empty())
        .map(|s| s.parse::<OrderStatus>())
        .transpose()
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    /// One of PENDING, CONFIRMED, PROCESSING, SHIPPED, OUT_FOR_DELIVERY,
    /// DELIVERED, CANCELLED, RETURNED, REFUNDED.
    pub status: Option<String>,
    pub delivery_agent_name: Option<String>,
    pub delivery_agent_phone: Option<String>,
    pub tracking_number: Option<String>,
}

impl UpdateOrderRequest {
    fn into_update(self) -> Result<OrderUpdate, DomainError> {
        Ok(OrderUpdate {
            status: parse_status(self.status.as_deref())?,
            delivery_agent_name: self.delivery_agent_name,
            delivery_agent_phone: self.delivery_agent_phone,
            tracking_number: self.tracking_number,
        })
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/admin/orders
///
/// Returns a paginated list of orders, newest first.
#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(ListOrdersParams),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 400, description = "Unknown status filter"),
        (status = 403, description = "Missing orders:read or admin:read"),
    ),
    tag = "admin"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    _caller: Authorized,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let (page, limit) = paging::clamp(params.page, params.limit);
    let filter = OrderFilter {
        status: parse_status(params.status.as_deref())?,
        page,
        limit,
    };

    let result = web::block(move || state.order_status.list(&filter))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        success: true,
        total_pages: (result.total + limit - 1) / limit,
        orders: result.items.into_iter().map(OrderResponse::from).collect(),
        total: result.total,
        page,
        limit,
    }))
}

/// GET /api/admin/orders/{id}
#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
    ),
    tag = "admin"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    _caller: Authorized,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let order = web::block(move || state.order_status.get(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "order": OrderResponse::from(order)
    })))
}

/// PUT /api/admin/orders/{id}
///
/// Sets any status and/or delivery details. Moving an order to SHIPPED,
/// OUT_FOR_DELIVERY or DELIVERED notifies its owner by push and email.
/// Notification failures never fail the update.
#[utoipa::path(
    put,
    path = "/api/admin/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Invalid status or empty update"),
        (status = 403, description = "Missing orders:update or admin:write"),
        (status = 404, description = "Order not found"),
    ),
    tag = "admin"
)]
pub async fn update_order(
    state: web::Data<AppState>,
    Authorized(caller): Authorized,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let update = body.into_inner().into_update()?;

    let order = web::block(move || {
        let order = state.order_status.update(order_id, update)?;
        let report = state.notifications.dispatch_for(&order_id.to_string());
        if report.failed > 0 {
            log::warn!(
                "Order {}: {} notification(s) left for retry",
                order.order_number,
                report.failed
            );
        }
        Ok::<_, DomainError>(order)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    log::info!("Order {} updated by {}", order.order_number, caller.id);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "order": OrderResponse::from(order),
        "message": "Order updated successfully"
    })))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    use crate::configure_routes;
    use crate::domain::order::OrderStatus;
    use crate::domain::user::Role;
    use crate::test_support::fixture::Harness;

    #[actix_web::test]
    async fn shipping_an_order_notifies_the_owner_once_per_channel() {
        let h = Harness::new();
        let admin = h.store.add_user(Role::Admin);
        let customer = h.store.add_user(Role::Customer);
        let order = h.store.seed_order(&customer);
        let token = h.token_for(&admin);
        let (store, email, push) = (h.store.clone(), h.email.clone(), h.push.clone());
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(h.state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/admin/orders/{}", order.id))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({"status": "SHIPPED", "trackingNumber": "TRK123"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["order"]["status"], "SHIPPED");
        assert_eq!(body["order"]["trackingNumber"], "TRK123");

        let emails = email.sent();
        assert_eq!(emails.len(), 1);
        assert!(emails[0].text.contains(&order.order_number));
        let pushes = push.sent();
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].0, customer.id.to_string());
        assert_eq!(store.find_order(order.id).status, OrderStatus::Shipped);
    }

    #[actix_web::test]
    async fn processing_sends_nothing_and_notifier_failures_do_not_fail_the_update() {
        let h = Harness::new();
        let admin = h.store.add_user(Role::Admin);
        let customer = h.store.add_user(Role::Customer);
        let order = h.store.seed_order(&customer);
        let token = h.token_for(&admin);
        let (email, push) = (h.email.clone(), h.push.clone());
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(h.state))
                .configure(configure_routes),
        )
        .await;
        let uri = format!("/api/admin/orders/{}", order.id);

        let req = test::TestRequest::put()
            .uri(&uri)
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({"status": "PROCESSING"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        assert_eq!(email.attempts() + push.attempts(), 0);

        email.fail(true);
        push.fail(true);
        let req = test::TestRequest::put()
            .uri(&uri)
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({"status": "DELIVERED"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        assert_eq!(email.attempts(), 1);
        assert_eq!(push.attempts(), 1);
    }

    #[actix_web::test]
    async fn non_admins_cannot_change_orders() {
        let h = Harness::new();
        let customer = h.store.add_user(Role::Customer);
        let support = h.store.add_user(Role::Support);
        let order = h.store.seed_order(&customer);
        let (customer_token, support_token) = (h.token_for(&customer), h.token_for(&support));
        let store = h.store.clone();
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(h.state))
                .configure(configure_routes),
        )
        .await;
        let uri = format!("/api/admin/orders/{}", order.id);

        for token in [customer_token, support_token] {
            let req = test::TestRequest::put()
                .uri(&uri)
                .insert_header(("Authorization", format!("Bearer {}", token)))
                .set_json(json!({"status": "DELIVERED"}))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
        }

        let req = test::TestRequest::put()
            .uri(&uri)
            .set_json(json!({"status": "DELIVERED"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(store.find_order(order.id).status, OrderStatus::Pending);
    }

    #[actix_web::test]
    async fn unknown_status_and_missing_order_are_rejected() {
        let h = Harness::new();
        let admin = h.store.add_user(Role::Admin);
        let customer = h.store.add_user(Role::Customer);
        let order = h.store.seed_order(&customer);
        let token = h.token_for(&admin);
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(h.state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/admin/orders/{}", order.id))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({"status": "LOST"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid status");

        let req = test::TestRequest::get()
            .uri(&format!("/api/admin/orders/{}", uuid::Uuid::new_v4()))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn listing_filters_by_status_and_clamps_the_page_size() {
        let h = Harness::new();
        let manager = h.store.add_user(Role::Manager);
        let customer = h.store.add_user(Role::Customer);
        h.store.seed_order(&customer);
        h.store.seed_order(&customer);
        let token = h.token_for(&manager);
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(h.state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/admin/orders?limit=500&status=PENDING")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["limit"], 100);
        assert_eq!(body["totalPages"], 1);

        let req = test::TestRequest::get()
            .uri("/api/admin/orders?status=DELIVERED")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["total"], 0);
    }

    #[actix_web::test]
    async fn huge_page_numbers_are_clamped_instead_of_overflowing() {
        let h = Harness::new();
        let admin = h.store.add_user(Role::Admin);
        let customer = h.store.add_user(Role::Customer);
        h.store.seed_order(&customer);
        let token = h.token_for(&admin);
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(h.state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/admin/orders?page={}&limit=100", i64::MAX))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["page"], 10_000);
        assert_eq!(body["total"], 1);
        assert_eq!(body["orders"].as_array().unwrap().len(), 0);
    }
}
