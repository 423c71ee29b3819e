use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::coupon::{Coupon, NewCoupon};
use crate::domain::money::Money;
use crate::errors::AppError;
use crate::state::AppState;

use super::auth::{AuthUser, Authorized};

#[derive(Debug, Deserialize, IntoParams)]
pub struct CouponQuery {
    /// Validate this one code instead of listing live coupons.
    pub code: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCouponRequest {
    #[serde(default)]
    pub code: String,
    #[schema(value_type = f64)]
    pub order_total: Money,
}

/// GET /api/coupons
///
/// With `?code=` checks that one coupon can be redeemed now; without it
/// lists every live coupon that still has uses left.
#[utoipa::path(
    get,
    path = "/api/coupons",
    params(CouponQuery),
    responses(
        (status = 200, description = "Coupon or live coupons", body = [Coupon]),
        (status = 400, description = "Invalid, expired or used-up code"),
    ),
    tag = "coupons"
)]
pub async fn list_coupons(
    state: web::Data<AppState>,
    query: web::Query<CouponQuery>,
) -> Result<HttpResponse, AppError> {
    match query.into_inner().code.filter(|c| !c.trim().is_empty()) {
        Some(code) => {
            let coupon = web::block(move || state.coupons.lookup(&code))
                .await
                .map_err(|e| AppError::Internal(e.to_string()))??;
            Ok(HttpResponse::Ok().json(json!({ "success": true, "coupon": coupon })))
        }
        None => {
            let coupons = web::block(move || state.coupons.available())
                .await
                .map_err(|e| AppError::Internal(e.to_string()))??;
            Ok(HttpResponse::Ok().json(json!({ "success": true, "coupons": coupons })))
        }
    }
}

/// POST /api/coupons/apply
///
/// Quotes the discount for the caller's cart. The coupon is only redeemed
/// when an order carrying it is placed.
#[utoipa::path(
    post,
    path = "/api/coupons/apply",
    request_body = ApplyCouponRequest,
    responses(
        (status = 200, description = "Discount quoted"),
        (status = 400, description = "Coupon not applicable"),
        (status = 401, description = "Not authenticated"),
    ),
    tag = "coupons"
)]
pub async fn apply_coupon(
    state: web::Data<AppState>,
    AuthUser(caller): AuthUser,
    body: web::Json<ApplyCouponRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let (coupon, discount) =
        web::block(move || state.coupons.apply(&caller, &request.code, &request.order_total))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "coupon": coupon,
        "discount": discount,
        "message": "Coupon applied successfully"
    })))
}

#[utoipa::path(
    post,
    path = "/api/admin/coupons",
    request_body = NewCoupon,
    responses(
        (status = 201, description = "Coupon created", body = Coupon),
        (status = 400, description = "Invalid coupon or duplicate code"),
        (status = 403, description = "Missing content:write or admin:write"),
    ),
    tag = "admin"
)]
pub async fn create_coupon(
    state: web::Data<AppState>,
    _caller: Authorized,
    body: web::Json<NewCoupon>,
) -> Result<HttpResponse, AppError> {
    let input = body.into_inner();
    let coupon = web::block(move || state.coupons.create(input))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Created().json(json!({ "success": true, "coupon": coupon })))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    use crate::configure_routes;
    use crate::domain::coupon::CouponKind;
    use crate::domain::user::Role;
    use crate::test_support::fixture::Harness;

    #[actix_web::test]
    async fn codes_are_validated_publicly_and_applied_by_customers() {
        let h = Harness::new();
        let customer = h.store.add_user(Role::Customer);
        h.store.add_coupon("DIWALI10", CouponKind::Percentage, 10);
        let token = h.token_for(&customer);
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(h.state))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/coupons?code=diwali10").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["coupon"]["type"], "PERCENTAGE");

        let req = test::TestRequest::get().uri("/api/coupons?code=NOPE").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid or expired coupon code");

        let req = test::TestRequest::get().uri("/api/coupons").to_request();
        let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["coupons"].as_array().unwrap().len(), 1);

        let req = test::TestRequest::post()
            .uri("/api/coupons/apply")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({"code": "DIWALI10", "orderTotal": 1299}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["discount"], 129.9);
        assert_eq!(body["message"], "Coupon applied successfully");
    }

    #[actix_web::test]
    async fn only_content_admins_create_coupons() {
        let h = Harness::new();
        let admin = h.store.add_user(Role::Admin);
        let customer = h.store.add_user(Role::Customer);
        let (admin_token, customer_token) = (h.token_for(&admin), h.token_for(&customer));
        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(h.state))
                .configure(configure_routes),
        )
        .await;
        let coupon = json!({
            "code": "monsoon25",
            "title": "Monsoon sale",
            "type": "FIXED",
            "value": 250,
            "isActive": true,
            "startDate": "2026-02-01T00:00:00Z",
            "endDate": "2026-04-01T00:00:00Z"
        });

        let req = test::TestRequest::post()
            .uri("/api/admin/coupons")
            .insert_header(("Authorization", format!("Bearer {}", customer_token)))
            .set_json(&coupon)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri("/api/admin/coupons")
            .insert_header(("Authorization", format!("Bearer {}", admin_token)))
            .set_json(&coupon)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["coupon"]["code"], "MONSOON25");

        let req = test::TestRequest::get().uri("/api/coupons?code=Monsoon25").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}
