use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::money::Money;
use crate::domain::order::PaymentMethod;
use crate::domain::payment::VerificationClaim;
use crate::errors::AppError;
use crate::state::AppState;

use super::auth::AuthUser;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Money>,
    pub payment_method: Option<PaymentMethod>,
    /// Order id or order number. A reference is generated when absent.
    pub order_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    /// Free-form so unknown methods fail verification rather than parsing.
    pub payment_method: String,
    pub payment_id: String,
    pub order_id: Option<String>,
    pub signature: Option<String>,
}

/// GET /api/payment
///
/// Reports which gateways have real credentials configured.
#[utoipa::path(
    get,
    path = "/api/payment",
    responses((status = 200, description = "Gateway configuration")),
    tag = "payment"
)]
pub async fn gateway_status(state: web::Data<AppState>) -> HttpResponse {
    let report = state.payments.report();
    HttpResponse::Ok().json(json!({
        "service": "Payment Gateway Integration",
        "status": "operational",
        "supportedMethods": ["cod", "online", "razorpay", "stripe"],
        "gateways": ["Razorpay", "Stripe"],
        "razorpayConfigured": report.razorpay_configured,
        "stripeConfigured": report.stripe_configured
    }))
}

/// POST /api/payment
///
/// Charges through the selected gateway. Unconfigured gateways answer with a
/// `MOCK_` transaction. With an order id the order becomes PAID and CONFIRMED.
#[utoipa::path(
    post,
    path = "/api/payment",
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Payment processed"),
        (status = 400, description = "Missing fields or non-positive amount"),
        (status = 403, description = "Order belongs to someone else"),
    ),
    tag = "payment"
)]
pub async fn process_payment(
    state: web::Data<AppState>,
    AuthUser(caller): AuthUser,
    body: web::Json<PaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let (Some(amount), Some(method)) = (body.amount, body.payment_method) else {
        return Err(AppError::Validation("Missing required fields".into()));
    };

    let receipt = web::block(move || {
        state
            .payments
            .process(&caller, method, amount, body.order_id.as_deref())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "orderId": receipt.reference,
        "message": "Payment processed successfully",
        "paymentMethod": receipt.method,
        "amount": receipt.amount,
        "transactionId": receipt.outcome.transaction_id,
        "paymentId": receipt.outcome.payment_id,
        "estimatedDelivery": receipt.estimated_delivery
    })))
}

/// PUT /api/payment
///
/// Verification placeholder: cash on delivery and Stripe always verify,
/// Razorpay verifies whenever a signature is present. Not safe for
/// production use.
#[utoipa::path(
    put,
    path = "/api/payment",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Payment verified"),
        (status = 400, description = "Verification failed"),
        (status = 404, description = "Order not found"),
    ),
    tag = "payment"
)]
pub async fn verify_payment(
    state: web::Data<AppState>,
    AuthUser(caller): AuthUser,
    body: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let payment_id = body.payment_id.clone();

    let order = web::block(move || {
        state.payments.verify(
            &caller,
            &body.payment_method,
            VerificationClaim {
                payment_id: body.payment_id,
                order_reference: body.order_id,
                signature: body.signature,
            },
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Payment verified successfully",
        "orderId": order.id,
        "orderNumber": order.order_number,
        "paymentId": payment_id
    })))
}
