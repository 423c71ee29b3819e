use std::future::{ready, Ready};

use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::auth_service::Registration;
use crate::domain::rbac::validate_route_access;
use crate::domain::user::{Caller, Language, Role};
use crate::errors::AppError;
use crate::state::AppState;

pub const TOKEN_COOKIE: &str = "token";

// ── Extractors ───────────────────────────────────────────────────────────────

/// The caller identified by a valid access token, taken from the
/// `Authorization: Bearer` header or the `token` cookie.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Caller);

/// An [`AuthUser`] whose role holds every permission the route table
/// requires for this method and path.
#[derive(Debug, Clone)]
pub struct Authorized(pub Caller);

fn access_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| req.cookie(TOKEN_COOKIE).map(|c| c.value().to_string()))
}

fn authenticate(req: &HttpRequest) -> Result<Caller, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("application state is not registered".into()))?;
    let token =
        access_token(req).ok_or_else(|| AppError::Unauthorized("Authentication required".into()))?;
    Ok(state.auth.authenticate(&token)?)
}

fn authorize(req: &HttpRequest) -> Result<Caller, AppError> {
    let caller = authenticate(req)?;
    let access = validate_route_access(caller.role, req.method().as_str(), req.path());
    if !access.allowed {
        let missing: Vec<&str> = access.missing.iter().map(|p| p.as_str()).collect();
        log::warn!(
            "Access denied: user {} ({}) on {} {} lacks {}",
            caller.id,
            caller.role,
            req.method(),
            req.path(),
            missing.join(", ")
        );
        return Err(AppError::Forbidden("Insufficient permissions".into()));
    }
    Ok(caller)
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(AuthUser))
    }
}

impl FromRequest for Authorized {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authorize(req).map(Authorized))
    }
}

// ── DTOs ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub preferred_language: Language,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl From<Caller> for UserResponse {
    fn from(c: Caller) -> Self {
        UserResponse {
            id: c.id,
            email: c.email,
            name: c.name,
            role: c.role,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/auth/register
///
/// Creates a customer account. The password must pass the strength policy.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid input or weak password"),
    ),
    tag = "auth"
)]
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let user = web::block(move || {
        state.auth.register(Registration {
            name: body.name,
            email: body.email,
            password: body.password,
            phone: body.phone,
            preferred_language: body.preferred_language,
        })
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "user": UserResponse::from(user)
    })))
}

/// POST /api/auth/login
///
/// Returns an access token and sets it as an HTTP-only `token` cookie.
/// Five consecutive failures lock the account for thirty minutes.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in"),
        (status = 401, description = "Invalid credentials"),
        (status = 423, description = "Account locked"),
    ),
    tag = "auth"
)]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let session = web::block(move || state.auth.login(&body.email, &body.password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let cookie = Cookie::build(TOKEN_COOKIE, session.token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(json!({
        "success": true,
        "token": session.token,
        "user": UserResponse::from(session.user)
    })))
}
