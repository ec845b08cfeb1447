//! Employee endpoints and the PIN login.

use super::{
    ApiResult, AppState,
    extract::{ApiJson, ApiPath},
};
use crate::{
    core::{
        employee::{self, EmployeePatch, NewEmployee},
        validation::validate_pin,
    },
    entities::EmployeeModel,
    errors::Error,
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// Cookie carrying the token issued by a successful PIN login.
pub const SESSION_COOKIE: &str = "lunch_session";

/// `POST /employee/login-pin` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Six-digit PIN
    pub pin: String,
}

/// `POST /employee/login-pin` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Whether the PIN matched
    pub success: bool,
}

/// Role reported by `whoami`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Logged in with the admin PIN
    Admin,
    /// Anyone else
    Guest,
}

/// `GET /employee/whoami` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoAmI {
    /// Current role
    pub role: Role,
}

pub(super) async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<EmployeeModel>>> {
    Ok(Json(employee::list_employees(&state.db).await?))
}

pub(super) async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewEmployee>,
) -> ApiResult<(StatusCode, Json<EmployeeModel>)> {
    let created = employee::create_employee(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn get_one(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<EmployeeModel>> {
    let found = employee::get_employee_by_id(&state.db, &id)
        .await?
        .ok_or(Error::EmployeeNotFound { id })?;
    Ok(Json(found))
}

pub(super) async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(patch): ApiJson<EmployeePatch>,
) -> ApiResult<Json<EmployeeModel>> {
    Ok(Json(employee::update_employee(&state.db, &id, patch).await?))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<StatusCode> {
    employee::delete_employee(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn login_pin(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<LoginResponse>)> {
    validate_pin(&payload.pin)?;

    let matches = state
        .config
        .auth
        .admin_pin
        .as_deref()
        .is_some_and(|pin| pin == payload.pin);
    if !matches {
        warn!("Rejected PIN login");
        return Ok((jar, Json(LoginResponse { success: false })));
    }

    let token = Uuid::new_v4().to_string();
    state.admin_tokens.write().await.insert(token.clone());
    info!("Admin logged in");

    let jar = jar.add(
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true),
    );
    Ok((jar, Json(LoginResponse { success: true })))
}

pub(super) async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.admin_tokens.write().await.remove(cookie.value());
    }
    (jar.remove(Cookie::from(SESSION_COOKIE)), StatusCode::NO_CONTENT)
}

pub(super) async fn whoami(State(state): State<AppState>, jar: CookieJar) -> Json<WhoAmI> {
    let known = match jar.get(SESSION_COOKIE) {
        Some(cookie) => state.admin_tokens.read().await.contains(cookie.value()),
        None => false,
    };
    let role = if known { Role::Admin } else { Role::Guest };
    Json(WhoAmI { role })
}
