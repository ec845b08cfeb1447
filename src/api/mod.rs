//! HTTP API over the stores and the report views.
//!
//! Every record travels in its entity shape (camelCase, `_id` keys). Store errors map
//! onto status codes in [`ApiError`], with a `{"error": "..."}` body.

mod employees;
mod expenses;
mod extract;
mod menu;
mod sessions;
mod summary;
mod tags;
mod transactions;

use crate::{config::AppConfig, errors::Error};
use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};

pub use employees::{LoginRequest, LoginResponse, Role, WhoAmI, SESSION_COOKIE};
pub use sessions::{SessionItems, SessionState};
pub use summary::{EmployeeReportQuery, SummaryQuery};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Loaded application configuration
    pub config: Arc<AppConfig>,
    /// Tokens issued by a successful PIN login
    pub admin_tokens: Arc<RwLock<HashSet<String>>>,
}

impl AppState {
    /// Wraps a connection and configuration; no tokens are issued yet.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
            admin_tokens: Arc::new(RwLock::new(HashSet::new())),
        }
    }
}

/// Error returned by every handler.
#[derive(Debug)]
pub struct ApiError(Error);

/// JSON error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,
}

impl From<Error> for ApiError {
    fn from(value: Error) -> Self {
        Self(value)
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(value: sea_orm::DbErr) -> Self {
        Self(Error::Database(value))
    }
}

fn status_for_error(err: &Error) -> StatusCode {
    match err {
        Error::Validation { .. } | Error::InvalidAmount { .. } | Error::InconsistentStatus { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        Error::EmployeeNotFound { .. }
        | Error::ExpenseNotFound { .. }
        | Error::TransactionNotFound { .. }
        | Error::FoodItemNotFound { .. }
        | Error::SessionNotFound { .. } => StatusCode::NOT_FOUND,
        Error::SessionInactive { .. }
        | Error::DuplicateTransaction { .. }
        | Error::Conflict { .. } => StatusCode::CONFLICT,
        Error::Config { .. } | Error::Database(_) | Error::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_error(err: Error, status: StatusCode) -> String {
    if status.is_server_error() {
        tracing::error!("internal error: {err}");
        "internal server error".to_string()
    } else {
        err.to_string()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for_error(&self.0);
        let error = message_for_error(self.0, status);
        (status, Json(ErrorBody { error })).into_response()
    }
}

/// Handler result.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Builds the router with every route.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/employee",
            get(employees::list).post(employees::create),
        )
        .route("/employee/login-pin", post(employees::login_pin))
        .route("/employee/logout", post(employees::logout))
        .route("/employee/whoami", get(employees::whoami))
        .route(
            "/employee/{id}",
            get(employees::get_one)
                .put(employees::update)
                .delete(employees::remove),
        )
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route("/expenses/range", get(expenses::range))
        .route(
            "/expenses/with-transactions",
            post(expenses::create_with_transactions),
        )
        .route(
            "/expenses/{id}",
            get(expenses::get_one).delete(expenses::remove),
        )
        .route(
            "/expenses/{id}/toggle-collected",
            put(expenses::toggle_collected),
        )
        .route("/expense-transactions", post(transactions::create))
        .route("/expense-transactions/filter", get(transactions::filter))
        .route(
            "/expense-transactions/pay-all/{employee_id}",
            post(transactions::pay_all),
        )
        .route(
            "/expense-transactions/{id}",
            get(transactions::get_one)
                .put(transactions::update)
                .delete(transactions::remove),
        )
        .route("/food-items", get(menu::list).post(menu::create))
        .route(
            "/food-items/{id}",
            get(menu::get_one).put(menu::update).delete(menu::remove),
        )
        .route("/sessions", get(sessions::list).post(sessions::create))
        .route("/sessions/with-expense", post(sessions::create_with_expense))
        .route("/sessions/{id}", get(sessions::get_one))
        .route("/sessions/{id}/deactivate", put(sessions::set_active))
        .route("/sessions/{id}/items", put(sessions::replace_items))
        .route("/sessions/{id}/orders", post(sessions::submit_order))
        .route("/tags", get(tags::list).post(tags::create))
        .route("/summary", get(summary::dashboard))
        .route("/summary/expenses", get(summary::expenses))
        .route("/summary/employees/{id}", get(summary::employee))
        .with_state(state)
}

/// Serves the API on an already bound listener until the server stops.
///
/// # Errors
/// Returns an error if the listener fails.
pub async fn run_with_listener(state: AppState, listener: TcpListener) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);
    axum::serve(listener, router(state)).await
}

/// Serves the API in a background task, returning the bound address.
///
/// # Errors
/// Returns an error if the listener has no local address.
pub fn spawn_with_listener(state: AppState, listener: TcpListener) -> std::io::Result<SocketAddr> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

/// Binds the configured address and serves the API.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run(state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(state.config.server.bind.as_str()).await?;
    run_with_listener(state, listener).await
}
