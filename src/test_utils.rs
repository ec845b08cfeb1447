//! Shared test utilities for the lunch ledger.
//!
//! This module provides helpers for setting up in-memory test databases, creating
//! records through the stores with sensible defaults, building plain model
//! fixtures for the pure report functions, and driving the router in-process.

use crate::{
    api::{AppState, router, spawn_with_listener},
    client::Client,
    config::AppConfig,
    core::{
        employee::{NewEmployee, create_employee},
        expense::{NewExpense, create_expense},
        menu::{NewFoodItem, create_food_item},
        status::derive_status,
        transaction::{NewTransaction, create_transaction},
    },
    entities::{
        EmployeeModel, ExpenseModel, FoodItemModel, FoodKind, Gender, NameList, TransactionModel,
    },
    errors::Result,
};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::{DateTime, NaiveDate, Utc};
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

/// PIN configured by [`test_state`].
pub const TEST_PIN: &str = "123456";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all store tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test database with one expense already in place.
pub async fn setup_with_expense() -> Result<(DatabaseConnection, ExpenseModel)> {
    let db = setup_test_db().await?;
    let expense = create_test_expense(&db, "Ăn trưa thứ 2").await?;
    Ok((db, expense))
}

/// Monday used as the default meal date in tests.
#[must_use]
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 12).unwrap_or_default()
}

/// Creates an expense dated [`test_date`].
pub async fn create_test_expense(db: &DatabaseConnection, title: &str) -> Result<ExpenseModel> {
    create_dated_expense(db, title, test_date()).await
}

/// Creates an expense with the given meal date.
pub async fn create_dated_expense(
    db: &DatabaseConnection,
    title: &str,
    date: NaiveDate,
) -> Result<ExpenseModel> {
    create_expense(
        db,
        NewExpense {
            title: title.to_string(),
            date,
            notes: None,
            tag_ids: vec![],
        },
    )
    .await
}

/// Creates an unpaid charge with no note.
pub async fn create_test_transaction(
    db: &DatabaseConnection,
    expense_id: &str,
    employee_id: &str,
    amount: i64,
) -> Result<TransactionModel> {
    create_transaction(db, NewTransaction::unpaid(expense_id, employee_id, amount, None)).await
}

/// Registers an employee with no alias.
pub async fn create_test_employee(db: &DatabaseConnection, name: &str) -> Result<EmployeeModel> {
    create_employee(
        db,
        NewEmployee {
            name: name.to_string(),
            alias: None,
            gender: Gender::Female,
        },
    )
    .await
}

/// Adds a menu item.
pub async fn create_test_food_item(
    db: &DatabaseConnection,
    name: &str,
    kind: FoodKind,
    price: i64,
) -> Result<FoodItemModel> {
    create_food_item(
        db,
        NewFoodItem {
            name: name.to_string(),
            kind,
            price,
        },
    )
    .await
}

/// Employee model that never touches a database.
#[must_use]
pub fn employee_fixture(id: &str, name: &str, alias: Option<&str>) -> EmployeeModel {
    EmployeeModel {
        id: id.to_string(),
        name: name.to_string(),
        alias: alias.map(ToString::to_string),
        gender: Gender::Male,
    }
}

/// Expense model that never touches a database.
#[must_use]
pub fn expense_fixture(id: &str, title: &str, date: NaiveDate) -> ExpenseModel {
    ExpenseModel {
        id: id.to_string(),
        title: title.to_string(),
        date,
        notes: None,
        is_collected: false,
        tag_ids: NameList::default(),
        created_at: Utc::now(),
    }
}

/// Transaction model whose stored status is derived from the amounts.
#[must_use]
pub fn transaction_fixture(
    id: &str,
    expense_id: &str,
    employee_id: &str,
    amount: i64,
    received: i64,
    created_at: DateTime<Utc>,
) -> TransactionModel {
    TransactionModel {
        id: id.to_string(),
        expense_id: expense_id.to_string(),
        employee_id: employee_id.to_string(),
        amount,
        received_amount: received,
        note: None,
        status: derive_status(amount, received),
        created_at,
        updated_at: created_at,
    }
}

/// Food item model that never touches a database.
#[must_use]
pub fn food_item_fixture(name: &str, kind: FoodKind, price: i64) -> FoodItemModel {
    let now = Utc::now();
    FoodItemModel {
        id: format!("item-{name}"),
        name: name.to_string(),
        kind,
        price,
        created_at: now,
        updated_at: now,
    }
}

/// API state over a fresh in-memory database, with [`TEST_PIN`] as the admin PIN.
///
/// # Panics
/// Panics if the in-memory database cannot be created.
#[allow(clippy::unwrap_used)]
pub async fn test_state() -> AppState {
    let db = setup_test_db().await.unwrap();
    let mut config = AppConfig::default();
    config.auth.admin_pin = Some(TEST_PIN.to_string());
    AppState::new(db, config)
}

/// Serves a fresh [`test_state`] on an ephemeral local port and returns a client for it.
///
/// # Panics
/// Panics if the port cannot be bound.
#[allow(clippy::unwrap_used)]
pub async fn spawn_test_server() -> (AppState, Client) {
    let state = test_state().await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = spawn_with_listener(state.clone(), listener).unwrap();
    let client = Client::new(&format!("http://{addr}")).unwrap();
    (state, client)
}

/// Sends one request through the router and decodes the JSON reply.
///
/// An empty reply body decodes as [`Value::Null`].
pub async fn send(
    state: &AppState,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    };
    dispatch(state, request).await
}

/// Like [`send`] with no body and a `Cookie` header.
pub async fn send_with_cookie(
    state: &AppState,
    method: Method,
    uri: &str,
    cookie: &str,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty());
    dispatch(state, request).await
}

#[allow(clippy::unwrap_used)]
async fn dispatch(
    state: &AppState,
    request: std::result::Result<Request<Body>, axum::http::Error>,
) -> (StatusCode, Value) {
    let response = router(state.clone()).oneshot(request.unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
