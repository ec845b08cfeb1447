//! Ordering session endpoints.

use super::{
    ApiResult, AppState,
    extract::{ApiJson, ApiPath},
};
use crate::{
    core::session::{self, NewSession, NewSessionWithExpense, SessionOrder, SessionWithExpense},
    entities::{SessionModel, TransactionModel},
    errors::Error,
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

/// `PUT /sessions/{id}/deactivate` body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Whether the session accepts orders
    pub is_active: bool,
}

/// `PUT /sessions/{id}/items` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionItems {
    /// Item names on offer
    pub items: Vec<String>,
}

pub(super) async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<SessionModel>>> {
    Ok(Json(session::list_sessions(&state.db).await?))
}

pub(super) async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewSession>,
) -> ApiResult<(StatusCode, Json<SessionModel>)> {
    let created = session::create_session(&state.db, &payload.expense_id, payload.items).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn create_with_expense(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewSessionWithExpense>,
) -> ApiResult<(StatusCode, Json<SessionWithExpense>)> {
    let created = session::create_session_with_expense(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn get_one(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<SessionModel>> {
    let found = session::get_session_by_id(&state.db, &id)
        .await?
        .ok_or(Error::SessionNotFound { id })?;
    Ok(Json(found))
}

pub(super) async fn set_active(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(payload): ApiJson<SessionState>,
) -> ApiResult<Json<SessionModel>> {
    Ok(Json(
        session::set_session_active(&state.db, &id, payload.is_active).await?,
    ))
}

pub(super) async fn replace_items(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(payload): ApiJson<SessionItems>,
) -> ApiResult<Json<SessionModel>> {
    Ok(Json(
        session::update_session_items(&state.db, &id, payload.items).await?,
    ))
}

pub(super) async fn submit_order(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(order): ApiJson<SessionOrder>,
) -> ApiResult<Json<TransactionModel>> {
    Ok(Json(session::submit_order(&state.db, &id, order).await?))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        entities::FoodKind,
        test_utils::{create_test_food_item, send, test_state},
    };
    use axum::http::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_session_ordering_flow() {
        let state = test_state().await;
        create_test_food_item(&state.db, "Cơm gà", FoodKind::Main, 35_000)
            .await
            .unwrap();
        create_test_food_item(&state.db, "Trứng ốp la", FoodKind::Side, 5_000)
            .await
            .unwrap();

        let (status, opened) = send(
            &state,
            Method::POST,
            "/sessions/with-expense",
            Some(json!({"title": "Thứ 2", "date": "2025-05-12", "items": ["Cơm gà"]})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = opened["session"]["_id"].as_str().unwrap().to_string();
        assert_eq!(opened["session"]["isActive"], true);

        let (status, _) = send(
            &state,
            Method::PUT,
            &format!("/sessions/{id}/items"),
            Some(json!({"items": ["Cơm gà", "Trứng ốp la"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, tx) = send(
            &state,
            Method::POST,
            &format!("/sessions/{id}/orders"),
            Some(json!({"employeeId": "u1", "items": ["Cơm gà", "Trứng ốp la"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(tx["amount"], 40000);
        assert_eq!(tx["status"], "unpaid");

        let (status, closed) = send(
            &state,
            Method::PUT,
            &format!("/sessions/{id}/deactivate"),
            Some(json!({"isActive": false})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(closed["isActive"], false);

        let (status, _) = send(
            &state,
            Method::POST,
            &format!("/sessions/{id}/orders"),
            Some(json!({"employeeId": "u2", "items": ["Cơm gà"]})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_session_for_missing_expense() {
        let state = test_state().await;
        let (status, _) = send(
            &state,
            Method::POST,
            "/sessions",
            Some(json!({"expenseId": "missing", "items": []})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, listed) = send(&state, Method::GET, "/sessions", None).await;
        assert!(listed.as_array().unwrap().is_empty());
    }
}
