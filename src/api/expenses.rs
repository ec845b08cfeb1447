//! Expense endpoints.

use super::{
    ApiResult, AppState,
    extract::{ApiJson, ApiPath, ApiQuery},
};
use crate::{
    core::{
        expense::{self, ExpenseWithTransactions, NewExpense},
        validation::ExpenseDraft,
    },
    entities::ExpenseModel,
    errors::Error,
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;

/// `GET /expenses/range` query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RangeQuery {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

pub(super) async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<ExpenseModel>>> {
    Ok(Json(expense::list_expenses(&state.db).await?))
}

pub(super) async fn range(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RangeQuery>,
) -> ApiResult<Json<Vec<ExpenseModel>>> {
    let found = expense::list_expenses_in_range(&state.db, query.start_date, query.end_date).await?;
    Ok(Json(found))
}

pub(super) async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewExpense>,
) -> ApiResult<(StatusCode, Json<ExpenseModel>)> {
    let created = expense::create_expense(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn create_with_transactions(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<ExpenseDraft>,
) -> ApiResult<(StatusCode, Json<ExpenseWithTransactions>)> {
    let created = expense::create_expense_with_transactions(&state.db, &draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn get_one(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<ExpenseModel>> {
    let found = expense::get_expense_by_id(&state.db, &id)
        .await?
        .ok_or(Error::ExpenseNotFound { id })?;
    Ok(Json(found))
}

pub(super) async fn toggle_collected(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<ExpenseModel>> {
    Ok(Json(expense::toggle_collected(&state.db, &id).await?))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<StatusCode> {
    expense::delete_expense(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
