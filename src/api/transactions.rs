//! Expense transaction endpoints.

use super::{
    ApiResult, AppState,
    extract::{ApiJson, ApiPath, ApiQuery},
};
use crate::{
    core::transaction::{self, NewTransaction, TransactionFilter, TransactionPatch},
    entities::TransactionModel,
    errors::Error,
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

pub(super) async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewTransaction>,
) -> ApiResult<(StatusCode, Json<TransactionModel>)> {
    let created = transaction::create_transaction(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn filter(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<TransactionFilter>,
) -> ApiResult<Json<Vec<TransactionModel>>> {
    Ok(Json(transaction::filter_transactions(&state.db, &filter).await?))
}

pub(super) async fn get_one(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<TransactionModel>> {
    let found = transaction::get_transaction_by_id(&state.db, &id)
        .await?
        .ok_or(Error::TransactionNotFound { id })?;
    Ok(Json(found))
}

pub(super) async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(patch): ApiJson<TransactionPatch>,
) -> ApiResult<Json<TransactionModel>> {
    Ok(Json(transaction::update_transaction(&state.db, &id, patch).await?))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<StatusCode> {
    transaction::delete_transaction(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn pay_all(
    State(state): State<AppState>,
    ApiPath(employee_id): ApiPath<String>,
) -> ApiResult<Json<Vec<TransactionModel>>> {
    Ok(Json(transaction::apply_pay_all(&state.db, &employee_id).await?))
}
