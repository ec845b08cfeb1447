//! Food item endpoints.

use super::{
    ApiResult, AppState,
    extract::{ApiJson, ApiPath},
};
use crate::{
    core::menu::{self, FoodItemPatch, NewFoodItem},
    entities::FoodItemModel,
    errors::Error,
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

pub(super) async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<FoodItemModel>>> {
    Ok(Json(menu::list_food_items(&state.db).await?))
}

pub(super) async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewFoodItem>,
) -> ApiResult<(StatusCode, Json<FoodItemModel>)> {
    let created = menu::create_food_item(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn get_one(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<FoodItemModel>> {
    let found = menu::get_food_item_by_id(&state.db, &id)
        .await?
        .ok_or(Error::FoodItemNotFound { id })?;
    Ok(Json(found))
}

pub(super) async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(patch): ApiJson<FoodItemPatch>,
) -> ApiResult<Json<FoodItemModel>> {
    Ok(Json(menu::update_food_item(&state.db, &id, patch).await?))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<StatusCode> {
    menu::delete_food_item(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
