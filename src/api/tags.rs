//! Tag endpoints.

use super::{ApiResult, AppState, extract::ApiJson};
use crate::{
    core::tag::{self, NewTag},
    entities::TagModel,
};
use axum::{Json, extract::State, http::StatusCode};

pub(super) async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<TagModel>>> {
    Ok(Json(tag::list_tags(&state.db).await?))
}

pub(super) async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewTag>,
) -> ApiResult<(StatusCode, Json<TagModel>)> {
    let created = tag::create_tag(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
