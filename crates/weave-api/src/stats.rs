//! Handlers for `/stats` endpoints.

use axum::{Json, extract::State};
use serde::Serialize;
use weave_core::{progress::ProfileView, store::WellbeingStore};

use crate::{
  AppState, CurrentUser, OffsetParams, error::ApiError,
  extract::ApiQuery,
};

/// `GET /stats/profile[?tz_offset=]`
pub async fn profile<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  ApiQuery(params): ApiQuery<OffsetParams>,
) -> Result<Json<ProfileView>, ApiError>
where
  S: WellbeingStore + 'static,
{
  Ok(Json(state.engine.profile(user, params.minutes()).await?))
}

#[derive(Debug, Serialize)]
pub struct CompletedToday {
  pub actions: Vec<i64>,
}

/// `GET /stats/actions/completed/today[?tz_offset=]`
pub async fn completed_today<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  ApiQuery(params): ApiQuery<OffsetParams>,
) -> Result<Json<CompletedToday>, ApiError>
where
  S: WellbeingStore + 'static,
{
  let actions = state.engine.completed_actions_today(user, params.minutes()).await?;
  Ok(Json(CompletedToday { actions }))
}
