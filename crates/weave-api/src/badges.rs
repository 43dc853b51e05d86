//! Handlers for `/badges` endpoints.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use weave_core::{badge::UserBadge, store::WellbeingStore};

use crate::{
  AppState, CurrentUser, error::ApiError,
  extract::ApiQuery,
};

#[derive(Debug, Deserialize)]
pub struct CheckParams {
  pub source: String,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
  pub earned: Vec<String>,
}

/// `POST /badges/check?source=action|journal|mood|badge`
pub async fn check<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  ApiQuery(params): ApiQuery<CheckParams>,
) -> Result<Json<CheckResponse>, ApiError>
where
  S: WellbeingStore + 'static,
{
  let earned = state.engine.evaluate_badges(user, &params.source).await?;
  Ok(Json(CheckResponse { earned }))
}

#[derive(Debug, Serialize)]
pub struct BadgeList {
  pub badges: Vec<UserBadge>,
}

/// `GET /badges`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
) -> Result<Json<BadgeList>, ApiError>
where
  S: WellbeingStore + 'static,
{
  let badges = state.engine.list_badges(user).await?;
  Ok(Json(BadgeList { badges }))
}
