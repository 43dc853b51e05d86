//! Handlers for `/mood` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/mood/submit` | camelCase body; one record per user and UTC day |
//! | `GET`  | `/mood/analysis` | `?range=today\|7d\|30d` |
//! | `GET`  | `/mood/{id}` | 404 if not found or not owned |

use axum::{Json, extract::State};
use serde::Deserialize;
use weave_core::{
  analytics::MoodAnalysis,
  mood::{MoodDetail, MoodInput, MoodResult},
  store::WellbeingStore,
};

use crate::{
  AppState, CurrentUser, error::ApiError,
  extract::{ApiJson, ApiPath, ApiQuery},
};

/// `POST /mood/submit`
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  ApiJson(body): ApiJson<MoodInput>,
) -> Result<Json<MoodResult>, ApiError>
where
  S: WellbeingStore + 'static,
{
  Ok(Json(state.engine.submit_mood(user, body).await?))
}

#[derive(Debug, Deserialize)]
pub struct AnalysisParams {
  pub range: Option<String>,
}

/// `GET /mood/analysis?range=`, defaulting to `today`.
pub async fn analysis<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  ApiQuery(params): ApiQuery<AnalysisParams>,
) -> Result<Json<MoodAnalysis>, ApiError>
where
  S: WellbeingStore + 'static,
{
  let range = params.range.as_deref().unwrap_or("today");
  Ok(Json(state.engine.analyze(user, range).await?))
}

/// `GET /mood/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  ApiPath(id): ApiPath<i64>,
) -> Result<Json<MoodDetail>, ApiError>
where
  S: WellbeingStore + 'static,
{
  Ok(Json(state.engine.get_mood(user, id).await?))
}
