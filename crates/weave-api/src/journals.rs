//! Handlers for `/journals` endpoints.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use weave_core::{
  journal::{JournalEntry, NewJournal},
  store::WellbeingStore,
};

use crate::{
  AppState, CurrentUser, OffsetParams, error::ApiError,
  extract::{ApiJson, ApiPath, ApiQuery},
};

/// `POST /journals[?tz_offset=]`, body: `{"content": "...", "date"?, "type"?}`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  ApiQuery(params): ApiQuery<OffsetParams>,
  ApiJson(body): ApiJson<NewJournal>,
) -> Result<impl IntoResponse, ApiError>
where
  S: WellbeingStore + 'static,
{
  let receipt = state.engine.record_journal(user, body, params.minutes()).await?;
  Ok((StatusCode::CREATED, Json(receipt)))
}

#[derive(Debug, Deserialize)]
pub struct ByDateParams {
  pub date: String,
}

#[derive(Debug, Serialize)]
pub struct JournalList {
  pub items: Vec<JournalEntry>,
}

/// `GET /journals/by-date?date=YYYY-MM-DD`
pub async fn by_date<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  ApiQuery(params): ApiQuery<ByDateParams>,
) -> Result<Json<JournalList>, ApiError>
where
  S: WellbeingStore + 'static,
{
  let date = NaiveDate::parse_from_str(&params.date, "%Y-%m-%d")
    .map_err(|_| ApiError::BadRequest(format!("invalid date: {:?}", params.date)))?;
  let items = state.engine.journals_on(user, date).await?;
  Ok(Json(JournalList { items }))
}

/// `GET /journals/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  ApiPath(id): ApiPath<i64>,
) -> Result<Json<JournalEntry>, ApiError>
where
  S: WellbeingStore + 'static,
{
  Ok(Json(state.engine.get_journal(user, id).await?))
}
