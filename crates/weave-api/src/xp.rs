//! Handler for `/xp/increment`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/xp/increment` | `?amount=&source=[&action_id=][&tz_offset=]` |

use axum::{Json, extract::State};
use serde::Deserialize;
use weave_core::{progress::AwardOutcome, store::WellbeingStore};
use weave_engine::AwardRequest;

use crate::{
  AppState, CurrentUser, error::ApiError,
  extract::ApiQuery,
};

#[derive(Debug, Deserialize)]
pub struct IncrementParams {
  pub amount:    i64,
  pub source:    String,
  pub action_id: Option<i64>,
  pub tz_offset: Option<i32>,
}

/// `POST /xp/increment`. A guard-blocked award is a `200` with
/// `"blocked": true`, not an error.
pub async fn increment<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
  ApiQuery(params): ApiQuery<IncrementParams>,
) -> Result<Json<AwardOutcome>, ApiError>
where
  S: WellbeingStore + 'static,
{
  let req = AwardRequest {
    source:            params.source,
    amount:            params.amount,
    action_id:         params.action_id,
    tz_offset_minutes: params.tz_offset.unwrap_or(0),
  };
  let outcome = state.engine.award_xp(user, req).await?;
  Ok(Json(outcome))
}
