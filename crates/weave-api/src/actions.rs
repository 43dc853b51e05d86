//! Handler for `/actions/recommended`.

use axum::{Json, extract::State};
use serde::Serialize;
use weave_core::{action::Action, store::WellbeingStore};

use crate::{AppState, CurrentUser, error::ApiError};

#[derive(Debug, Serialize)]
pub struct ActionList {
  pub actions: Vec<Action>,
}

/// `GET /actions/recommended`: the active catalog.
pub async fn recommended<S>(
  State(state): State<AppState<S>>,
  CurrentUser(user): CurrentUser,
) -> Result<Json<ActionList>, ApiError>
where
  S: WellbeingStore + 'static,
{
  let actions = state.engine.recommended_actions(user).await?;
  Ok(Json(ActionList { actions }))
}
