//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Core(#[from] weave_core::Error),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    use weave_core::Error as E;

    match self {
      ApiError::Unauthorized => {
        let mut res = (StatusCode::UNAUTHORIZED, Json(json!({ "error": "unauthorized" })))
          .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"weave\""),
        );
        res
      }
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response(),
      ApiError::Core(e) => match e {
        E::Validation(m) => {
          (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "error": m }))).into_response()
        }
        E::UnknownTags(ref missing) => (
          StatusCode::BAD_REQUEST,
          Json(json!({ "error": e.to_string(), "missing": missing })),
        )
          .into_response(),
        E::NotFound { .. } => {
          (StatusCode::NOT_FOUND, Json(json!({ "error": e.to_string() }))).into_response()
        }
        E::Consistency { mood_id, .. } => {
          error!(error = %e, mood_id, "mood tag sync failed");
          (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string(), "mood_id": mood_id, "retry": true })),
          )
            .into_response()
        }
        E::JournalAward { journal_id, .. } => {
          error!(error = %e, journal_id, "journal award failed");
          (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string(), "journal_id": journal_id, "retry": false })),
          )
            .into_response()
        }
        E::Store { op, user, .. } => {
          error!(error = %e, op, %user, "store failure");
          (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "internal storage error" })))
            .into_response()
        }
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::Value;

  use super::*;

  async fn render(err: weave_core::Error) -> (StatusCode, Value) {
    let res = ApiError::from(err).into_response();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  #[tokio::test]
  async fn tag_sync_failure_asks_for_a_retry() {
    let (status, body) = render(weave_core::Error::Consistency {
      mood_id: 7,
      source:  "constraint failed".into(),
    })
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["mood_id"], 7);
    assert_eq!(body["retry"], true);
  }

  #[tokio::test]
  async fn journal_award_failure_forbids_a_retry() {
    let (status, body) = render(weave_core::Error::JournalAward {
      journal_id: 3,
      source:     "disk full".into(),
    })
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["journal_id"], 3);
    assert_eq!(body["retry"], false);
  }
}
