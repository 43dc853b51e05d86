//! Guided actions and their completion log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// A catalog entry for a guided action (breathing, stretching, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
  pub id:           i64,
  pub title:        String,
  pub description:  Option<String>,
  #[serde(rename = "type")]
  pub kind:         String,
  pub duration_min: u32,
  pub difficulty:   u32,
  pub is_premium:   bool,
  pub is_active:    bool,
}

/// One completed guided action. Rows are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCompletion {
  pub user_id:      UserId,
  pub action_id:    i64,
  pub started_at:   DateTime<Utc>,
  pub completed_at: DateTime<Utc>,
}
