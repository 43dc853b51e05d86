//! Badge catalog entries, grants, and the threshold rules that earn them.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, UserId, progress::UserProgress};

pub const CALMDOWN_ROOKIE: &str = "calmdown_rookie";
pub const JOURNAL_STARTER: &str = "journal_starter";
pub const STREAK_7: &str = "streak_7";

pub const ACTIONS_FOR_ROOKIE: u32 = 5;
pub const JOURNALS_FOR_STARTER: u32 = 5;
pub const STREAK_FOR_STREAK_7: u32 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
  pub id:   i64,
  pub code: String,
}

/// A badge held by a user. Unique per `(user_id, badge_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBadge {
  pub user_id:   UserId,
  pub badge_id:  i64,
  pub code:      String,
  pub earned_at: DateTime<Utc>,
}

/// What prompted a badge check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTrigger {
  Action,
  Journal,
  Mood,
  Badge,
}

impl FromStr for BadgeTrigger {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "action" => Ok(Self::Action),
      "journal" | "journals" => Ok(Self::Journal),
      "mood" => Ok(Self::Mood),
      "badge" => Ok(Self::Badge),
      other => Err(Error::validation(format!("unknown badge source: {other:?}"))),
    }
  }
}

/// Badge codes whose thresholds `progress` currently meets for `trigger`.
/// Codes already held are filtered out by the caller.
pub fn earned_codes(trigger: BadgeTrigger, progress: &UserProgress) -> Vec<&'static str> {
  let mut earned = Vec::new();
  if trigger == BadgeTrigger::Action && progress.total_actions >= ACTIONS_FOR_ROOKIE {
    earned.push(CALMDOWN_ROOKIE);
  }
  if trigger == BadgeTrigger::Journal && progress.total_journals >= JOURNALS_FOR_STARTER {
    earned.push(JOURNAL_STARTER);
  }
  if progress.streak_days >= STREAK_FOR_STREAK_7 {
    earned.push(STREAK_7);
  }
  earned
}
