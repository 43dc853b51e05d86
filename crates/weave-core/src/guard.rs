//! The daily guard: at most one XP-awarding event per user, per source, per
//! calendar day. Action completions are keyed by action id instead.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, progress::UserProgress};

/// Where an XP award comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XpSource {
  Journal,
  Mood,
  Action,
}

impl XpSource {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Journal => "journal",
      Self::Mood => "mood",
      Self::Action => "action",
    }
  }
}

impl fmt::Display for XpSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for XpSource {
  type Err = Error;

  /// Case-insensitive; `journals` is accepted as an alias of `journal`.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "journal" | "journals" => Ok(Self::Journal),
      "mood" => Ok(Self::Mood),
      "action" => Ok(Self::Action),
      other => Err(Error::validation(format!("unknown xp source: {other:?}"))),
    }
  }
}

/// Why an award was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
  /// This action id already has a completion inside today's window.
  ActionAlreadyCompleted,
  /// `action` source without an action id.
  MissingActionId,
  /// The source already earned XP today.
  AlreadyAwardedToday,
  /// The daily cap is exhausted.
  DailyCapReached,
}

impl BlockReason {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::ActionAlreadyCompleted => "action_already_completed",
      Self::MissingActionId => "missing_action_id",
      Self::AlreadyAwardedToday => "already_awarded_today",
      Self::DailyCapReached => "daily_cap_reached",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
  Open,
  Blocked(BlockReason),
}

impl GuardDecision {
  pub fn is_blocked(self) -> bool { matches!(self, Self::Blocked(_)) }
}

/// Decide whether `source` may award XP on `today`.
///
/// `action_logged_today` is the store's answer to "does a completion for
/// `(user, action_id)` exist inside today's UTC range"; it is ignored for
/// other sources.
pub fn evaluate(
  source: XpSource,
  action_id: Option<i64>,
  progress: &UserProgress,
  today: NaiveDate,
  action_logged_today: bool,
) -> GuardDecision {
  match (source, action_id) {
    (XpSource::Action, Some(_)) if action_logged_today => {
      GuardDecision::Blocked(BlockReason::ActionAlreadyCompleted)
    }
    (XpSource::Action, Some(_)) => GuardDecision::Open,
    (XpSource::Action, None) => GuardDecision::Blocked(BlockReason::MissingActionId),
    (source, _) if progress.last_award_date(source) == Some(today) => {
      GuardDecision::Blocked(BlockReason::AlreadyAwardedToday)
    }
    _ => GuardDecision::Open,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::UserId;

  fn date(s: &str) -> NaiveDate { s.parse().unwrap() }

  #[test]
  fn source_parsing() {
    assert_eq!("journal".parse::<XpSource>().unwrap(), XpSource::Journal);
    assert_eq!("Journals".parse::<XpSource>().unwrap(), XpSource::Journal);
    assert_eq!("MOOD".parse::<XpSource>().unwrap(), XpSource::Mood);
    assert_eq!("action".parse::<XpSource>().unwrap(), XpSource::Action);
    assert!(matches!("badge".parse::<XpSource>(), Err(Error::Validation(_))));
  }

  #[test]
  fn action_guard_is_keyed_by_action_id() {
    let today = date("2024-05-10");
    let p = UserProgress::new(UserId(1));

    assert_eq!(evaluate(XpSource::Action, Some(3), &p, today, false), GuardDecision::Open);
    assert_eq!(
      evaluate(XpSource::Action, Some(3), &p, today, true),
      GuardDecision::Blocked(BlockReason::ActionAlreadyCompleted)
    );
    assert_eq!(
      evaluate(XpSource::Action, None, &p, today, false),
      GuardDecision::Blocked(BlockReason::MissingActionId)
    );
  }

  #[test]
  fn dated_sources_block_on_same_day() {
    let today = date("2024-05-10");
    let mut p = UserProgress::new(UserId(1));
    p.last_mood_xp_date = Some(today);
    p.last_journal_xp_date = Some(date("2024-05-09"));

    assert!(evaluate(XpSource::Mood, None, &p, today, false).is_blocked());
    assert_eq!(evaluate(XpSource::Journal, None, &p, today, false), GuardDecision::Open);
  }

  #[test]
  fn action_log_flag_does_not_leak_into_other_sources() {
    let today = date("2024-05-10");
    let p = UserProgress::new(UserId(1));
    assert_eq!(evaluate(XpSource::Mood, Some(3), &p, today, true), GuardDecision::Open);
  }
}
