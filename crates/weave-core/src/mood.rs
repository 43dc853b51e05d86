//! Mood records, their emotion-tag links, and submission validation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, UserId};

pub const VALENCE_RANGE: std::ops::RangeInclusive<i32> = -2..=2;
pub const ENERGY_RANGE: std::ops::RangeInclusive<i32> = 1..=5;
pub const MAX_NOTE_CHARS: usize = 200;

// ─── Records ─────────────────────────────────────────────────────────────────

/// A stored mood entry. At most one exists per `(user_id, date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodRecord {
  pub id:           i64,
  pub user_id:      UserId,
  pub date:         NaiveDate,
  /// When the day's record was first created; later submissions keep it.
  pub recorded_at:  DateTime<Utc>,
  pub main_valence: i32,
  pub energy:       i32,
  pub trigger_type: Option<String>,
  pub note:         Option<String>,
}

/// Input to [`crate::store::WellbeingStore::upsert_mood`].
#[derive(Debug, Clone)]
pub struct NewMood {
  pub user_id:      UserId,
  pub date:         NaiveDate,
  pub recorded_at:  DateTime<Utc>,
  pub main_valence: i32,
  pub energy:       i32,
  pub trigger_type: Option<String>,
  pub note:         Option<String>,
}

/// Dictionary entry of the fixed emotion-tag vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionTag {
  pub id:   i64,
  pub code: String,
}

// ─── Submission ──────────────────────────────────────────────────────────────

/// A mood submission as received from a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodInput {
  pub main_valence: i32,
  pub energy:       i32,
  /// Emotion-tag codes, e.g. `["anxious", "sad"]`.
  #[serde(default)]
  pub tag_ids:      Option<Vec<String>>,
  pub trigger_type: Option<String>,
  pub note:         Option<String>,
}

impl MoodInput {
  /// Check value ranges, note length, and tag codes.
  pub fn validate(&self) -> Result<()> {
    if !VALENCE_RANGE.contains(&self.main_valence) {
      return Err(Error::validation(format!(
        "mainValence must be between -2 and 2, got {}",
        self.main_valence
      )));
    }
    if !ENERGY_RANGE.contains(&self.energy) {
      return Err(Error::validation(format!(
        "energy must be between 1 and 5, got {}",
        self.energy
      )));
    }
    if let Some(note) = &self.note
      && note.chars().count() > MAX_NOTE_CHARS
    {
      return Err(Error::validation(format!(
        "note must be at most {MAX_NOTE_CHARS} characters"
      )));
    }
    if self.tag_codes().iter().any(|code| code.trim().is_empty()) {
      return Err(Error::validation("tag codes must not be blank"));
    }
    Ok(())
  }

  pub fn tag_codes(&self) -> &[String] { self.tag_ids.as_deref().unwrap_or_default() }

  pub fn into_new_mood(
    self,
    user_id: UserId,
    date: NaiveDate,
    recorded_at: DateTime<Utc>,
  ) -> NewMood {
    NewMood {
      user_id,
      date,
      recorded_at,
      main_valence: self.main_valence,
      energy: self.energy,
      trigger_type: self.trigger_type,
      note: self.note,
    }
  }
}

/// Codes in `requested` with no match in `found`, in request order.
pub fn missing_tag_codes(requested: &[String], found: &[EmotionTag]) -> Vec<String> {
  requested
    .iter()
    .filter(|code| !found.iter().any(|t| &t.code == *code))
    .cloned()
    .collect()
}

/// Response to a mood submission; echoes the submitted tag codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodResult {
  pub mood_id:      i64,
  pub date:         NaiveDate,
  pub main_valence: i32,
  pub energy:       i32,
  pub trigger_type: Option<String>,
  pub note:         Option<String>,
  pub tag_ids:      Vec<String>,
}

/// A stored mood together with its linked tag codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodDetail {
  pub mood_id:      i64,
  pub date:         NaiveDate,
  pub recorded_at:  DateTime<Utc>,
  pub main_valence: i32,
  pub energy:       i32,
  pub trigger_type: Option<String>,
  pub note:         Option<String>,
  pub tag_ids:      Vec<String>,
}

impl MoodDetail {
  pub fn new(mood: MoodRecord, tag_ids: Vec<String>) -> Self {
    Self {
      mood_id: mood.id,
      date: mood.date,
      recorded_at: mood.recorded_at,
      main_valence: mood.main_valence,
      energy: mood.energy,
      trigger_type: mood.trigger_type,
      note: mood.note,
      tag_ids,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn input(valence: i32, energy: i32) -> MoodInput {
    MoodInput { main_valence: valence, energy, ..Default::default() }
  }

  #[test]
  fn accepts_bounds() {
    assert!(input(-2, 1).validate().is_ok());
    assert!(input(2, 5).validate().is_ok());
  }

  #[test]
  fn rejects_out_of_range_values() {
    assert!(matches!(input(3, 3).validate(), Err(Error::Validation(_))));
    assert!(matches!(input(-3, 3).validate(), Err(Error::Validation(_))));
    assert!(matches!(input(0, 0).validate(), Err(Error::Validation(_))));
    assert!(matches!(input(0, 6).validate(), Err(Error::Validation(_))));
  }

  #[test]
  fn note_length_counts_characters() {
    let mut ok = input(0, 3);
    ok.note = Some("가".repeat(MAX_NOTE_CHARS));
    assert!(ok.validate().is_ok());

    let mut long = input(0, 3);
    long.note = Some("a".repeat(MAX_NOTE_CHARS + 1));
    assert!(matches!(long.validate(), Err(Error::Validation(_))));
  }

  #[test]
  fn blank_tag_codes_are_rejected() {
    let mut m = input(1, 3);
    m.tag_ids = Some(vec!["calm".into(), "  ".into()]);
    assert!(matches!(m.validate(), Err(Error::Validation(_))));
  }

  #[test]
  fn missing_codes_keep_request_order() {
    let found = vec![EmotionTag { id: 1, code: "calm".into() }];
    let requested = vec!["sad".into(), "calm".into(), "angsty".into()];
    assert_eq!(missing_tag_codes(&requested, &found), vec!["sad", "angsty"]);
  }

  #[test]
  fn input_uses_camel_case() {
    let m: MoodInput = serde_json::from_str(
      r#"{"mainValence":-1,"energy":2,"tagIds":["sad"],"triggerType":"work"}"#,
    )
    .unwrap();
    assert_eq!(m.main_valence, -1);
    assert_eq!(m.tag_codes(), ["sad".to_string()]);
    assert_eq!(m.trigger_type.as_deref(), Some("work"));
    assert!(m.note.is_none());
  }
}
