//! Read-only rollup of mood history over a date range.

use std::{fmt, str::FromStr};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, mood::MoodRecord};

// ─── Range ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeKey {
  #[serde(rename = "today")]
  Today,
  #[serde(rename = "7d")]
  SevenDays,
  #[serde(rename = "30d")]
  ThirtyDays,
}

impl RangeKey {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Today => "today",
      Self::SevenDays => "7d",
      Self::ThirtyDays => "30d",
    }
  }

  /// Inclusive `[start, end]` window ending on `today`.
  pub fn window(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let back = match self {
      Self::Today => 0,
      Self::SevenDays => 6,
      Self::ThirtyDays => 29,
    };
    (today - Duration::days(back), today)
  }
}

impl fmt::Display for RangeKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for RangeKey {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "today" => Ok(Self::Today),
      "7d" => Ok(Self::SevenDays),
      "30d" => Ok(Self::ThirtyDays),
      other => Err(Error::validation(format!("invalid range value: {other:?}"))),
    }
  }
}

// ─── Labels ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SummaryLabel {
  Neutral,
  LowValenceLowEnergy,
  LowValenceHighEnergy,
  HighValenceLowEnergy,
  HighValenceHighEnergy,
}

/// Energy at or above this counts as high.
pub const HIGH_ENERGY_THRESHOLD: i32 = 3;

pub fn summary_label(main_valence: i32, energy: i32) -> SummaryLabel {
  let high_energy = energy >= HIGH_ENERGY_THRESHOLD;
  match (main_valence.signum(), high_energy) {
    (0, _) => SummaryLabel::Neutral,
    (-1, false) => SummaryLabel::LowValenceLowEnergy,
    (-1, true) => SummaryLabel::LowValenceHighEnergy,
    (_, false) => SummaryLabel::HighValenceLowEnergy,
    (_, true) => SummaryLabel::HighValenceHighEnergy,
  }
}

// ─── Response types ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodSummary {
  pub main_valence: i32,
  pub energy:       i32,
  pub label:        SummaryLabel,
  pub has_note:     bool,
}

impl MoodSummary {
  pub fn neutral() -> Self {
    Self { main_valence: 0, energy: 0, label: SummaryLabel::Neutral, has_note: false }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodPoint {
  pub date:         NaiveDate,
  pub main_valence: i32,
  pub energy:       i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
  pub code:  String,
  pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayMood {
  pub mood_id:      i64,
  pub note:         Option<String>,
  pub trigger_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodAnalysis {
  pub range:        RangeKey,
  pub summary:      MoodSummary,
  pub points:       Vec<MoodPoint>,
  pub tags_summary: Vec<TagCount>,
  pub today_mood:   Option<TodayMood>,
}

impl MoodAnalysis {
  pub fn empty(range: RangeKey) -> Self {
    Self {
      range,
      summary: MoodSummary::neutral(),
      points: Vec::new(),
      tags_summary: Vec::new(),
      today_mood: None,
    }
  }
}

// ─── Rollup ──────────────────────────────────────────────────────────────────

/// Build the analysis for `range` from `moods` (ascending by date) and the tag
/// codes linked to them (one entry per link).
pub fn summarize<I, S>(range: RangeKey, moods: &[MoodRecord], linked_codes: I) -> MoodAnalysis
where
  I: IntoIterator<Item = S>,
  S: Into<String>,
{
  let Some(base) = moods.last() else {
    return MoodAnalysis::empty(range);
  };

  let points = moods
    .iter()
    .map(|m| MoodPoint { date: m.date, main_valence: m.main_valence, energy: m.energy })
    .collect();

  let summary = MoodSummary {
    main_valence: base.main_valence,
    energy:       base.energy,
    label:        summary_label(base.main_valence, base.energy),
    has_note:     base.note.as_deref().is_some_and(|n| !n.is_empty()),
  };

  let today_mood = (range == RangeKey::Today).then(|| TodayMood {
    mood_id:      base.id,
    note:         base.note.clone(),
    trigger_type: base.trigger_type.clone(),
  });

  MoodAnalysis {
    range,
    summary,
    points,
    tags_summary: count_tags(linked_codes),
    today_mood,
  }
}

/// Frequency of each code, in first-seen order.
pub fn count_tags<I, S>(codes: I) -> Vec<TagCount>
where
  I: IntoIterator<Item = S>,
  S: Into<String>,
{
  let mut counts: Vec<TagCount> = Vec::new();
  for code in codes {
    let code = code.into();
    match counts.iter_mut().find(|c| c.code == code) {
      Some(c) => c.count += 1,
      None => counts.push(TagCount { code, count: 1 }),
    }
  }
  counts
}
