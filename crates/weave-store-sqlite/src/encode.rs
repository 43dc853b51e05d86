//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Instants are stored as RFC 3339 UTC strings with fixed microsecond
//! precision, so lexical order in SQL matches chronological order. Calendar
//! days are stored as `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use weave_core::{
  UserId,
  action::Action,
  badge::UserBadge,
  journal::JournalEntry,
  mood::MoodRecord,
  progress::{Plan, UserProgress},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn decode_opt_date(s: Option<String>) -> Result<Option<NaiveDate>> {
  s.as_deref().map(decode_date).transpose()
}

// ─── Integers ────────────────────────────────────────────────────────────────

/// Narrow a stored non-negative integer column.
pub fn decode_u32(column: &'static str, v: i64) -> Result<u32> {
  u32::try_from(v).map_err(|_| Error::InvalidValue { column, value: v.to_string() })
}

pub fn decode_i32(column: &'static str, v: i64) -> Result<i32> {
  i32::try_from(v).map_err(|_| Error::InvalidValue { column, value: v.to_string() })
}

// ─── Plan ────────────────────────────────────────────────────────────────────

pub fn decode_plan(s: &str) -> Result<Plan> {
  Plan::parse(s).ok_or_else(|| Error::InvalidValue { column: "plan", value: s.to_owned() })
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const PROGRESS_COLUMNS: &str = "user_id, xp, level, daily_xp, daily_xp_date, \
  last_mood_xp_date, last_journal_xp_date, streak_days, last_checkin_date, \
  total_actions, total_journals, plan";

/// Raw values read directly from a `user_progress` row.
pub struct RawProgress {
  pub user_id:              i64,
  pub xp:                   i64,
  pub level:                i64,
  pub daily_xp:             i64,
  pub daily_xp_date:        Option<String>,
  pub last_mood_xp_date:    Option<String>,
  pub last_journal_xp_date: Option<String>,
  pub streak_days:          i64,
  pub last_checkin_date:    Option<String>,
  pub total_actions:        i64,
  pub total_journals:       i64,
  pub plan:                 String,
}

impl RawProgress {
  /// Map a row selected with [`PROGRESS_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:              row.get(0)?,
      xp:                   row.get(1)?,
      level:                row.get(2)?,
      daily_xp:             row.get(3)?,
      daily_xp_date:        row.get(4)?,
      last_mood_xp_date:    row.get(5)?,
      last_journal_xp_date: row.get(6)?,
      streak_days:          row.get(7)?,
      last_checkin_date:    row.get(8)?,
      total_actions:        row.get(9)?,
      total_journals:       row.get(10)?,
      plan:                 row.get(11)?,
    })
  }

  pub fn into_progress(self) -> Result<UserProgress> {
    Ok(UserProgress {
      user_id:              UserId(self.user_id),
      xp:                   decode_u32("xp", self.xp)?,
      level:                decode_u32("level", self.level)?,
      daily_xp:             decode_u32("daily_xp", self.daily_xp)?,
      daily_xp_date:        decode_opt_date(self.daily_xp_date)?,
      last_mood_xp_date:    decode_opt_date(self.last_mood_xp_date)?,
      last_journal_xp_date: decode_opt_date(self.last_journal_xp_date)?,
      streak_days:          decode_u32("streak_days", self.streak_days)?,
      last_checkin_date:    decode_opt_date(self.last_checkin_date)?,
      total_actions:        decode_u32("total_actions", self.total_actions)?,
      total_journals:       decode_u32("total_journals", self.total_journals)?,
      plan:                 decode_plan(&self.plan)?,
    })
  }
}

pub const MOOD_COLUMNS: &str =
  "mood_id, user_id, date, recorded_at, main_valence, energy, trigger_type, note";

/// Raw values read directly from a `moods` row.
pub struct RawMood {
  pub mood_id:      i64,
  pub user_id:      i64,
  pub date:         String,
  pub recorded_at:  String,
  pub main_valence: i64,
  pub energy:       i64,
  pub trigger_type: Option<String>,
  pub note:         Option<String>,
}

impl RawMood {
  /// Map a row selected with [`MOOD_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      mood_id:      row.get(0)?,
      user_id:      row.get(1)?,
      date:         row.get(2)?,
      recorded_at:  row.get(3)?,
      main_valence: row.get(4)?,
      energy:       row.get(5)?,
      trigger_type: row.get(6)?,
      note:         row.get(7)?,
    })
  }

  pub fn into_mood(self) -> Result<MoodRecord> {
    Ok(MoodRecord {
      id:           self.mood_id,
      user_id:      UserId(self.user_id),
      date:         decode_date(&self.date)?,
      recorded_at:  decode_dt(&self.recorded_at)?,
      main_valence: decode_i32("main_valence", self.main_valence)?,
      energy:       decode_i32("energy", self.energy)?,
      trigger_type: self.trigger_type,
      note:         self.note,
    })
  }
}

pub const JOURNAL_COLUMNS: &str = "journal_id, user_id, content, date, kind, created_at";

/// Raw values read directly from a `journal_entries` row.
pub struct RawJournal {
  pub journal_id: i64,
  pub user_id:    i64,
  pub content:    String,
  pub date:       String,
  pub kind:       String,
  pub created_at: String,
}

impl RawJournal {
  /// Map a row selected with [`JOURNAL_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      journal_id: row.get(0)?,
      user_id:    row.get(1)?,
      content:    row.get(2)?,
      date:       row.get(3)?,
      kind:       row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_entry(self) -> Result<JournalEntry> {
    Ok(JournalEntry {
      id:         self.journal_id,
      user_id:    UserId(self.user_id),
      content:    self.content,
      date:       decode_date(&self.date)?,
      kind:       self.kind,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from an `actions` row.
pub struct RawAction {
  pub action_id:    i64,
  pub title:        String,
  pub description:  Option<String>,
  pub kind:         String,
  pub duration_min: i64,
  pub difficulty:   i64,
  pub is_premium:   bool,
  pub is_active:    bool,
}

impl RawAction {
  pub fn into_action(self) -> Result<Action> {
    Ok(Action {
      id:           self.action_id,
      title:        self.title,
      description:  self.description,
      kind:         self.kind,
      duration_min: decode_u32("duration_min", self.duration_min)?,
      difficulty:   decode_u32("difficulty", self.difficulty)?,
      is_premium:   self.is_premium,
      is_active:    self.is_active,
    })
  }
}

/// Raw values from `user_badges` joined with `badges`.
pub struct RawUserBadge {
  pub user_id:   i64,
  pub badge_id:  i64,
  pub code:      String,
  pub earned_at: String,
}

impl RawUserBadge {
  pub fn into_user_badge(self) -> Result<UserBadge> {
    Ok(UserBadge {
      user_id:   UserId(self.user_id),
      badge_id:  self.badge_id,
      code:      self.code,
      earned_at: decode_dt(&self.earned_at)?,
    })
  }
}
