//! Progression state and the pure rules that move it: levels, the shared daily
//! XP cap, and check-in streaks.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, UserId, guard::XpSource};

/// Maximum XP a user may gain across all sources within one calendar day.
pub const DAILY_XP_CAP: u32 = 150;

/// XP thresholds; level `n` starts at `LEVEL_CUTOFFS[n - 1]`.
pub const LEVEL_CUTOFFS: [u32; 10] = [0, 100, 200, 300, 400, 500, 600, 700, 800, 900];

pub const MAX_LEVEL: u32 = LEVEL_CUTOFFS.len() as u32;

// ─── Plan ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
  #[default]
  Free,
  Premium,
}

impl Plan {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Free => "free",
      Self::Premium => "premium",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "free" => Some(Self::Free),
      "premium" => Some(Self::Premium),
      _ => None,
    }
  }
}

// ─── UserProgress ────────────────────────────────────────────────────────────

/// Per-user progression row. Mutated only through the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
  pub user_id:              UserId,
  pub xp:                   u32,
  pub level:                u32,
  /// XP gained on `daily_xp_date`; stale once the day changes.
  pub daily_xp:             u32,
  pub daily_xp_date:        Option<NaiveDate>,
  pub last_mood_xp_date:    Option<NaiveDate>,
  pub last_journal_xp_date: Option<NaiveDate>,
  pub streak_days:          u32,
  pub last_checkin_date:    Option<NaiveDate>,
  pub total_actions:        u32,
  pub total_journals:       u32,
  pub plan:                 Plan,
}

impl UserProgress {
  /// The row a user starts with before any activity.
  pub fn new(user_id: UserId) -> Self {
    Self {
      user_id,
      xp: 0,
      level: 1,
      daily_xp: 0,
      daily_xp_date: None,
      last_mood_xp_date: None,
      last_journal_xp_date: None,
      streak_days: 0,
      last_checkin_date: None,
      total_actions: 0,
      total_journals: 0,
      plan: Plan::default(),
    }
  }

  /// XP already gained on `today`; zero if the stored date is another day.
  pub fn daily_xp_on(&self, today: NaiveDate) -> u32 {
    if self.daily_xp_date == Some(today) { self.daily_xp } else { 0 }
  }

  /// The last day `source` earned XP, for sources tracked by date.
  pub fn last_award_date(&self, source: XpSource) -> Option<NaiveDate> {
    match source {
      XpSource::Mood => self.last_mood_xp_date,
      XpSource::Journal => self.last_journal_xp_date,
      XpSource::Action => None,
    }
  }

  /// Apply a non-zero `gained` amount earned on `today` from `source`.
  ///
  /// Callers have already run the guard and the cap.
  pub fn apply_award(&mut self, source: XpSource, gained: u32, today: NaiveDate) {
    let daily_base = self.daily_xp_on(today);

    self.xp = self.xp.saturating_add(gained);
    self.level = level_for_xp(self.xp);
    self.daily_xp = daily_base + gained;
    self.daily_xp_date = Some(today);
    self.streak_days = streak_delta(self.last_checkin_date, today).apply(self.streak_days);
    self.last_checkin_date = Some(today);

    match source {
      XpSource::Mood => self.last_mood_xp_date = Some(today),
      XpSource::Journal => self.last_journal_xp_date = Some(today),
      XpSource::Action => self.total_actions = self.total_actions.saturating_add(1),
    }
  }
}

// ─── Rules ───────────────────────────────────────────────────────────────────

/// Level reached at `xp`: the number of cutoffs at or below it, capped at
/// [`MAX_LEVEL`].
pub fn level_for_xp(xp: u32) -> u32 {
  let reached = LEVEL_CUTOFFS.iter().filter(|&&cutoff| xp >= cutoff).count() as u32;
  reached.clamp(1, MAX_LEVEL)
}

/// XP actually grantable when `amount` is requested on top of `daily_base`.
pub fn apply_daily_cap(daily_base: u32, amount: u32) -> u32 {
  amount.min(DAILY_XP_CAP.saturating_sub(daily_base))
}

/// How a check-in on `today` moves the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakDelta {
  /// Already checked in today.
  Unchanged,
  /// Last check-in was yesterday.
  Continued,
  /// First check-in ever, or a gap of two days or more.
  Reset,
}

impl StreakDelta {
  pub fn apply(self, streak_days: u32) -> u32 {
    match self {
      Self::Unchanged => streak_days,
      Self::Continued => streak_days.saturating_add(1),
      Self::Reset => 1,
    }
  }
}

pub fn streak_delta(last_checkin: Option<NaiveDate>, today: NaiveDate) -> StreakDelta {
  match last_checkin {
    Some(last) if last == today => StreakDelta::Unchanged,
    Some(last) if last == today - Duration::days(1) => StreakDelta::Continued,
    _ => StreakDelta::Reset,
  }
}

/// Reject non-positive award amounts.
pub fn validate_amount(amount: i64) -> Result<u32> {
  if amount <= 0 {
    return Err(Error::validation(format!("amount must be positive, got {amount}")));
  }
  u32::try_from(amount)
    .map_err(|_| Error::validation(format!("amount {amount} is too large")))
}

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Result of an award attempt. `blocked` outcomes carry the unchanged state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardOutcome {
  pub gained_xp:   u32,
  pub total_xp:    u32,
  pub level:       u32,
  pub streak_days: u32,
  pub daily_xp:    u32,
  pub blocked:     bool,
}

impl AwardOutcome {
  pub fn granted(progress: &UserProgress, gained_xp: u32) -> Self {
    Self {
      gained_xp,
      total_xp: progress.xp,
      level: progress.level,
      streak_days: progress.streak_days,
      daily_xp: progress.daily_xp,
      blocked: false,
    }
  }

  pub fn blocked(progress: &UserProgress, today: NaiveDate) -> Self {
    Self {
      gained_xp:   0,
      total_xp:    progress.xp,
      level:       progress.level,
      streak_days: progress.streak_days,
      daily_xp:    progress.daily_xp_on(today),
      blocked:     true,
    }
  }
}

/// Read model returned by the profile endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileView {
  pub level:          u32,
  pub xp:             u32,
  pub streak_days:    u32,
  pub daily_xp:       u32,
  pub daily_xp_cap:   u32,
  pub plan:           Plan,
  pub total_actions:  u32,
  pub total_journals: u32,
}

impl ProfileView {
  pub fn new(progress: &UserProgress, today: NaiveDate) -> Self {
    Self {
      level:          progress.level,
      xp:             progress.xp,
      streak_days:    progress.streak_days,
      daily_xp:       progress.daily_xp_on(today),
      daily_xp_cap:   DAILY_XP_CAP,
      plan:           progress.plan,
      total_actions:  progress.total_actions,
      total_journals: progress.total_journals,
    }
  }
}
