//! Clock and calendar-day resolution.
//!
//! "Today" is always a function of an instant and a caller-supplied offset in
//! minutes east of UTC. Nothing here reads the system clock except
//! [`SystemClock`].

use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::{Error, Result};

/// Largest accepted offset magnitude, in minutes (UTC-14:00 .. UTC+14:00).
pub const MAX_OFFSET_MINUTES: i32 = 14 * 60;

// ─── Clock ───────────────────────────────────────────────────────────────────

/// Source of the current instant.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
  now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
  pub fn new(now: DateTime<Utc>) -> Self { Self { now: Mutex::new(now) } }

  pub fn set(&self, now: DateTime<Utc>) {
    *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
  }

  pub fn advance(&self, by: Duration) {
    let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
    *now += by;
  }
}

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> {
    *self.now.lock().unwrap_or_else(|e| e.into_inner())
  }
}

// ─── Day window ──────────────────────────────────────────────────────────────

/// A local calendar day and the half-open UTC range `[start, end)` it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayWindow {
  pub day:   NaiveDate,
  pub start: DateTime<Utc>,
  pub end:   DateTime<Utc>,
}

impl DayWindow {
  /// The UTC day containing `now`.
  pub fn utc(now: DateTime<Utc>) -> Self {
    let day = now.date_naive();
    let start = Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN));
    Self { day, start, end: start + Duration::days(1) }
  }

  pub fn contains(&self, instant: DateTime<Utc>) -> bool {
    self.start <= instant && instant < self.end
  }

  pub fn yesterday(&self) -> NaiveDate { self.day - Duration::days(1) }
}

/// Resolve the local calendar day at `now` for a UTC offset of
/// `offset_minutes`, together with the UTC instants bounding that day.
pub fn resolve_day(now: DateTime<Utc>, offset_minutes: i32) -> Result<DayWindow> {
  validate_offset(offset_minutes)?;

  let offset = Duration::minutes(i64::from(offset_minutes));
  let day = (now + offset).date_naive();
  let local_midnight = day.and_time(NaiveTime::MIN);
  let start = Utc.from_utc_datetime(&(local_midnight - offset));

  Ok(DayWindow { day, start, end: start + Duration::days(1) })
}

pub fn validate_offset(offset_minutes: i32) -> Result<()> {
  if offset_minutes.abs() > MAX_OFFSET_MINUTES {
    return Err(Error::validation(format!(
      "timezone offset {offset_minutes} is outside ±{MAX_OFFSET_MINUTES} minutes"
    )));
  }
  Ok(())
}
