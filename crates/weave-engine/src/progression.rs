//! XP awards, profile reads and badge grants.

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use weave_core::{
  Result, UserId,
  action::ActionCompletion,
  badge::{BadgeTrigger, UserBadge, earned_codes},
  day::{Clock, DayWindow, resolve_day},
  guard::{self, BlockReason, GuardDecision, XpSource},
  progress::{AwardOutcome, ProfileView, apply_daily_cap, validate_amount},
  store::WellbeingStore,
};

use crate::Engine;

/// An XP award as requested by a client, before validation.
#[derive(Debug, Clone)]
pub struct AwardRequest {
  pub source:            String,
  pub amount:            i64,
  pub action_id:         Option<i64>,
  pub tz_offset_minutes: i32,
}

impl<S: WellbeingStore, C: Clock> Engine<S, C> {
  /// Grant XP to `user` subject to the daily guards and the daily cap.
  ///
  /// Blocked attempts return an outcome with `blocked: true` and change
  /// nothing.
  pub async fn award_xp(&self, user: UserId, req: AwardRequest) -> Result<AwardOutcome> {
    let amount = validate_amount(req.amount)?;
    let source: XpSource = req.source.parse()?;
    self.award(user, source, amount, req.action_id, req.tz_offset_minutes).await
  }

  /// Typed award entry point shared with the journal flow.
  pub(crate) async fn award(
    &self,
    user: UserId,
    source: XpSource,
    amount: u32,
    action_id: Option<i64>,
    tz_offset_minutes: i32,
  ) -> Result<AwardOutcome> {
    let now = self.now();
    let window = resolve_day(now, tz_offset_minutes)?;

    let _guard = self.locks.lock(user).await;
    self.award_locked(user, source, amount, action_id, &window, now).await
  }

  async fn award_locked(
    &self,
    user: UserId,
    source: XpSource,
    amount: u32,
    action_id: Option<i64>,
    window: &DayWindow,
    now: DateTime<Utc>,
  ) -> Result<AwardOutcome> {
    let today = window.day;
    let mut progress = self
      .store
      .ensure_progress(user)
      .await
      .map_err(Self::store_err("ensure_progress", user))?;

    let action_logged_today = match (source, action_id) {
      (XpSource::Action, Some(id)) => self
        .store
        .action_completed_between(user, id, window.start, window.end)
        .await
        .map_err(Self::store_err("action_completed_between", user))?,
      _ => false,
    };

    if let GuardDecision::Blocked(reason) =
      guard::evaluate(source, action_id, &progress, today, action_logged_today)
    {
      debug!(%user, %source, ?action_id, reason = reason.as_str(), "award blocked");
      return Ok(AwardOutcome::blocked(&progress, today));
    }

    let gained = apply_daily_cap(progress.daily_xp_on(today), amount);
    if gained == 0 {
      debug!(
        %user,
        %source,
        reason = BlockReason::DailyCapReached.as_str(),
        "award blocked"
      );
      return Ok(AwardOutcome::blocked(&progress, today));
    }

    progress.apply_award(source, gained, today);

    let completion = match (source, action_id) {
      (XpSource::Action, Some(action_id)) => Some(ActionCompletion {
        user_id: user,
        action_id,
        started_at: now,
        completed_at: now,
      }),
      _ => None,
    };

    self
      .store
      .commit_award(progress.clone(), completion)
      .await
      .map_err(Self::store_err("commit_award", user))?;

    info!(
      %user,
      %source,
      gained,
      total_xp = progress.xp,
      level = progress.level,
      streak_days = progress.streak_days,
      "xp awarded"
    );
    Ok(AwardOutcome::granted(&progress, gained))
  }

  /// Current progress as seen from the caller's local day.
  pub async fn profile(&self, user: UserId, tz_offset_minutes: i32) -> Result<ProfileView> {
    let window = resolve_day(self.now(), tz_offset_minutes)?;
    let progress = self
      .store
      .ensure_progress(user)
      .await
      .map_err(Self::store_err("ensure_progress", user))?;
    Ok(ProfileView::new(&progress, window.day))
  }

  /// Grant every badge whose threshold `user` now meets. Returns the codes
  /// granted by this call, which is empty when nothing new was earned.
  pub async fn evaluate_badges(&self, user: UserId, source: &str) -> Result<Vec<String>> {
    let trigger: BadgeTrigger = source.parse()?;

    let _guard = self.locks.lock(user).await;
    let progress = self
      .store
      .ensure_progress(user)
      .await
      .map_err(Self::store_err("ensure_progress", user))?;

    let candidates = earned_codes(trigger, &progress);
    if candidates.is_empty() {
      return Ok(Vec::new());
    }

    let catalog = self
      .store
      .badges_by_codes(candidates.iter().map(|c| (*c).to_owned()).collect())
      .await
      .map_err(Self::store_err("badges_by_codes", user))?;
    let held = self
      .store
      .user_badges(user)
      .await
      .map_err(Self::store_err("user_badges", user))?;

    let fresh: Vec<_> = catalog
      .into_iter()
      .filter(|b| !held.iter().any(|h| h.badge_id == b.id))
      .collect();
    if fresh.is_empty() {
      return Ok(Vec::new());
    }

    self
      .store
      .grant_badges(user, fresh.iter().map(|b| b.id).collect(), self.now())
      .await
      .map_err(Self::store_err("grant_badges", user))?;

    let codes: Vec<String> = fresh.into_iter().map(|b| b.code).collect();
    info!(%user, ?trigger, badges = ?codes, "badges granted");
    Ok(codes)
  }

  /// Badges held by `user`, oldest first.
  pub async fn list_badges(&self, user: UserId) -> Result<Vec<UserBadge>> {
    self
      .store
      .user_badges(user)
      .await
      .map_err(Self::store_err("user_badges", user))
  }
}
