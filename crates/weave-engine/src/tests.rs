//! Engine behaviour over an in-memory SQLite store and a fixed clock.

use std::sync::{
  Arc,
  atomic::{AtomicBool, Ordering},
};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use weave_core::{
  Error, UserId,
  action::{Action, ActionCompletion},
  analytics::{SummaryLabel, TagCount},
  badge::{Badge, UserBadge},
  day::FixedClock,
  journal::{JournalDraft, JournalEntry, NewJournal},
  mood::{EmotionTag, MoodInput, MoodRecord, NewMood},
  progress::{DAILY_XP_CAP, UserProgress},
  store::WellbeingStore,
};
use weave_store_sqlite::SqliteStore;

use crate::{AwardRequest, Engine};

const ALICE: UserId = UserId(1);
const BOB: UserId = UserId(2);

fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap() }

async fn engine() -> (Engine<SqliteStore, FixedClock>, Arc<FixedClock>) {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  let clock = Arc::new(FixedClock::new(t0()));
  (Engine::with_clock(Arc::new(store), Arc::clone(&clock)), clock)
}

fn req(source: &str, amount: i64) -> AwardRequest {
  AwardRequest { source: source.into(), amount, action_id: None, tz_offset_minutes: 0 }
}

fn action(id: i64, amount: i64) -> AwardRequest {
  AwardRequest { action_id: Some(id), ..req("action", amount) }
}

fn mood(valence: i32, energy: i32, tags: &[&str]) -> MoodInput {
  MoodInput {
    main_valence: valence,
    energy,
    tag_ids: Some(tags.iter().map(|t| (*t).to_owned()).collect()),
    trigger_type: Some("work".into()),
    note: None,
  }
}

fn journal(content: &str) -> NewJournal {
  NewJournal { content: content.into(), date: None, kind: None }
}

// ─── Awards ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_award_creates_progress() {
  let (e, _) = engine().await;
  let out = e.award_xp(ALICE, req("mood", 20)).await.unwrap();

  assert!(!out.blocked);
  assert_eq!(out.gained_xp, 20);
  assert_eq!(out.total_xp, 20);
  assert_eq!(out.level, 1);
  assert_eq!(out.streak_days, 1);
  assert_eq!(out.daily_xp, 20);
}

#[tokio::test]
async fn same_source_twice_a_day_is_blocked_without_mutation() {
  let (e, _) = engine().await;
  e.award_xp(ALICE, req("mood", 20)).await.unwrap();
  let before = e.store().get_progress(ALICE).await.unwrap();

  let out = e.award_xp(ALICE, req("MOOD", 20)).await.unwrap();
  assert!(out.blocked);
  assert_eq!(out.gained_xp, 0);
  assert_eq!(out.total_xp, 20);
  assert_eq!(e.store().get_progress(ALICE).await.unwrap(), before);
}

#[tokio::test]
async fn journal_and_journals_share_a_guard() {
  let (e, _) = engine().await;
  assert!(!e.award_xp(ALICE, req("journal", 10)).await.unwrap().blocked);
  assert!(e.award_xp(ALICE, req("Journals", 10)).await.unwrap().blocked);
}

#[tokio::test]
async fn cap_grants_only_the_remainder() {
  let (e, _) = engine().await;
  e.award_xp(ALICE, action(1, 100)).await.unwrap();
  e.award_xp(ALICE, action(2, 40)).await.unwrap();

  let out = e.award_xp(ALICE, action(3, 50)).await.unwrap();
  assert!(!out.blocked);
  assert_eq!(out.gained_xp, 10);
  assert_eq!(out.daily_xp, DAILY_XP_CAP);
  assert_eq!(out.total_xp, 150);
  assert_eq!(out.level, 2);

  // Exhausted: blocked, and no completion is logged for the attempt.
  let out = e.award_xp(ALICE, action(4, 5)).await.unwrap();
  assert!(out.blocked);
  assert_eq!(out.daily_xp, DAILY_XP_CAP);
  assert_eq!(e.completed_actions_today(ALICE, 0).await.unwrap(), vec![1, 2, 3]);
}

#[tokio::test]
async fn cap_resets_on_the_next_day() {
  let (e, clock) = engine().await;
  e.award_xp(ALICE, action(1, 150)).await.unwrap();
  assert!(e.award_xp(ALICE, req("mood", 10)).await.unwrap().blocked);

  clock.advance(Duration::days(1));
  let out = e.award_xp(ALICE, req("mood", 10)).await.unwrap();
  assert!(!out.blocked);
  assert_eq!(out.daily_xp, 10);
  assert_eq!(out.total_xp, 160);
}

#[tokio::test]
async fn action_ids_earn_once_per_day_each() {
  let (e, clock) = engine().await;
  assert!(!e.award_xp(ALICE, action(1, 10)).await.unwrap().blocked);
  assert!(e.award_xp(ALICE, action(1, 10)).await.unwrap().blocked);
  assert!(!e.award_xp(ALICE, action(2, 10)).await.unwrap().blocked);

  // Another user is unaffected.
  assert!(!e.award_xp(BOB, action(1, 10)).await.unwrap().blocked);

  clock.advance(Duration::days(1));
  assert!(!e.award_xp(ALICE, action(1, 10)).await.unwrap().blocked);
}

#[tokio::test]
async fn action_without_id_is_blocked() {
  let (e, _) = engine().await;
  let out = e.award_xp(ALICE, req("action", 10)).await.unwrap();
  assert!(out.blocked);
  assert_eq!(out.total_xp, 0);
}

#[tokio::test]
async fn action_day_follows_the_callers_offset() {
  let (e, clock) = engine().await;
  // 23:30 UTC is already the next day at UTC+01:00.
  clock.set(Utc.with_ymd_and_hms(2024, 5, 10, 23, 30, 0).unwrap());
  let mut late = action(1, 10);
  late.tz_offset_minutes = 60;
  assert!(!e.award_xp(ALICE, late.clone()).await.unwrap().blocked);

  // 00:10 UTC on the 11th is still the 11th at +01:00: same local day.
  clock.set(Utc.with_ymd_and_hms(2024, 5, 11, 0, 10, 0).unwrap());
  assert!(e.award_xp(ALICE, late).await.unwrap().blocked);
}

#[tokio::test]
async fn invalid_requests_are_rejected_before_mutation() {
  let (e, _) = engine().await;
  for bad in [req("mood", 0), req("mood", -5), req("sleep", 10)] {
    let err = e.award_xp(ALICE, bad).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "{err}");
  }
  let mut far = req("mood", 10);
  far.tz_offset_minutes = 15 * 60;
  assert!(matches!(e.award_xp(ALICE, far).await, Err(Error::Validation(_))));

  assert!(e.store().get_progress(ALICE).await.unwrap().is_none());
}

#[tokio::test]
async fn streak_continues_resets_and_holds() {
  let (e, clock) = engine().await;
  assert_eq!(e.award_xp(ALICE, req("mood", 5)).await.unwrap().streak_days, 1);

  // Same day, another source: unchanged.
  assert_eq!(e.award_xp(ALICE, req("journal", 5)).await.unwrap().streak_days, 1);

  clock.advance(Duration::days(1));
  assert_eq!(e.award_xp(ALICE, req("mood", 5)).await.unwrap().streak_days, 2);

  clock.advance(Duration::days(3));
  assert_eq!(e.award_xp(ALICE, req("mood", 5)).await.unwrap().streak_days, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_awards_never_exceed_the_cap() {
  let (e, _) = engine().await;

  let tasks: Vec<_> = (1..=12)
    .map(|id| {
      let e = e.clone();
      tokio::spawn(async move { e.award_xp(ALICE, action(id, 40)).await })
    })
    .collect();

  let mut granted = 0;
  for t in tasks {
    granted += t.await.unwrap().unwrap().gained_xp;
  }

  assert_eq!(granted, DAILY_XP_CAP);
  let p = e.store().get_progress(ALICE).await.unwrap().unwrap();
  assert_eq!(p.daily_xp, DAILY_XP_CAP);
  assert_eq!(p.xp, DAILY_XP_CAP);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_same_source_awards_grant_once() {
  let (e, _) = engine().await;

  let tasks: Vec<_> = (0..8)
    .map(|_| {
      let e = e.clone();
      tokio::spawn(async move { e.award_xp(ALICE, req("mood", 10)).await })
    })
    .collect();

  let mut successes = 0;
  for t in tasks {
    if !t.await.unwrap().unwrap().blocked {
      successes += 1;
    }
  }
  assert_eq!(successes, 1);
}

// ─── Profile ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn profile_reports_effective_daily_xp() {
  let (e, clock) = engine().await;
  let fresh = e.profile(ALICE, 0).await.unwrap();
  assert_eq!(fresh.level, 1);
  assert_eq!(fresh.daily_xp_cap, DAILY_XP_CAP);

  e.award_xp(ALICE, action(1, 30)).await.unwrap();
  let p = e.profile(ALICE, 0).await.unwrap();
  assert_eq!(p.daily_xp, 30);
  assert_eq!(p.total_actions, 1);

  clock.advance(Duration::days(1));
  let p = e.profile(ALICE, 0).await.unwrap();
  assert_eq!(p.daily_xp, 0);
  assert_eq!(p.xp, 30);
}

// ─── Badges ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn rookie_badge_after_five_actions_granted_once() {
  let (e, _) = engine().await;
  for id in 1..=4 {
    e.award_xp(ALICE, action(id, 1)).await.unwrap();
  }
  assert!(e.evaluate_badges(ALICE, "action").await.unwrap().is_empty());

  e.award_xp(ALICE, action(5, 1)).await.unwrap();
  assert_eq!(e.evaluate_badges(ALICE, "action").await.unwrap(), ["calmdown_rookie"]);
  assert!(e.evaluate_badges(ALICE, "action").await.unwrap().is_empty());

  let held = e.list_badges(ALICE).await.unwrap();
  assert_eq!(held.len(), 1);
  assert_eq!(held[0].code, "calmdown_rookie");
  assert_eq!(held[0].earned_at, t0());
}

#[tokio::test]
async fn streak_badge_after_seven_days() {
  let (e, clock) = engine().await;
  for _ in 0..7 {
    e.award_xp(ALICE, req("mood", 5)).await.unwrap();
    clock.advance(Duration::days(1));
  }
  assert_eq!(e.evaluate_badges(ALICE, "badge").await.unwrap(), ["streak_7"]);
}

#[tokio::test]
async fn journal_badge_counts_entries_not_awards() {
  let (e, _) = engine().await;
  for i in 0..5 {
    e.record_journal(ALICE, journal(&format!("entry {i}")), 0).await.unwrap();
  }
  assert!(e.evaluate_badges(ALICE, "mood").await.unwrap().is_empty());
  assert_eq!(e.evaluate_badges(ALICE, "journals").await.unwrap(), ["journal_starter"]);
}

#[tokio::test]
async fn unknown_badge_source_is_invalid() {
  let (e, _) = engine().await;
  assert!(matches!(e.evaluate_badges(ALICE, "sleep").await, Err(Error::Validation(_))));
}

// ─── Moods ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn second_submission_same_day_updates_in_place() {
  let (e, _) = engine().await;
  let first = e.submit_mood(ALICE, mood(1, 3, &["calm", "sad"])).await.unwrap();
  let second = e.submit_mood(ALICE, mood(-1, 2, &["joy"])).await.unwrap();

  assert_eq!(first.mood_id, second.mood_id);
  assert_eq!(second.tag_ids, ["joy"]);

  let detail = e.get_mood(ALICE, second.mood_id).await.unwrap();
  assert_eq!(detail.main_valence, -1);
  assert_eq!(detail.energy, 2);
  assert_eq!(detail.tag_ids, ["joy"]);
}

#[tokio::test]
async fn unknown_tag_rejects_without_mutation() {
  let (e, _) = engine().await;
  let saved = e.submit_mood(ALICE, mood(1, 3, &["calm"])).await.unwrap();

  let err = e.submit_mood(ALICE, mood(-2, 5, &["calm", "melancholy"])).await.unwrap_err();
  match err {
    Error::UnknownTags(missing) => assert_eq!(missing, ["melancholy"]),
    other => panic!("unexpected error: {other}"),
  }

  let detail = e.get_mood(ALICE, saved.mood_id).await.unwrap();
  assert_eq!(detail.main_valence, 1);
  assert_eq!(detail.tag_ids, ["calm"]);
}

#[tokio::test]
async fn invalid_mood_values_are_rejected() {
  let (e, _) = engine().await;
  for bad in [mood(3, 3, &[]), mood(0, 0, &[]), mood(0, 6, &[]), mood(0, 3, &[" "])] {
    assert!(matches!(e.submit_mood(ALICE, bad).await, Err(Error::Validation(_))));
  }
  let mut long = mood(0, 3, &[]);
  long.note = Some("x".repeat(201));
  assert!(matches!(e.submit_mood(ALICE, long).await, Err(Error::Validation(_))));
}

#[tokio::test]
async fn moods_are_private_to_their_owner() {
  let (e, _) = engine().await;
  let m = e.submit_mood(ALICE, mood(1, 3, &[])).await.unwrap();
  assert!(matches!(
    e.get_mood(BOB, m.mood_id).await,
    Err(Error::NotFound { entity: "mood", .. })
  ));
}

#[tokio::test]
async fn submitting_a_mood_does_not_award_xp() {
  let (e, _) = engine().await;
  e.submit_mood(ALICE, mood(1, 3, &[])).await.unwrap();
  assert!(e.store().get_progress(ALICE).await.unwrap().is_none());
}

// ─── Analytics ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn analysis_of_nothing_is_neutral() {
  let (e, _) = engine().await;
  let a = e.analyze(ALICE, "today").await.unwrap();
  assert_eq!(a.summary.label, SummaryLabel::Neutral);
  assert_eq!(a.summary.main_valence, 0);
  assert!(a.points.is_empty());
  assert!(a.tags_summary.is_empty());
  assert!(a.today_mood.is_none());
}

#[tokio::test]
async fn anxious_day_end_to_end() {
  let (e, _) = engine().await;
  let saved = e.submit_mood(ALICE, mood(-2, 4, &["anxious"])).await.unwrap();

  let a = e.analyze(ALICE, "today").await.unwrap();
  assert_eq!(a.summary.label, SummaryLabel::LowValenceHighEnergy);
  assert_eq!(a.tags_summary, vec![TagCount { code: "anxious".into(), count: 1 }]);
  assert_eq!(a.today_mood.unwrap().mood_id, saved.mood_id);
}

#[tokio::test]
async fn seven_day_window_spans_days() {
  let (e, clock) = engine().await;
  e.submit_mood(ALICE, mood(2, 5, &["joy"])).await.unwrap();
  clock.advance(Duration::days(3));
  e.submit_mood(ALICE, mood(-1, 1, &["joy", "tired"])).await.unwrap();

  let week = e.analyze(ALICE, "7d").await.unwrap();
  assert_eq!(week.points.len(), 2);
  assert_eq!(week.summary.label, SummaryLabel::LowValenceLowEnergy);
  assert!(week.today_mood.is_none());
  assert_eq!(week.tags_summary, vec![
    TagCount { code: "joy".into(), count: 2 },
    TagCount { code: "tired".into(), count: 1 },
  ]);

  clock.advance(Duration::days(5));
  let later = e.analyze(ALICE, "7d").await.unwrap();
  assert_eq!(later.points.len(), 1);

  assert!(matches!(e.analyze(ALICE, "1y").await, Err(Error::Validation(_))));
}

// ─── Journals ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn only_the_first_journal_of_a_day_earns_xp() {
  let (e, clock) = engine().await;
  let first = e.record_journal(ALICE, journal("morning"), 0).await.unwrap();
  assert!(!first.award.blocked);
  assert_eq!(first.award.gained_xp, 10);

  let second = e.record_journal(ALICE, journal("evening"), 0).await.unwrap();
  assert!(second.award.blocked);
  assert_eq!(second.award.total_xp, 10);

  let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
  let entries = e.journals_on(ALICE, today).await.unwrap();
  assert_eq!(entries.len(), 2);
  assert_eq!(e.profile(ALICE, 0).await.unwrap().total_journals, 2);

  clock.advance(Duration::days(1));
  assert!(!e.record_journal(ALICE, journal("next"), 0).await.unwrap().award.blocked);
}

#[tokio::test]
async fn journal_lookup_is_scoped() {
  let (e, _) = engine().await;
  let r = e.record_journal(ALICE, journal("mine"), 0).await.unwrap();
  assert_eq!(e.get_journal(ALICE, r.entry.id).await.unwrap().content, "mine");
  assert!(matches!(e.get_journal(BOB, r.entry.id).await, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn blank_journal_is_rejected() {
  let (e, _) = engine().await;
  assert!(matches!(
    e.record_journal(ALICE, journal("   "), 0).await,
    Err(Error::Validation(_))
  ));
  assert!(e.store().get_progress(ALICE).await.unwrap().is_none());
}

// ─── Actions ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn recommended_actions_lists_active_catalog() {
  let (e, _) = engine().await;
  let actions = e.recommended_actions(ALICE).await.unwrap();
  assert_eq!(actions.len(), 1);
  assert_eq!(actions[0].title, "Take 3 deep breaths");
}

// ─── Partial failures ────────────────────────────────────────────────────────

/// A SQLite store whose tag sync and award commit can be made to fail.
struct FlakyStore {
  inner:       SqliteStore,
  fail_tags:   AtomicBool,
  fail_awards: AtomicBool,
}

/// No emotion tag carries this id.
const MISSING_TAG: i64 = 9_999;

impl WellbeingStore for FlakyStore {
  type Error = weave_store_sqlite::Error;

  async fn get_progress(&self, user: UserId) -> Result<Option<UserProgress>, Self::Error> {
    self.inner.get_progress(user).await
  }

  async fn ensure_progress(&self, user: UserId) -> Result<UserProgress, Self::Error> {
    self.inner.ensure_progress(user).await
  }

  async fn commit_award(
    &self,
    progress: UserProgress,
    completion: Option<ActionCompletion>,
  ) -> Result<(), Self::Error> {
    if self.fail_awards.load(Ordering::SeqCst) {
      return Err(weave_store_sqlite::Error::ProgressMissing(progress.user_id.get()));
    }
    self.inner.commit_award(progress, completion).await
  }

  async fn action_completed_between(
    &self,
    user: UserId,
    action_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
  ) -> Result<bool, Self::Error> {
    self.inner.action_completed_between(user, action_id, start, end).await
  }

  async fn completed_actions_between(
    &self,
    user: UserId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
  ) -> Result<Vec<i64>, Self::Error> {
    self.inner.completed_actions_between(user, start, end).await
  }

  async fn list_actions(&self, active_only: bool) -> Result<Vec<Action>, Self::Error> {
    self.inner.list_actions(active_only).await
  }

  async fn get_mood(&self, user: UserId, mood_id: i64) -> Result<Option<MoodRecord>, Self::Error> {
    self.inner.get_mood(user, mood_id).await
  }

  async fn upsert_mood(&self, input: NewMood) -> Result<MoodRecord, Self::Error> {
    self.inner.upsert_mood(input).await
  }

  async fn resolve_tags(&self, codes: Vec<String>) -> Result<Vec<EmotionTag>, Self::Error> {
    self.inner.resolve_tags(codes).await
  }

  async fn replace_mood_tags(&self, mood_id: i64, mut tag_ids: Vec<i64>) -> Result<(), Self::Error> {
    if self.fail_tags.load(Ordering::SeqCst) {
      tag_ids.push(MISSING_TAG);
    }
    self.inner.replace_mood_tags(mood_id, tag_ids).await
  }

  async fn moods_between(
    &self,
    user: UserId,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Vec<MoodRecord>, Self::Error> {
    self.inner.moods_between(user, start, end).await
  }

  async fn tag_codes_for_moods(&self, mood_ids: Vec<i64>) -> Result<Vec<String>, Self::Error> {
    self.inner.tag_codes_for_moods(mood_ids).await
  }

  async fn insert_journal(&self, draft: JournalDraft) -> Result<JournalEntry, Self::Error> {
    self.inner.insert_journal(draft).await
  }

  async fn journals_on(
    &self,
    user: UserId,
    date: NaiveDate,
  ) -> Result<Vec<JournalEntry>, Self::Error> {
    self.inner.journals_on(user, date).await
  }

  async fn get_journal(
    &self,
    user: UserId,
    journal_id: i64,
  ) -> Result<Option<JournalEntry>, Self::Error> {
    self.inner.get_journal(user, journal_id).await
  }

  async fn badges_by_codes(&self, codes: Vec<String>) -> Result<Vec<Badge>, Self::Error> {
    self.inner.badges_by_codes(codes).await
  }

  async fn user_badges(&self, user: UserId) -> Result<Vec<UserBadge>, Self::Error> {
    self.inner.user_badges(user).await
  }

  async fn grant_badges(
    &self,
    user: UserId,
    badge_ids: Vec<i64>,
    earned_at: DateTime<Utc>,
  ) -> Result<(), Self::Error> {
    self.inner.grant_badges(user, badge_ids, earned_at).await
  }
}

async fn flaky_engine() -> Engine<FlakyStore, FixedClock> {
  let store = FlakyStore {
    inner:       SqliteStore::open_in_memory().await.expect("in-memory store"),
    fail_tags:   AtomicBool::new(false),
    fail_awards: AtomicBool::new(false),
  };
  Engine::with_clock(Arc::new(store), Arc::new(FixedClock::new(t0())))
}

#[tokio::test]
async fn failed_tag_sync_reports_the_saved_mood() {
  let e = flaky_engine().await;
  let first = e.submit_mood(ALICE, mood(1, 3, &["calm", "sad"])).await.unwrap();

  e.store().fail_tags.store(true, Ordering::SeqCst);
  let err = e.submit_mood(ALICE, mood(-2, 4, &["anxious"])).await.unwrap_err();
  match err {
    Error::Consistency { mood_id, .. } => assert_eq!(mood_id, first.mood_id),
    other => panic!("unexpected error: {other}"),
  }

  // The row took the new values; the links stayed as they were.
  let detail = e.get_mood(ALICE, first.mood_id).await.unwrap();
  assert_eq!(detail.main_valence, -2);
  assert_eq!(detail.tag_ids, ["calm", "sad"]);

  e.store().fail_tags.store(false, Ordering::SeqCst);
  let retried = e.submit_mood(ALICE, mood(-2, 4, &["anxious"])).await.unwrap();
  assert_eq!(retried.mood_id, first.mood_id);
  let detail = e.get_mood(ALICE, first.mood_id).await.unwrap();
  assert_eq!(detail.main_valence, -2);
  assert_eq!(detail.tag_ids, ["anxious"]);
}

#[tokio::test]
async fn failed_journal_award_reports_the_stored_entry() {
  let e = flaky_engine().await;
  e.store().fail_awards.store(true, Ordering::SeqCst);

  let err = e.record_journal(ALICE, journal("kept"), 0).await.unwrap_err();
  let journal_id = match err {
    Error::JournalAward { journal_id, .. } => journal_id,
    other => panic!("unexpected error: {other}"),
  };

  assert_eq!(e.get_journal(ALICE, journal_id).await.unwrap().content, "kept");
  let progress = e.store().get_progress(ALICE).await.unwrap().unwrap();
  assert_eq!(progress.total_journals, 1);
  assert_eq!(progress.xp, 0);
}
