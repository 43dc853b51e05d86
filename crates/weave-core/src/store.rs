//! The `WellbeingStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `weave-store-sqlite`).
//! Higher layers (`weave-engine`, `weave-api`) depend on this abstraction, not
//! on any concrete backend.
//!
//! Every method is individually atomic. Methods documented as transactional
//! write several rows and must either apply all of them or none.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
  UserId,
  action::{Action, ActionCompletion},
  badge::{Badge, UserBadge},
  journal::{JournalDraft, JournalEntry},
  mood::{EmotionTag, MoodRecord, NewMood},
  progress::UserProgress,
};

/// Abstraction over a Weave storage backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait WellbeingStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Progress ──────────────────────────────────────────────────────────

  /// Retrieve a user's progress row. Returns `None` if none exists yet.
  fn get_progress(
    &self,
    user: UserId,
  ) -> impl Future<Output = Result<Option<UserProgress>, Self::Error>> + Send + '_;

  /// Insert the default progress row if absent and return the stored row.
  fn ensure_progress(
    &self,
    user: UserId,
  ) -> impl Future<Output = Result<UserProgress, Self::Error>> + Send + '_;

  /// Persist the outcome of an award. Transactional: the progress row and,
  /// when present, the completion row are written together.
  fn commit_award(
    &self,
    progress: UserProgress,
    completion: Option<ActionCompletion>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Actions ───────────────────────────────────────────────────────────

  /// Whether `(user, action_id)` has a completion with `completed_at` in
  /// `[start, end)`.
  fn action_completed_between(
    &self,
    user: UserId,
    action_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Action ids completed by `user` with `completed_at` in `[start, end)`.
  fn completed_actions_between(
    &self,
    user: UserId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<i64>, Self::Error>> + Send + '_;

  /// The action catalog, ordered by id.
  fn list_actions(
    &self,
    active_only: bool,
  ) -> impl Future<Output = Result<Vec<Action>, Self::Error>> + Send + '_;

  // ── Moods ─────────────────────────────────────────────────────────────

  /// A mood by id, scoped to its owner.
  fn get_mood(
    &self,
    user: UserId,
    mood_id: i64,
  ) -> impl Future<Output = Result<Option<MoodRecord>, Self::Error>> + Send + '_;

  /// Insert the mood for `(user, date)`, or overwrite the value fields of the
  /// existing one. `id`, `date` and `recorded_at` of an existing row are kept.
  fn upsert_mood(
    &self,
    input: NewMood,
  ) -> impl Future<Output = Result<MoodRecord, Self::Error>> + Send + '_;

  /// Dictionary entries matching any of `codes`. Unknown codes are simply
  /// absent from the result.
  fn resolve_tags(
    &self,
    codes: Vec<String>,
  ) -> impl Future<Output = Result<Vec<EmotionTag>, Self::Error>> + Send + '_;

  /// Replace every tag link of `mood_id` with `tag_ids`. Transactional.
  fn replace_mood_tags(
    &self,
    mood_id: i64,
    tag_ids: Vec<i64>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The user's moods with `start <= date <= end`, ascending by date.
  fn moods_between(
    &self,
    user: UserId,
    start: NaiveDate,
    end: NaiveDate,
  ) -> impl Future<Output = Result<Vec<MoodRecord>, Self::Error>> + Send + '_;

  /// One tag code per link of any of `mood_ids`, in mood then link order.
  fn tag_codes_for_moods(
    &self,
    mood_ids: Vec<i64>,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  // ── Journals ──────────────────────────────────────────────────────────

  /// Append a journal entry and bump the author's `total_journals` counter.
  /// Transactional; the progress row must already exist.
  fn insert_journal(
    &self,
    draft: JournalDraft,
  ) -> impl Future<Output = Result<JournalEntry, Self::Error>> + Send + '_;

  /// Entries dated `date`, in creation order.
  fn journals_on(
    &self,
    user: UserId,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<JournalEntry>, Self::Error>> + Send + '_;

  fn get_journal(
    &self,
    user: UserId,
    journal_id: i64,
  ) -> impl Future<Output = Result<Option<JournalEntry>, Self::Error>> + Send + '_;

  // ── Badges ────────────────────────────────────────────────────────────

  /// Catalog entries for the given codes.
  fn badges_by_codes(
    &self,
    codes: Vec<String>,
  ) -> impl Future<Output = Result<Vec<Badge>, Self::Error>> + Send + '_;

  /// Badges held by `user`, oldest grant first.
  fn user_badges(
    &self,
    user: UserId,
  ) -> impl Future<Output = Result<Vec<UserBadge>, Self::Error>> + Send + '_;

  /// Grant `badge_ids` to `user`. Already-held badges are left untouched.
  fn grant_badges(
    &self,
    user: UserId,
    badge_ids: Vec<i64>,
    earned_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
