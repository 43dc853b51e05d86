//! [`SqliteStore`]: the SQLite implementation of [`WellbeingStore`].

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::OptionalExtension as _;

use weave_core::{
  UserId,
  action::{Action, ActionCompletion},
  badge::{Badge, UserBadge},
  journal::{JournalDraft, JournalEntry},
  mood::{EmotionTag, MoodRecord, NewMood},
  progress::UserProgress,
  store::WellbeingStore,
};

use crate::{
  Error, Result,
  encode::{
    JOURNAL_COLUMNS, MOOD_COLUMNS, PROGRESS_COLUMNS, RawAction, RawJournal, RawMood,
    RawProgress, RawUserBadge, encode_date, encode_dt,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Weave store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// `?, ?, ?` for an `IN (...)` list of `n` values.
fn placeholders(n: usize) -> String { vec!["?"; n].join(", ") }

// ─── WellbeingStore impl ─────────────────────────────────────────────────────

impl WellbeingStore for SqliteStore {
  type Error = Error;

  // ── Progress ──────────────────────────────────────────────────────────────

  async fn get_progress(&self, user: UserId) -> Result<Option<UserProgress>> {
    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {PROGRESS_COLUMNS} FROM user_progress WHERE user_id = ?1");
        let raw = conn
          .query_row(&sql, rusqlite::params![user.get()], RawProgress::from_row)
          .optional()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawProgress::into_progress).transpose()
  }

  async fn ensure_progress(&self, user: UserId) -> Result<UserProgress> {
    let now_str = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO user_progress (user_id, updated_at) VALUES (?1, ?2)",
          rusqlite::params![user.get(), now_str],
        )?;
        let sql = format!("SELECT {PROGRESS_COLUMNS} FROM user_progress WHERE user_id = ?1");
        let raw = conn.query_row(&sql, rusqlite::params![user.get()], RawProgress::from_row)?;
        Ok(raw)
      })
      .await?;

    raw.into_progress()
  }

  async fn commit_award(
    &self,
    progress: UserProgress,
    completion: Option<ActionCompletion>,
  ) -> Result<()> {
    let user_id           = progress.user_id.get();
    let daily_xp_date     = progress.daily_xp_date.map(encode_date);
    let last_mood         = progress.last_mood_xp_date.map(encode_date);
    let last_journal      = progress.last_journal_xp_date.map(encode_date);
    let last_checkin      = progress.last_checkin_date.map(encode_date);
    let plan              = progress.plan.as_str();
    let now_str           = encode_dt(Utc::now());
    let completion_values = completion.map(|c| {
      (c.action_id, encode_dt(c.started_at), encode_dt(c.completed_at))
    });

    let updated = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let n = tx.execute(
          "UPDATE user_progress SET
             xp = ?2, level = ?3, daily_xp = ?4, daily_xp_date = ?5,
             last_mood_xp_date = ?6, last_journal_xp_date = ?7,
             streak_days = ?8, last_checkin_date = ?9,
             total_actions = ?10, total_journals = ?11, plan = ?12, updated_at = ?13
           WHERE user_id = ?1",
          rusqlite::params![
            user_id,
            progress.xp,
            progress.level,
            progress.daily_xp,
            daily_xp_date,
            last_mood,
            last_journal,
            progress.streak_days,
            last_checkin,
            progress.total_actions,
            progress.total_journals,
            plan,
            now_str,
          ],
        )?;
        if n == 0 {
          return Ok(false);
        }

        if let Some((action_id, started_at, completed_at)) = completion_values {
          tx.execute(
            "INSERT INTO action_logs (user_id, action_id, started_at, completed_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![user_id, action_id, started_at, completed_at],
          )?;
        }

        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !updated {
      return Err(Error::ProgressMissing(user_id));
    }
    Ok(())
  }

  // ── Actions ───────────────────────────────────────────────────────────────

  async fn action_completed_between(
    &self,
    user: UserId,
    action_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
  ) -> Result<bool> {
    let start_str = encode_dt(start);
    let end_str   = encode_dt(end);

    let found = self
      .conn
      .call(move |conn| {
        let found = conn
          .query_row(
            "SELECT 1 FROM action_logs
             WHERE user_id = ?1 AND action_id = ?2
               AND completed_at >= ?3 AND completed_at < ?4
             LIMIT 1",
            rusqlite::params![user.get(), action_id, start_str, end_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        Ok(found)
      })
      .await?;

    Ok(found)
  }

  async fn completed_actions_between(
    &self,
    user: UserId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
  ) -> Result<Vec<i64>> {
    let start_str = encode_dt(start);
    let end_str   = encode_dt(end);

    let ids = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT action_id FROM action_logs
           WHERE user_id = ?1 AND completed_at >= ?2 AND completed_at < ?3
           ORDER BY action_id",
        )?;
        let ids = stmt
          .query_map(rusqlite::params![user.get(), start_str, end_str], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
      })
      .await?;

    Ok(ids)
  }

  async fn list_actions(&self, active_only: bool) -> Result<Vec<Action>> {
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT action_id, title, description, kind, duration_min, difficulty,
                  is_premium, is_active
           FROM actions
           WHERE ?1 = 0 OR is_active = 1
           ORDER BY action_id",
        )?;
        let raws = stmt
          .query_map(rusqlite::params![active_only], |row| {
            Ok(RawAction {
              action_id:    row.get(0)?,
              title:        row.get(1)?,
              description:  row.get(2)?,
              kind:         row.get(3)?,
              duration_min: row.get(4)?,
              difficulty:   row.get(5)?,
              is_premium:   row.get(6)?,
              is_active:    row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(raws)
      })
      .await?;

    raws.into_iter().map(RawAction::into_action).collect()
  }

  // ── Moods ─────────────────────────────────────────────────────────────────

  async fn get_mood(&self, user: UserId, mood_id: i64) -> Result<Option<MoodRecord>> {
    let raw = self
      .conn
      .call(move |conn| {
        let sql =
          format!("SELECT {MOOD_COLUMNS} FROM moods WHERE mood_id = ?1 AND user_id = ?2");
        let raw = conn
          .query_row(&sql, rusqlite::params![mood_id, user.get()], RawMood::from_row)
          .optional()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawMood::into_mood).transpose()
  }

  async fn upsert_mood(&self, input: NewMood) -> Result<MoodRecord> {
    let date_str        = encode_date(input.date);
    let recorded_at_str = encode_dt(input.recorded_at);

    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "INSERT INTO moods (user_id, date, recorded_at, main_valence, energy, trigger_type, note)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           ON CONFLICT (user_id, date) DO UPDATE SET
             main_valence = excluded.main_valence,
             energy       = excluded.energy,
             trigger_type = excluded.trigger_type,
             note         = excluded.note
           RETURNING {MOOD_COLUMNS}"
        );
        let raw = conn.query_row(
          &sql,
          rusqlite::params![
            input.user_id.get(),
            date_str,
            recorded_at_str,
            input.main_valence,
            input.energy,
            input.trigger_type,
            input.note,
          ],
          RawMood::from_row,
        )?;
        Ok(raw)
      })
      .await?;

    raw.into_mood()
  }

  async fn resolve_tags(&self, codes: Vec<String>) -> Result<Vec<EmotionTag>> {
    if codes.is_empty() {
      return Ok(Vec::new());
    }

    let tags = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT tag_id, code FROM emotion_tags WHERE code IN ({}) ORDER BY tag_id",
          placeholders(codes.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let tags = stmt
          .query_map(rusqlite::params_from_iter(codes.iter()), |row| {
            Ok(EmotionTag { id: row.get(0)?, code: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
      })
      .await?;

    Ok(tags)
  }

  async fn replace_mood_tags(&self, mood_id: i64, tag_ids: Vec<i64>) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM mood_emotion_tags WHERE mood_id = ?1",
          rusqlite::params![mood_id],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO mood_emotion_tags (mood_id, tag_id) VALUES (?1, ?2)",
          )?;
          for tag_id in &tag_ids {
            stmt.execute(rusqlite::params![mood_id, tag_id])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn moods_between(
    &self,
    user: UserId,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Vec<MoodRecord>> {
    let start_str = encode_date(start);
    let end_str   = encode_date(end);

    let raws = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {MOOD_COLUMNS} FROM moods
           WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
           ORDER BY date ASC, mood_id ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let raws = stmt
          .query_map(rusqlite::params![user.get(), start_str, end_str], RawMood::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(raws)
      })
      .await?;

    raws.into_iter().map(RawMood::into_mood).collect()
  }

  async fn tag_codes_for_moods(&self, mood_ids: Vec<i64>) -> Result<Vec<String>> {
    if mood_ids.is_empty() {
      return Ok(Vec::new());
    }

    let codes = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT t.code
           FROM mood_emotion_tags l
           JOIN emotion_tags t ON t.tag_id = l.tag_id
           WHERE l.mood_id IN ({})
           ORDER BY l.mood_id, l.rowid",
          placeholders(mood_ids.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let codes = stmt
          .query_map(rusqlite::params_from_iter(mood_ids.iter()), |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(codes)
      })
      .await?;

    Ok(codes)
  }

  // ── Journals ──────────────────────────────────────────────────────────────

  async fn insert_journal(&self, draft: JournalDraft) -> Result<JournalEntry> {
    let user_id        = draft.user_id.get();
    let date_str       = encode_date(draft.date);
    let created_at_str = encode_dt(draft.created_at);
    let content        = draft.content.clone();
    let kind           = draft.kind.clone();

    let journal_id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let n = tx.execute(
          "UPDATE user_progress
           SET total_journals = total_journals + 1, updated_at = ?2
           WHERE user_id = ?1",
          rusqlite::params![user_id, created_at_str],
        )?;
        if n == 0 {
          return Ok(None);
        }

        tx.execute(
          "INSERT INTO journal_entries (user_id, content, date, kind, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![user_id, content, date_str, kind, created_at_str],
        )?;
        let id = tx.last_insert_rowid();

        tx.commit()?;
        Ok(Some(id))
      })
      .await?
      .ok_or(Error::ProgressMissing(user_id))?;

    Ok(JournalEntry {
      id:         journal_id,
      user_id:    draft.user_id,
      content:    draft.content,
      date:       draft.date,
      kind:       draft.kind,
      created_at: draft.created_at,
    })
  }

  async fn journals_on(&self, user: UserId, date: NaiveDate) -> Result<Vec<JournalEntry>> {
    let date_str = encode_date(date);

    let raws = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {JOURNAL_COLUMNS} FROM journal_entries
           WHERE user_id = ?1 AND date = ?2
           ORDER BY created_at ASC, journal_id ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let raws = stmt
          .query_map(rusqlite::params![user.get(), date_str], RawJournal::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(raws)
      })
      .await?;

    raws.into_iter().map(RawJournal::into_entry).collect()
  }

  async fn get_journal(&self, user: UserId, journal_id: i64) -> Result<Option<JournalEntry>> {
    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {JOURNAL_COLUMNS} FROM journal_entries WHERE journal_id = ?1 AND user_id = ?2"
        );
        let raw = conn
          .query_row(&sql, rusqlite::params![journal_id, user.get()], RawJournal::from_row)
          .optional()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawJournal::into_entry).transpose()
  }

  // ── Badges ────────────────────────────────────────────────────────────────

  async fn badges_by_codes(&self, codes: Vec<String>) -> Result<Vec<Badge>> {
    if codes.is_empty() {
      return Ok(Vec::new());
    }

    let badges = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT badge_id, code FROM badges WHERE code IN ({}) ORDER BY badge_id",
          placeholders(codes.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let badges = stmt
          .query_map(rusqlite::params_from_iter(codes.iter()), |row| {
            Ok(Badge { id: row.get(0)?, code: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(badges)
      })
      .await?;

    Ok(badges)
  }

  async fn user_badges(&self, user: UserId) -> Result<Vec<UserBadge>> {
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT ub.user_id, ub.badge_id, b.code, ub.earned_at
           FROM user_badges ub
           JOIN badges b ON b.badge_id = ub.badge_id
           WHERE ub.user_id = ?1
           ORDER BY ub.earned_at ASC, ub.rowid ASC",
        )?;
        let raws = stmt
          .query_map(rusqlite::params![user.get()], |row| {
            Ok(RawUserBadge {
              user_id:   row.get(0)?,
              badge_id:  row.get(1)?,
              code:      row.get(2)?,
              earned_at: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(raws)
      })
      .await?;

    raws.into_iter().map(RawUserBadge::into_user_badge).collect()
  }

  async fn grant_badges(
    &self,
    user: UserId,
    badge_ids: Vec<i64>,
    earned_at: DateTime<Utc>,
  ) -> Result<()> {
    if badge_ids.is_empty() {
      return Ok(());
    }
    let at_str = encode_dt(earned_at);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO user_badges (user_id, badge_id, earned_at) VALUES (?1, ?2, ?3)",
          )?;
          for badge_id in &badge_ids {
            stmt.execute(rusqlite::params![user.get(), badge_id, at_str])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
