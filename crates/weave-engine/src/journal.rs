//! Journal writing and reads.

use chrono::NaiveDate;
use tracing::info;
use weave_core::{
  Error, Result, UserId,
  day::{Clock, resolve_day},
  guard::XpSource,
  journal::{JOURNAL_XP, JournalEntry, JournalReceipt, NewJournal},
  store::WellbeingStore,
};

use crate::Engine;

impl<S: WellbeingStore, C: Clock> Engine<S, C> {
  /// Store a journal entry, then try to award the daily journal XP. Only the
  /// first entry of a local day earns XP; later ones come back `blocked`.
  ///
  /// A failed award after the entry landed is reported as
  /// [`Error::JournalAward`] carrying the new entry's id.
  pub async fn record_journal(
    &self,
    user: UserId,
    input: NewJournal,
    tz_offset_minutes: i32,
  ) -> Result<JournalReceipt> {
    input.validate()?;
    let now = self.now();
    let window = resolve_day(now, tz_offset_minutes)?;

    let entry = {
      let _guard = self.locks.lock(user).await;
      self
        .store
        .ensure_progress(user)
        .await
        .map_err(Self::store_err("ensure_progress", user))?;
      self
        .store
        .insert_journal(input.into_entry(user, window.day, now))
        .await
        .map_err(Self::store_err("insert_journal", user))?
    };
    info!(%user, journal_id = entry.id, date = %entry.date, "journal recorded");

    let award = self
      .award(user, XpSource::Journal, JOURNAL_XP, None, tz_offset_minutes)
      .await
      .map_err(|e| Error::JournalAward { journal_id: entry.id, source: Box::new(e) })?;
    Ok(JournalReceipt { entry, award })
  }

  /// Entries `user` wrote for `date`, oldest first.
  pub async fn journals_on(&self, user: UserId, date: NaiveDate) -> Result<Vec<JournalEntry>> {
    self
      .store
      .journals_on(user, date)
      .await
      .map_err(Self::store_err("journals_on", user))
  }

  pub async fn get_journal(&self, user: UserId, journal_id: i64) -> Result<JournalEntry> {
    self
      .store
      .get_journal(user, journal_id)
      .await
      .map_err(Self::store_err("get_journal", user))?
      .ok_or(Error::NotFound { entity: "journal", id: journal_id })
  }
}
