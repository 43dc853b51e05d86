//! Journal entries. Append-only; a user may write several per day.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, UserId, progress::AwardOutcome};

/// XP requested for the first journal entry of a day.
pub const JOURNAL_XP: u32 = 10;

pub const MAX_CONTENT_CHARS: usize = 5_000;

pub const DEFAULT_KIND: &str = "free";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
  pub id:         i64,
  pub user_id:    UserId,
  pub content:    String,
  pub date:       NaiveDate,
  #[serde(rename = "type")]
  pub kind:       String,
  pub created_at: DateTime<Utc>,
}

/// A journal entry as received from a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewJournal {
  pub content: String,
  /// The day the entry belongs to; defaults to the caller's today.
  pub date:    Option<NaiveDate>,
  #[serde(rename = "type")]
  pub kind:    Option<String>,
}

impl NewJournal {
  pub fn validate(&self) -> Result<()> {
    if self.content.trim().is_empty() {
      return Err(Error::validation("journal content must not be empty"));
    }
    if self.content.chars().count() > MAX_CONTENT_CHARS {
      return Err(Error::validation(format!(
        "journal content must be at most {MAX_CONTENT_CHARS} characters"
      )));
    }
    Ok(())
  }

  pub fn into_entry(
    self,
    user_id: UserId,
    today: NaiveDate,
    created_at: DateTime<Utc>,
  ) -> JournalDraft {
    JournalDraft {
      user_id,
      content: self.content,
      date: self.date.unwrap_or(today),
      kind: self
        .kind
        .filter(|k| !k.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_KIND.to_owned()),
      created_at,
    }
  }
}

/// Input to [`crate::store::WellbeingStore::insert_journal`].
#[derive(Debug, Clone)]
pub struct JournalDraft {
  pub user_id:    UserId,
  pub content:    String,
  pub date:       NaiveDate,
  pub kind:       String,
  pub created_at: DateTime<Utc>,
}

/// A stored entry and the XP outcome of writing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalReceipt {
  pub entry: JournalEntry,
  pub award: AwardOutcome,
}
