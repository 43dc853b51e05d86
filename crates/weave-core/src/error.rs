//! Error types for `weave-core`.
//!
//! A guard-blocked award is not an error; it is reported through
//! [`crate::progress::AwardOutcome::blocked`].

use thiserror::Error;

use crate::UserId;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed input rejected before any mutation.
  #[error("validation error: {0}")]
  Validation(String),

  /// One or more emotion-tag codes have no dictionary entry.
  #[error("unknown tag code(s): {}", .0.join(", "))]
  UnknownTags(Vec<String>),

  #[error("{entity} {id} not found")]
  NotFound { entity: &'static str, id: i64 },

  /// The mood row was written but its tag links could not be synced. Retrying
  /// the same submission converges to the intended state.
  #[error("mood {mood_id} saved but tag sync failed: {source}")]
  Consistency {
    mood_id: i64,
    #[source]
    source:  BoxError,
  },

  /// The journal entry was written but awarding its XP failed. The entry
  /// must not be resubmitted.
  #[error("journal {journal_id} saved but its award failed: {source}")]
  JournalAward {
    journal_id: i64,
    #[source]
    source:     BoxError,
  },

  #[error("store error during {op} for user {user}: {source}")]
  Store {
    op:     &'static str,
    user:   UserId,
    #[source]
    source: BoxError,
  },
}

impl Error {
  pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }

  /// Wrap a backend error with the operation and user it happened under.
  pub fn store<E>(op: &'static str, user: UserId, source: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store { op, user, source: Box::new(source) }
  }

  /// `true` for errors caused by the caller's input.
  pub fn is_client_error(&self) -> bool {
    matches!(
      self,
      Self::Validation(_) | Self::UnknownTags(_) | Self::NotFound { .. }
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
