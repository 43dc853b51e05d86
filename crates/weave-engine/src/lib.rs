//! Weave engine: the progression, mood, journal and badge operations composed
//! over a [`WellbeingStore`].
//!
//! The engine owns no storage of its own. It is constructed around an injected
//! store and clock, and serializes each user's read-modify-write sequences
//! through [`UserLocks`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use weave_core::{
  UserId,
  day::{Clock, SystemClock},
  store::WellbeingStore,
};

mod actions;
mod journal;
mod locks;
mod moods;
mod progression;

pub use locks::UserLocks;
pub use progression::AwardRequest;

/// Entry point for every user-facing operation.
pub struct Engine<S, C = SystemClock> {
  store: Arc<S>,
  clock: Arc<C>,
  locks: Arc<UserLocks>,
}

impl<S: WellbeingStore> Engine<S, SystemClock> {
  pub fn new(store: Arc<S>) -> Self { Self::with_clock(store, Arc::new(SystemClock)) }
}

impl<S: WellbeingStore, C: Clock> Engine<S, C> {
  pub fn with_clock(store: Arc<S>, clock: Arc<C>) -> Self {
    Self { store, clock, locks: Arc::new(UserLocks::new()) }
  }

  pub fn store(&self) -> &S { &self.store }

  fn now(&self) -> DateTime<Utc> { self.clock.now() }

  /// Closure mapping a backend error into [`weave_core::Error::Store`].
  fn store_err(
    op: &'static str,
    user: UserId,
  ) -> impl FnOnce(S::Error) -> weave_core::Error {
    move |e| weave_core::Error::store(op, user, e)
  }
}

impl<S, C> Clone for Engine<S, C> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      clock: Arc::clone(&self.clock),
      locks: Arc::clone(&self.locks),
    }
  }
}

#[cfg(test)]
mod tests;
