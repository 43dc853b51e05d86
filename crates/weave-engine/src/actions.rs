//! Action catalog reads.

use weave_core::{
  Result, UserId,
  action::Action,
  day::{Clock, resolve_day},
  store::WellbeingStore,
};

use crate::Engine;

impl<S: WellbeingStore, C: Clock> Engine<S, C> {
  /// Active catalog actions, by id. `user` is the caller, kept for error context.
  pub async fn recommended_actions(&self, user: UserId) -> Result<Vec<Action>> {
    self
      .store
      .list_actions(true)
      .await
      .map_err(Self::store_err("list_actions", user))
  }

  /// Ids of the actions `user` completed during their current local day.
  pub async fn completed_actions_today(
    &self,
    user: UserId,
    tz_offset_minutes: i32,
  ) -> Result<Vec<i64>> {
    let window = resolve_day(self.now(), tz_offset_minutes)?;
    self
      .store
      .completed_actions_between(user, window.start, window.end)
      .await
      .map_err(Self::store_err("completed_actions_between", user))
  }
}
