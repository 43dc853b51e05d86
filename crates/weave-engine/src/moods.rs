//! Mood submission, lookup and analytics.

use tracing::info;
use weave_core::{
  Error, Result, UserId,
  analytics::{MoodAnalysis, RangeKey, summarize},
  day::{Clock, DayWindow},
  mood::{MoodDetail, MoodInput, MoodResult, missing_tag_codes},
  store::WellbeingStore,
};

use crate::Engine;

impl<S: WellbeingStore, C: Clock> Engine<S, C> {
  /// Record today's mood for `user`, replacing any earlier submission from the
  /// same UTC day together with its tag links.
  pub async fn submit_mood(&self, user: UserId, input: MoodInput) -> Result<MoodResult> {
    input.validate()?;
    let requested = input.tag_codes().to_vec();

    let _guard = self.locks.lock(user).await;
    let now = self.now();
    let today = DayWindow::utc(now).day;

    let tags = self
      .store
      .resolve_tags(requested.clone())
      .await
      .map_err(Self::store_err("resolve_tags", user))?;
    let missing = missing_tag_codes(&requested, &tags);
    if !missing.is_empty() {
      return Err(Error::UnknownTags(missing));
    }

    let mood = self
      .store
      .upsert_mood(input.into_new_mood(user, today, now))
      .await
      .map_err(Self::store_err("upsert_mood", user))?;

    let tag_ids = tags.iter().map(|t| t.id).collect();
    self
      .store
      .replace_mood_tags(mood.id, tag_ids)
      .await
      .map_err(|e| Error::Consistency { mood_id: mood.id, source: Box::new(e) })?;

    info!(%user, mood_id = mood.id, date = %mood.date, tags = requested.len(), "mood recorded");
    Ok(MoodResult {
      mood_id:      mood.id,
      date:         mood.date,
      main_valence: mood.main_valence,
      energy:       mood.energy,
      trigger_type: mood.trigger_type,
      note:         mood.note,
      tag_ids:      requested,
    })
  }

  pub async fn get_mood(&self, user: UserId, mood_id: i64) -> Result<MoodDetail> {
    let mood = self
      .store
      .get_mood(user, mood_id)
      .await
      .map_err(Self::store_err("get_mood", user))?
      .ok_or(Error::NotFound { entity: "mood", id: mood_id })?;
    let codes = self
      .store
      .tag_codes_for_moods(vec![mood.id])
      .await
      .map_err(Self::store_err("tag_codes_for_moods", user))?;
    Ok(MoodDetail::new(mood, codes))
  }

  /// Roll up `user`'s moods over `range` (`today`, `7d` or `30d`), anchored on
  /// the current UTC day.
  pub async fn analyze(&self, user: UserId, range: &str) -> Result<MoodAnalysis> {
    let range: RangeKey = range.parse()?;
    let today = DayWindow::utc(self.now()).day;
    let (start, end) = range.window(today);

    let moods = self
      .store
      .moods_between(user, start, end)
      .await
      .map_err(Self::store_err("moods_between", user))?;
    if moods.is_empty() {
      return Ok(MoodAnalysis::empty(range));
    }

    let codes = self
      .store
      .tag_codes_for_moods(moods.iter().map(|m| m.id).collect())
      .await
      .map_err(Self::store_err("tag_codes_for_moods", user))?;
    Ok(summarize(range, &moods, codes))
  }
}
