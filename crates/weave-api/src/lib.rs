//! JSON REST API for Weave.
//!
//! Exposes an axum [`Router`] backed by a [`weave_engine::Engine`] over any
//! [`WellbeingStore`]. Every route requires HTTP Basic credentials; the
//! authenticated account decides which user the request acts for. TLS and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = weave_api::api_router(state);
//! ```

pub mod auth;
pub mod error;
pub mod extract;

mod actions;
mod badges;
mod journals;
mod moods;
mod stats;
mod xp;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use weave_core::store::WellbeingStore;
use weave_engine::Engine;

pub use auth::{Account, AuthConfig, CurrentUser};
pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub engine: Engine<S>,
  pub auth:   Arc<AuthConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self { Self { engine: self.engine.clone(), auth: Arc::clone(&self.auth) } }
}

/// `?tz_offset=<minutes east of UTC>`, accepted by every day-sensitive route.
#[derive(Debug, Default, Deserialize)]
pub struct OffsetParams {
  pub tz_offset: Option<i32>,
}

impl OffsetParams {
  pub fn minutes(&self) -> i32 { self.tz_offset.unwrap_or(0) }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: WellbeingStore + 'static,
{
  Router::new()
    // Progression
    .route("/xp/increment", post(xp::increment::<S>))
    .route("/stats/profile", get(stats::profile::<S>))
    .route("/stats/actions/completed/today", get(stats::completed_today::<S>))
    // Badges
    .route("/badges", get(badges::list::<S>))
    .route("/badges/check", post(badges::check::<S>))
    // Moods
    .route("/mood/submit", post(moods::submit::<S>))
    .route("/mood/analysis", get(moods::analysis::<S>))
    .route("/mood/{id}", get(moods::get_one::<S>))
    // Journals
    .route("/journals", post(journals::create::<S>))
    .route("/journals/by-date", get(journals::by_date::<S>))
    .route("/journals/{id}", get(journals::get_one::<S>))
    // Actions
    .route("/actions/recommended", get(actions::recommended::<S>))
    .with_state(state)
}
