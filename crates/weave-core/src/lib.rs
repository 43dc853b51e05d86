//! Core types and rules for the Weave progression & engagement ledger.
//!
//! This crate is deliberately free of HTTP and database dependencies. It holds
//! the pure rules (day resolution, levels, the daily cap, streaks, guards,
//! badge thresholds, mood analytics) and the [`store::WellbeingStore`] trait
//! that storage backends implement.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod action;
pub mod analytics;
pub mod badge;
pub mod day;
pub mod error;
pub mod guard;
pub mod journal;
pub mod mood;
pub mod progress;
pub mod store;
pub mod user;

pub use error::{Error, Result};
pub use user::UserId;
