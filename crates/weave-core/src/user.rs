//! The internal user identifier.
//!
//! Identity resolution happens outside the core; by the time a request reaches
//! any operation here it carries a resolved, stable numeric id.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable internal identifier of a user.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
  pub fn get(self) -> i64 { self.0 }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<i64> for UserId {
  fn from(id: i64) -> Self { Self(id) }
}
