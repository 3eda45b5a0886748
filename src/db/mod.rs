//! Database access, grouped by table.

pub mod categories;
pub mod favorites;
pub mod settings;
pub mod stats;
pub mod users;
pub mod videos;

use chrono::{NaiveDateTime, Utc};

pub(crate) fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}
