//! Tracked record
//!
//! Typed view of the JSON document stored in the remote table, plus the
//! mutations the page offers and the values derived from it at render time.
//!
//! "Taken today" is never stored: it is recomputed from `son_alinma` and the
//! current date, which gives the daily reset for free.

mod ops;
mod types;

pub use ops::{date_string, RecordError, WaterPortion};
pub use types::{Record, Vitamin, DATE_FORMAT, TIMESTAMP_FORMAT};
