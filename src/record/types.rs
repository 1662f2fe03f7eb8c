//! Record types
//!
//! The single JSON document kept in the `data` column of the store:
//! - `Record`: water counters, reminder marker and the vitamin schedule
//! - `Vitamin`: one scheduled vitamin and the last day it was taken
//!
//! Field names on the wire are the ones already stored in the table, so the
//! structs rename them. Keys this program does not know about are kept in
//! `extra` and written back untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Format of `son_su_zamani`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format of `son_alinma` and of "today" when deciding whether a vitamin was taken
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The tracked state for the one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    /// Water consumed in the current period (ml)
    #[serde(rename = "su_icilen")]
    pub water_consumed_ml: i64,

    /// Daily water target (ml)
    #[serde(rename = "su_hedef")]
    pub water_target_ml: i64,

    /// Local time of the last logged drink
    #[serde(rename = "son_su_zamani", default, skip_serializing_if = "Option::is_none")]
    pub last_water_at: Option<String>,

    /// Unix seconds of the last reminder reset
    #[serde(
        rename = "hatirlatici_referans",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reminder_reference: Option<f64>,

    /// The day's vitamin schedule, in display order
    #[serde(rename = "vitaminler", default)]
    pub vitamins: Vec<Vitamin>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the vitamin schedule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vitamin {
    #[serde(rename = "isim")]
    pub name: String,

    /// Scheduled time as entered by the user (e.g. "09:00")
    #[serde(rename = "saat", default)]
    pub scheduled_at: String,

    /// Date string of the last day this vitamin was taken
    #[serde(rename = "son_alinma", default, skip_serializing_if = "Option::is_none")]
    pub last_taken_on: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Create a record with a target and no history
    pub fn new(water_target_ml: i64) -> Self {
        Self {
            water_consumed_ml: 0,
            water_target_ml,
            last_water_at: None,
            reminder_reference: None,
            vitamins: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Builder method: set consumed water
    pub fn consumed(mut self, ml: i64) -> Self {
        self.water_consumed_ml = ml;
        self
    }

    /// Builder method: append a vitamin
    pub fn vitamin(mut self, vitamin: Vitamin) -> Self {
        self.vitamins.push(vitamin);
        self
    }
}

impl Vitamin {
    pub fn new(name: impl Into<String>, scheduled_at: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scheduled_at: scheduled_at.into(),
            last_taken_on: None,
            extra: Map::new(),
        }
    }

    /// Builder method: set the last taken date
    pub fn taken_on(mut self, date: impl Into<String>) -> Self {
        self.last_taken_on = Some(date.into());
        self
    }
}
