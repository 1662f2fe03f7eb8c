//! Data Transfer Objects
//!
//! Request and response types for the JSON endpoints and the page forms.
//! These types are serialized/deserialized to/from JSON.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::record::{date_string, Record};

// ============================================
// RECORD DTOs
// ============================================

/// Add water request (JSON body or form fields)
#[derive(Debug, Deserialize)]
pub struct AddWaterRequest {
    /// Portion size in ml: 200 or 500
    pub amount: i64,
}

/// The session's record plus the values derived from it
#[derive(Debug, Serialize)]
pub struct RecordResponse {
    /// The record as stored
    pub record: Record,
    /// Consumed / target, clamped to [0, 1]
    pub progress: f64,
    /// Local date used for the taken flags
    pub today: String,
    /// Vitamins with their derived taken flag
    pub vitamins: Vec<VitaminStatus>,
}

/// One vitamin as shown on the page
#[derive(Debug, Serialize)]
pub struct VitaminStatus {
    /// Position in the schedule, used by the take endpoint
    pub index: usize,
    pub name: String,
    pub scheduled_at: String,
    pub taken_today: bool,
}

impl RecordResponse {
    pub fn new(record: &Record, now: &DateTime<Local>) -> Self {
        let vitamins = record
            .vitamins
            .iter()
            .enumerate()
            .map(|(index, vitamin)| VitaminStatus {
                index,
                name: vitamin.name.clone(),
                scheduled_at: vitamin.scheduled_at.clone(),
                taken_today: vitamin.is_taken_on(now),
            })
            .collect();

        Self {
            record: record.clone(),
            progress: record.progress(),
            today: date_string(now),
            vitamins,
        }
    }
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, degraded
    pub status: String,
    /// Store status: connected, not_configured
    pub store: String,
    /// Live browser sessions
    pub sessions: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Vitamin;
    use chrono::TimeZone;

    #[test]
    fn test_record_response_derives_flags() {
        let now = Local.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let record = Record::new(2000)
            .consumed(2500)
            .vitamin(Vitamin::new("D3", "09:00").taken_on("2026-10-16"))
            .vitamin(Vitamin::new("B12", "10:00").taken_on("2026-10-15"));

        let response = RecordResponse::new(&record, &now);

        assert_eq!(response.progress, 1.0);
        assert_eq!(response.today, "2026-10-16");
        assert!(response.vitamins[0].taken_today);
        assert!(!response.vitamins[1].taken_today);
        assert_eq!(response.vitamins[1].index, 1);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["record"]["su_icilen"], 2500);
        assert_eq!(json["vitamins"][0]["taken_today"], true);
    }
}
