//! Record operations
//!
//! The mutations triggered by the page controls and the values derived from
//! the record at render time. Every function takes the current local time as
//! an argument so the daily rollover is decided by the caller.

use chrono::{DateTime, Local};
use thiserror::Error;

use super::types::{Record, Vitamin, DATE_FORMAT, TIMESTAMP_FORMAT};

/// The drink sizes offered on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterPortion {
    /// A glass, 200 ml
    Glass,
    /// A bottle, 500 ml
    Bottle,
}

impl WaterPortion {
    pub fn ml(self) -> i64 {
        match self {
            WaterPortion::Glass => 200,
            WaterPortion::Bottle => 500,
        }
    }
}

impl TryFrom<i64> for WaterPortion {
    type Error = RecordError;

    fn try_from(ml: i64) -> Result<Self, Self::Error> {
        match ml {
            200 => Ok(WaterPortion::Glass),
            500 => Ok(WaterPortion::Bottle),
            other => Err(RecordError::UnsupportedPortion(other)),
        }
    }
}

/// Errors raised by record mutations
#[derive(Error, Debug, PartialEq)]
pub enum RecordError {
    #[error("Unsupported water portion: {0} ml (expected 200 or 500)")]
    UnsupportedPortion(i64),

    #[error("No vitamin at position {index} (schedule has {len})")]
    VitaminNotFound { index: usize, len: usize },
}

/// Today's date string as stored in `son_alinma`
pub fn date_string(now: &DateTime<Local>) -> String {
    now.format(DATE_FORMAT).to_string()
}

impl Record {
    /// Log a drink: bump the counter, stamp the time and reset the reminder marker.
    ///
    /// The counter is not capped at the target; it saturates at `i64::MAX`.
    pub fn add_water(&mut self, portion: WaterPortion, now: &DateTime<Local>) {
        self.water_consumed_ml = self.water_consumed_ml.saturating_add(portion.ml());
        self.last_water_at = Some(now.format(TIMESTAMP_FORMAT).to_string());
        self.reminder_reference = Some(now.timestamp_millis() as f64 / 1000.0);
    }

    /// Mark the vitamin at `index` as taken today.
    ///
    /// Marking twice on the same day leaves the record unchanged.
    pub fn mark_vitamin_taken(
        &mut self,
        index: usize,
        now: &DateTime<Local>,
    ) -> Result<&Vitamin, RecordError> {
        let len = self.vitamins.len();
        let vitamin = self
            .vitamins
            .get_mut(index)
            .ok_or(RecordError::VitaminNotFound { index, len })?;

        vitamin.last_taken_on = Some(date_string(now));
        Ok(&*vitamin)
    }

    /// Consumed / target, clamped to [0, 1] for the progress bar
    pub fn progress(&self) -> f64 {
        if self.water_target_ml <= 0 {
            return if self.water_consumed_ml > 0 { 1.0 } else { 0.0 };
        }

        let ratio = self.water_consumed_ml as f64 / self.water_target_ml as f64;
        ratio.clamp(0.0, 1.0)
    }
}

impl Vitamin {
    /// Whether the vitamin was taken on the local date of `now`.
    ///
    /// Derived from the stored date on every call, so it flips back to
    /// false when the date rolls over.
    pub fn is_taken_on(&self, now: &DateTime<Local>) -> bool {
        self.last_taken_on.as_deref() == Some(date_string(now).as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn morning() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
    }

    fn sample() -> Record {
        Record::new(2000)
            .consumed(1000)
            .vitamin(Vitamin::new("D3", "09:00"))
            .vitamin(Vitamin::new("Omega 3", "13:00"))
    }

    #[test]
    fn test_add_glass() {
        let mut record = sample();
        record.add_water(WaterPortion::Glass, &morning());

        assert_eq!(record.water_consumed_ml, 1200);
        assert_eq!(record.last_water_at.as_deref(), Some("2026-10-16 09:30:00"));
        assert_eq!(
            record.reminder_reference,
            Some(morning().timestamp() as f64)
        );
    }

    #[test]
    fn test_add_bottle() {
        let mut record = sample();
        record.add_water(WaterPortion::Bottle, &morning());
        assert_eq!(record.water_consumed_ml, 1500);
    }

    #[test]
    fn test_additions_accumulate_without_cap() {
        let mut record = sample();
        for _ in 0..10 {
            record.add_water(WaterPortion::Bottle, &morning());
        }
        assert_eq!(record.water_consumed_ml, 6000);
        assert!(record.water_consumed_ml > record.water_target_ml);
    }

    #[test]
    fn test_add_water_saturates_at_max() {
        let mut record = Record::new(2000).consumed(i64::MAX - 100);
        record.add_water(WaterPortion::Bottle, &morning());

        assert_eq!(record.water_consumed_ml, i64::MAX);
        assert_eq!(record.last_water_at.as_deref(), Some("2026-10-16 09:30:00"));
        assert_eq!(record.progress(), 1.0);
    }

    #[test]
    fn test_portion_from_ml() {
        assert_eq!(WaterPortion::try_from(200_i64), Ok(WaterPortion::Glass));
        assert_eq!(WaterPortion::try_from(500_i64), Ok(WaterPortion::Bottle));
        assert_eq!(
            WaterPortion::try_from(300_i64),
            Err(RecordError::UnsupportedPortion(300))
        );
    }

    #[test]
    fn test_progress_clamped() {
        let record = Record::new(2000).consumed(2500);
        assert_eq!(record.progress(), 1.0);

        let record = Record::new(2000).consumed(500);
        assert_eq!(record.progress(), 0.25);
    }

    #[test]
    fn test_progress_without_target() {
        assert_eq!(Record::new(0).progress(), 0.0);
        assert_eq!(Record::new(0).consumed(200).progress(), 1.0);
    }

    #[test]
    fn test_taken_today_vs_yesterday() {
        let now = morning();
        let yesterday = date_string(&(now - Duration::days(1)));

        assert!(Vitamin::new("D3", "09:00").taken_on("2026-10-16").is_taken_on(&now));
        assert!(!Vitamin::new("D3", "09:00").taken_on(yesterday).is_taken_on(&now));
        assert!(!Vitamin::new("D3", "09:00").is_taken_on(&now));
    }

    #[test]
    fn test_taken_flag_resets_next_day() {
        let mut record = sample();
        record.mark_vitamin_taken(0, &morning()).unwrap();

        let tomorrow = morning() + Duration::days(1);
        assert!(record.vitamins[0].is_taken_on(&morning()));
        assert!(!record.vitamins[0].is_taken_on(&tomorrow));
    }

    #[test]
    fn test_mark_taken_is_idempotent() {
        let mut record = sample();
        record.mark_vitamin_taken(1, &morning()).unwrap();
        let once = record.clone();

        record.mark_vitamin_taken(1, &morning()).unwrap();
        assert_eq!(record, once);
        assert_eq!(record.vitamins[1].last_taken_on.as_deref(), Some("2026-10-16"));
        assert_eq!(record.vitamins[0].last_taken_on, None);
    }

    #[test]
    fn test_mark_unknown_vitamin() {
        let mut record = sample();
        let before = record.clone();

        let err = record.mark_vitamin_taken(5, &morning()).unwrap_err();
        assert_eq!(err, RecordError::VitaminNotFound { index: 5, len: 2 });
        assert_eq!(record, before);
    }
}
