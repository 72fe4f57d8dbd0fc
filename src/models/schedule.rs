use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::tour::Tour;

/// The calendar half of a wizard selection. Picking a new date always
/// invalidates the previously selected time.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ScheduleSelection {
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
}

impl ScheduleSelection {
    pub fn is_complete(&self) -> bool {
        self.date.is_some() && self.time.is_some()
    }

    pub fn matches(&self, date: NaiveDate, time: &str) -> bool {
        self.date == Some(date) && self.time.as_deref() == Some(time)
    }
}

/// Keep only the dates the tour actually operates on, so the batch
/// fully-booked query never asks about dead weekdays.
pub fn filter_to_active_weekdays(tour: &Tour, dates: &[NaiveDate]) -> Vec<NaiveDate> {
    dates
        .iter()
        .copied()
        .filter(|d| {
            let weekday = d.weekday().num_days_from_sunday() as u8;
            tour.active_weekdays.contains(&weekday)
        })
        .collect()
}
