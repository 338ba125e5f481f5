use std::ops::RangeInclusive;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Days that close one of the four fixed weeks of the grid.
pub const WEEK_DIVIDER_DAYS: [u32; 4] = [7, 14, 21, 28];

/// Month grid derived from a reference date. Weeks start on Monday.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    /// Weekday of the 1st, 0 = Monday .. 6 = Sunday.
    pub start_weekday_index: u32,
    /// Day-of-month of the reference date.
    pub today: u32,
    pub label: String,
}

impl MonthCalendar {
    pub fn resolve(reference: NaiveDate) -> Self {
        let first = reference - Days::new(u64::from(reference.day0()));
        let days_in_month = first
            .checked_add_months(Months::new(1))
            .and_then(|next| u32::try_from(next.signed_duration_since(first).num_days()).ok())
            .unwrap_or(31);

        Self {
            year: first.year(),
            month: first.month(),
            days_in_month,
            start_weekday_index: first.weekday().num_days_from_monday(),
            today: reference.day(),
            label: reference.format("%B %Y").to_string(),
        }
    }

    pub fn days(&self) -> RangeInclusive<u32> {
        1..=self.days_in_month
    }

    pub fn contains_day(&self, day: u32) -> bool {
        self.days().contains(&day)
    }

    pub fn weekday_index(&self, day: u32) -> u32 {
        (self.start_weekday_index + day + 6) % 7
    }

    pub fn weekday(&self, day: u32) -> Weekday {
        WEEKDAYS[self.weekday_index(day) as usize]
    }

    pub fn weekday_label(&self, day: u32) -> &'static str {
        WEEKDAY_LABELS[self.weekday_index(day) as usize]
    }

    pub fn is_weekend(&self, day: u32) -> bool {
        matches!(self.weekday(day), Weekday::Sat | Weekday::Sun)
    }
}

/// Fixed week bucket (1..=5) a day falls into; 29 and later belong to bucket 5.
pub fn week_group(day: u32) -> u32 {
    match day {
        0..=7 => 1,
        8..=14 => 2,
        15..=21 => 3,
        22..=28 => 4,
        _ => 5,
    }
}

pub fn is_week_divider(day: u32) -> bool {
    WEEK_DIVIDER_DAYS.contains(&day)
}
