//! Calendar windows for the dashboard: the local "today" and the
//! Saturday-to-Friday week.
//!
//! Windows are computed in the UTC offset of the reference timestamp. Stored
//! timestamps are converted into that offset before their day is taken, so a
//! caller passing a reference in a different zone than the one meals were
//! logged in gets days bucketed by the reference zone.

use std::ops::Range;

use serde::Serialize;
use time::{macros::time, Duration, OffsetDateTime, Time};

pub const SLOT_LABELS: [&str; 7] = ["Sat", "Sun", "Mon", "Tue", "Wed", "Thu", "Fri"];

const END_OF_DAY: Time = time!(23:59:59.999);

/// Saturday 00:00:00.000 through Friday 23:59:59.999, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekWindow {
    #[serde(with = "time::serde::rfc3339")]
    pub start_of_week: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_of_week: OffsetDateTime,
}

impl WeekWindow {
    /// The week containing `reference`. Sunday belongs to the week that started
    /// the day before.
    pub fn containing(reference: OffsetDateTime) -> Self {
        let days_since_saturday = (reference.weekday().number_days_from_sunday() + 1) % 7;
        let saturday = reference.date() - Duration::days(i64::from(days_since_saturday));
        let friday = saturday + Duration::days(6);
        let offset = reference.offset();
        Self {
            start_of_week: saturday.with_time(Time::MIDNIGHT).assume_offset(offset),
            end_of_week: friday.with_time(END_OF_DAY).assume_offset(offset),
        }
    }

    pub fn contains(&self, at: OffsetDateTime) -> bool {
        self.start_of_week <= at && at <= self.end_of_week
    }

    /// Half-open range covering the whole week, for storage queries.
    pub fn span(&self) -> Range<OffsetDateTime> {
        self.start_of_week..self.start_of_week + Duration::days(7)
    }

    /// Whole days between `at`'s day and the start of the week, if that lands in
    /// `0..7`. Out-of-window timestamps yield `None` and are meant to be skipped.
    pub fn slot_index(&self, at: OffsetDateTime) -> Option<usize> {
        let day = at.to_offset(self.start_of_week.offset()).date();
        let diff = (day - self.start_of_week.date()).whole_days();
        usize::try_from(diff).ok().filter(|slot| *slot < SLOT_LABELS.len())
    }
}

/// Local midnight to the next local midnight, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
}

impl DayWindow {
    pub fn containing(reference: OffsetDateTime) -> Self {
        let start = reference.replace_time(Time::MIDNIGHT);
        Self {
            start,
            end: start + Duration::days(1),
        }
    }

    pub fn contains(&self, at: OffsetDateTime) -> bool {
        self.start <= at && at < self.end
    }

    pub fn span(&self) -> Range<OffsetDateTime> {
        self.start..self.end
    }
}
