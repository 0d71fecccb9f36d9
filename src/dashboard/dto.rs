use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

use super::aggregate::WeeklySeries;
use super::calendar::{WeekWindow, SLOT_LABELS};

/// The caller's UTC offset in minutes (e.g. `120` for UTC+2). Day and week
/// boundaries are computed in that offset.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    #[serde(default)]
    pub tz_offset_minutes: i32,
}

impl DashboardQuery {
    pub fn offset(&self) -> Result<UtcOffset, String> {
        UtcOffset::from_whole_seconds(self.tz_offset_minutes.saturating_mul(60))
            .map_err(|_| format!("tzOffsetMinutes out of range: {}", self.tz_offset_minutes))
    }

    pub fn now(&self) -> Result<OffsetDateTime, String> {
        Ok(OffsetDateTime::now_utc().to_offset(self.offset()?))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyChart {
    pub labels: [&'static str; 7],
    pub data: WeeklySeries,
    #[serde(flatten)]
    pub window: WeekWindow,
}

impl WeeklyChart {
    pub fn new(window: WeekWindow, data: WeeklySeries) -> Self {
        Self {
            labels: SLOT_LABELS,
            data,
            window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn offset_is_given_in_minutes() {
        let q = DashboardQuery {
            tz_offset_minutes: -330,
        };
        assert_eq!(q.offset().unwrap().whole_minutes(), -330);
        let bad = DashboardQuery {
            tz_offset_minutes: 100_000,
        };
        assert!(bad.offset().is_err());
    }

    #[test]
    fn chart_serializes_labels_data_and_bounds() {
        let window = WeekWindow::containing(datetime!(2024-06-18 12:00 UTC));
        let chart = WeeklyChart::new(window, WeeklySeries([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]));
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["labels"][0], "Sat");
        assert_eq!(json["labels"][6], "Fri");
        assert_eq!(json["data"][0], 1.0);
        assert_eq!(json["startOfWeek"], "2024-06-15T00:00:00Z");
        assert_eq!(json["endOfWeek"], "2024-06-21T23:59:59.999Z");
    }
}
