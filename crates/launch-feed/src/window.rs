//! The upcoming-week query window.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};

/// Inclusive UTC bounds passed to the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl FeedWindow {
    pub fn start_param(&self) -> String {
        self.start.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

/// Next Monday 00:00:00 through the following Sunday 23:59:59.
///
/// On a Monday the window starts today.
pub fn upcoming_week(now: DateTime<Utc>) -> FeedWindow {
    let days_until_monday = (7 - now.weekday().num_days_from_monday()) % 7;
    let monday = now.date_naive() + Duration::days(days_until_monday as i64);
    let sunday = monday + Duration::days(6);

    FeedWindow {
        start: monday.and_time(NaiveTime::MIN).and_utc(),
        end: sunday
            .and_hms_opt(23, 59, 59)
            .unwrap_or_else(|| sunday.and_time(NaiveTime::MIN))
            .and_utc(),
    }
}
