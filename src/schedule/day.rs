use chrono::{DateTime, Duration, NaiveDate, Utc};

/// The calendar day of the reference instant.
pub(super) fn today(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
}

/// Whole calendar days from `today` to the day `instant` falls on.
/// Negative for past days.
pub(super) fn day_index(instant: DateTime<Utc>, today: NaiveDate) -> i64 {
    (instant.date_naive() - today).num_days()
}

pub(super) fn shift(today: NaiveDate, days: i64) -> NaiveDate {
    today + Duration::days(days)
}
