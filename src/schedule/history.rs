use chrono::{DateTime, Utc};

use super::day::{day_index, shift, today};
use super::{validate_horizon, HouseholdSnapshot, ScheduleError};
use crate::models::CareDay;

/// Bucket cares by day for the `horizon_days` days ending today.
///
/// Buckets run newest first: `today, today - 1, ..., today - (horizon_days - 1)`.
/// Cares outside that window, including any dated after today, are left out.
/// Within a bucket cares keep the snapshot's order.
pub fn read_care_history(
    snapshot: &HouseholdSnapshot,
    now: DateTime<Utc>,
    horizon_days: u32,
) -> Result<Vec<CareDay>, ScheduleError> {
    validate_horizon(horizon_days)?;

    let today = today(now);
    let window = i64::from(horizon_days);
    let mut days: Vec<CareDay> = (0..window)
        .map(|back| CareDay {
            date: shift(today, -back),
            cares: Vec::new(),
        })
        .collect();

    for care in &snapshot.cares {
        let back = -day_index(care.date_created, today);
        if (0..window).contains(&back) {
            days[back as usize].cares.push(care.clone());
        }
    }

    Ok(days)
}
