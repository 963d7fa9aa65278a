use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::day::{day_index, shift, today};
use super::{validate_horizon, HouseholdSnapshot, ScheduleError};
use crate::models::{Care, DueDay, Todo};

/// Project which todos are due on each of the `horizon_days` days starting today.
///
/// Returns exactly `horizon_days` buckets, ordered `today, today + 1, ...`.
/// Within a bucket todos keep the snapshot's order.
///
/// A todo is due on day `d` when `d` lies a whole number of intervals on or
/// after its anchor day, except on the day of its most recent care. The anchor
/// is the most recent care's day, or the creation day if it was never cared for.
///
/// # Errors
/// - [`ScheduleError::ZeroHorizon`] when `horizon_days` is 0.
/// - [`ScheduleError::WindowTooLarge`] past [`super::MAX_WINDOW_DAYS`].
pub fn project_todos(
    snapshot: &HouseholdSnapshot,
    now: DateTime<Utc>,
    horizon_days: u32,
) -> Result<Vec<DueDay>, ScheduleError> {
    validate_horizon(horizon_days)?;

    let today = today(now);
    let latest = latest_cares(&snapshot.cares);
    let cycles: Vec<Cycle<'_>> = snapshot
        .todos
        .iter()
        .map(|todo| Cycle::new(todo, latest.get(&todo.id).copied(), today))
        .collect();

    let days = (0..i64::from(horizon_days))
        .map(|offset| DueDay {
            date: shift(today, offset),
            todos: cycles
                .iter()
                .filter(|cycle| cycle.is_due(offset))
                .map(|cycle| cycle.todo.clone())
                .collect(),
        })
        .collect();

    Ok(days)
}

/// The most recent care per todo id.
///
/// Same-instant cares are ordered by id so the pick never depends on input order.
/// Cares pointing at todos outside the snapshot end up here too and are simply
/// never looked up.
pub(crate) fn latest_cares(cares: &[Care]) -> HashMap<Uuid, &Care> {
    let mut latest: HashMap<Uuid, &Care> = HashMap::new();
    for care in cares {
        latest
            .entry(care.todo_id)
            .and_modify(|current| {
                if (care.date_created, care.id) > (current.date_created, current.id) {
                    *current = care;
                }
            })
            .or_insert(care);
    }
    latest
}

/// One todo's recurrence, expressed in day offsets from today.
struct Cycle<'a> {
    todo: &'a Todo,
    anchor: i64,
    cared_on: Option<i64>,
    every: i64,
}

impl<'a> Cycle<'a> {
    fn new(todo: &'a Todo, latest_care: Option<&Care>, today: NaiveDate) -> Self {
        let cared_on = latest_care.map(|care| day_index(care.date_created, today));
        let anchor = match cared_on {
            Some(day) => day,
            None => day_index(todo.date_created, today),
        };

        Self {
            todo,
            anchor,
            cared_on,
            // Zero is rejected on write; treat a stray one as daily.
            every: i64::from(todo.recurrence_days.max(1)),
        }
    }

    fn is_due(&self, day: i64) -> bool {
        if self.cared_on == Some(day) {
            return false;
        }
        let since = day - self.anchor;
        since >= 0 && since % self.every == 0
    }
}
