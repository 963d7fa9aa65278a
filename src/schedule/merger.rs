use chrono::{DateTime, Utc};

use super::{project_todos, read_care_history, HouseholdSnapshot, ScheduleError};
use crate::models::ScheduleEntry;

/// Merge projection and history into `2 * radius_days + 1` chronological days.
///
/// Entry `radius_days` is today and carries both today's due todos and today's
/// cares. Earlier entries carry only cares, later entries only todos. A radius
/// of zero is valid and yields today alone.
///
/// # Errors
/// [`ScheduleError::WindowTooLarge`] when `radius_days + 1` exceeds
/// [`super::MAX_WINDOW_DAYS`].
pub fn build_schedule(
    snapshot: &HouseholdSnapshot,
    now: DateTime<Utc>,
    radius_days: u32,
) -> Result<Vec<ScheduleEntry>, ScheduleError> {
    let span = radius_days.saturating_add(1);
    let due = project_todos(snapshot, now, span)?;
    let history = read_care_history(snapshot, now, span)?;

    // History is newest first and ends up oldest first, today last.
    let mut entries: Vec<ScheduleEntry> = Vec::with_capacity(due.len() + history.len() - 1);
    entries.extend(history.into_iter().rev().map(|day| ScheduleEntry {
        date: day.date,
        todos: Vec::new(),
        cares: day.cares,
    }));

    let mut due = due.into_iter();
    if let (Some(today), Some(due_today)) = (entries.last_mut(), due.next()) {
        debug_assert_eq!(today.date, due_today.date);
        today.todos = due_today.todos;
    }

    entries.extend(due.map(|day| ScheduleEntry {
        date: day.date,
        todos: day.todos,
        cares: Vec::new(),
    }));

    Ok(entries)
}
