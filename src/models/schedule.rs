use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::care::Care;
use super::todo::Todo;

/// Todos due on one calendar day, as produced by the projector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueDay {
    pub date: NaiveDate,
    pub todos: Vec<Todo>,
}

/// Cares performed on one calendar day, as produced by the history reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareDay {
    pub date: NaiveDate,
    pub cares: Vec<Care>,
}

/// One day of a merged schedule.
///
/// Past days only carry cares, future days only carry todos, and today
/// carries both. Entries are computed per query and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub date: NaiveDate,
    pub todos: Vec<Todo>,
    pub cares: Vec<Care>,
}
