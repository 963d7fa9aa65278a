//! Request and response types for MCP tools.

use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::{Care, Household, ScheduleEntry, Todo};

// ============================================================
// Request Types
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetScheduleRequest {
    #[schemars(description = "The UUID of the household")]
    pub household_id: String,
    #[schemars(
        description = "Days to show either side of today. 0 shows only today. Defaults to 3."
    )]
    #[serde(default)]
    pub radius_days: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetDueTodosRequest {
    #[schemars(description = "The UUID of the household")]
    pub household_id: String,
    #[schemars(description = "Days to look ahead, today included. Must be at least 1. Defaults to 7.")]
    #[serde(default)]
    pub horizon_days: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetCareHistoryRequest {
    #[schemars(description = "The UUID of the household")]
    pub household_id: String,
    #[schemars(description = "Days to look back, today included. Must be at least 1. Defaults to 7.")]
    #[serde(default)]
    pub horizon_days: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateTodoRequest {
    #[schemars(description = "The UUID of the household the todo belongs to")]
    pub household_id: String,
    #[schemars(description = "What needs doing, e.g. 'Water the fern'")]
    pub title: String,
    #[schemars(description = "Interval in days between occurrences. Must be at least 1.")]
    pub recurrence_days: u32,
    #[schemars(description = "Optional UUID of the item this todo is about")]
    #[serde(default)]
    pub item_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LogCareRequest {
    #[schemars(description = "The UUID of the household")]
    pub household_id: String,
    #[schemars(description = "The UUID of the todo that was done")]
    pub todo_id: String,
    #[schemars(description = "Optional note, e.g. 'soil was very dry'")]
    #[serde(default)]
    pub note: Option<String>,
}

// ============================================================
// Response Types
// ============================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct HouseholdInfo {
    pub id: String,
    pub name: String,
}

impl From<Household> for HouseholdInfo {
    fn from(household: Household) -> Self {
        Self {
            id: household.id.to_string(),
            name: household.name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct HouseholdListResponse {
    pub households: Vec<HouseholdInfo>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TodoInfo {
    pub id: String,
    pub title: String,
    pub recurrence_days: u32,
    pub item_id: Option<String>,
}

impl From<Todo> for TodoInfo {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id.to_string(),
            title: todo.title,
            recurrence_days: todo.recurrence_days,
            item_id: todo.item_id.map(|id| id.to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CareInfo {
    pub id: String,
    pub todo_id: String,
    pub note: Option<String>,
    /// RFC 3339 instant the care was performed.
    pub date_created: String,
}

impl From<Care> for CareInfo {
    fn from(care: Care) -> Self {
        Self {
            id: care.id.to_string(),
            todo_id: care.todo_id.to_string(),
            note: care.note,
            date_created: care.date_created.to_rfc3339(),
        }
    }
}

/// One day of any schedule view. Projection days leave `done` empty,
/// history days leave `due` empty.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DayInfo {
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    pub is_today: bool,
    pub due: Vec<TodoInfo>,
    pub done: Vec<CareInfo>,
}

impl DayInfo {
    pub fn from_entry(entry: ScheduleEntry, today: chrono::NaiveDate) -> Self {
        Self {
            date: entry.date.to_string(),
            is_today: entry.date == today,
            due: entry.todos.into_iter().map(Into::into).collect(),
            done: entry.cares.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ScheduleResponse {
    pub household_id: String,
    /// Today's date, `YYYY-MM-DD`.
    pub today: String,
    /// Oldest first, except care history which is newest first.
    pub days: Vec<DayInfo>,
}
