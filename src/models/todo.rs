use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recurring maintenance task, e.g. "water the fern every 3 days".
///
/// The recurrence is anchored at `date_created`: with no care logged, the todo
/// is due on its creation day and every `recurrence_days` after that. Once a
/// care exists, the most recent one becomes the anchor instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: Uuid,
    pub household_id: Uuid,
    /// The item this todo is about, if any.
    pub item_id: Option<Uuid>,
    pub title: String,
    /// Interval in days between occurrences. Always at least 1.
    pub recurrence_days: u32,
    pub date_created: DateTime<Utc>,
}

/// Input for creating a todo within a household.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodoInput {
    pub item_id: Option<Uuid>,
    pub title: String,
    pub recurrence_days: u32,
    /// Backdates the recurrence anchor. Defaults to now.
    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
}

/// Input for editing a todo. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodoInput {
    pub title: Option<String>,
    pub recurrence_days: Option<u32>,
}
