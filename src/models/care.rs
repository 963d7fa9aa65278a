use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An append-only record that a todo was done.
///
/// Cares are never edited. The most recent care of a todo re-anchors its
/// recurrence; older ones only show up in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Care {
    pub id: Uuid,
    pub household_id: Uuid,
    pub todo_id: Uuid,
    pub note: Option<String>,
    pub date_created: DateTime<Utc>,
}

/// Input for logging a care against a todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCareInput {
    pub todo_id: Uuid,
    #[serde(default)]
    pub note: Option<String>,
    /// When the care was actually performed. Defaults to now.
    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
}
