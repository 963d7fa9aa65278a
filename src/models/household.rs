use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The grouping scope for items, todos and cares.
///
/// Every todo and care belongs to exactly one household, and all schedule
/// queries are answered per household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Household {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new household.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHouseholdInput {
    pub name: String,
}
