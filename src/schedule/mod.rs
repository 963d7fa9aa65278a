//! Due-date projection and schedule merging.
//!
//! Everything in this module is a pure function over a [`HouseholdSnapshot`]
//! and a reference instant. "Today" is the UTC calendar day of that instant;
//! all bucketing is done on whole-day differences from it, so the time of day
//! of any todo or care never matters beyond which day it falls on.
//!
//! - [`project_todos`] looks forward: which todos are due on each of the next days.
//! - [`read_care_history`] looks backward: which cares were logged on each past day.
//! - [`build_schedule`] stitches both into one chronological window around today.
//!
//! [`Planner`] binds the functions to a [`HouseholdStore`] so callers can ask by
//! household id; it takes one snapshot per call and never caches.

mod day;
mod history;
mod merger;
mod projector;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::*;

pub use history::read_care_history;
pub use merger::build_schedule;
pub use projector::project_todos;

/// Largest window, in days, a single projection or history read may cover.
pub const MAX_WINDOW_DAYS: u32 = 3660;

/// Projection and history length when a caller gives none.
pub const DEFAULT_HORIZON_DAYS: u32 = 7;

/// Days either side of today in the merged schedule when a caller gives none.
pub const DEFAULT_RADIUS_DAYS: u32 = 3;

/// Invalid-argument failures. The call produces no partial result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("horizon must be at least 1 day")]
    ZeroHorizon,

    #[error("window of {requested} days exceeds the maximum of {max} days")]
    WindowTooLarge { requested: u64, max: u32 },
}

pub(crate) fn validate_horizon(horizon_days: u32) -> Result<(), ScheduleError> {
    if horizon_days == 0 {
        return Err(ScheduleError::ZeroHorizon);
    }
    if horizon_days > MAX_WINDOW_DAYS {
        return Err(ScheduleError::WindowTooLarge {
            requested: u64::from(horizon_days),
            max: MAX_WINDOW_DAYS,
        });
    }
    Ok(())
}

/// A consistent read of one household's todos and cares.
///
/// Element order is the household's insertion order and is only used to
/// break ties between todos or cares that land on the same day.
#[derive(Debug, Clone, Default)]
pub struct HouseholdSnapshot {
    pub household_id: Uuid,
    pub todos: Vec<Todo>,
    pub cares: Vec<Care>,
}

impl HouseholdSnapshot {
    pub fn new(household_id: Uuid, todos: Vec<Todo>, cares: Vec<Care>) -> Self {
        Self {
            household_id,
            todos,
            cares,
        }
    }
}

/// The two reads the schedule needs from whatever persists households.
pub trait HouseholdStore {
    fn household_todos(&self, household_id: Uuid) -> anyhow::Result<Vec<Todo>>;

    fn household_cares(&self, household_id: Uuid) -> anyhow::Result<Vec<Care>>;

    /// Read todos and cares together. Stores that can read both atomically
    /// should override this.
    fn snapshot(&self, household_id: Uuid) -> anyhow::Result<HouseholdSnapshot> {
        Ok(HouseholdSnapshot::new(
            household_id,
            self.household_todos(household_id)?,
            self.household_cares(household_id)?,
        ))
    }
}

/// Answers schedule queries by household id against a store.
pub struct Planner<'a, S: HouseholdStore + ?Sized> {
    store: &'a S,
    now: DateTime<Utc>,
}

impl<'a, S: HouseholdStore + ?Sized> Planner<'a, S> {
    /// Plan relative to the current instant.
    pub fn new(store: &'a S) -> Self {
        Self::at(store, Utc::now())
    }

    /// Plan relative to a fixed reference instant.
    pub fn at(store: &'a S, now: DateTime<Utc>) -> Self {
        Self { store, now }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn project_todos(
        &self,
        household_id: Uuid,
        horizon_days: u32,
    ) -> anyhow::Result<Vec<DueDay>> {
        validate_horizon(horizon_days)?;
        let snapshot = self.store.snapshot(household_id)?;
        Ok(project_todos(&snapshot, self.now, horizon_days)?)
    }

    pub fn read_care_history(
        &self,
        household_id: Uuid,
        horizon_days: u32,
    ) -> anyhow::Result<Vec<CareDay>> {
        validate_horizon(horizon_days)?;
        let snapshot = self.store.snapshot(household_id)?;
        Ok(read_care_history(&snapshot, self.now, horizon_days)?)
    }

    pub fn build_schedule(
        &self,
        household_id: Uuid,
        radius_days: u32,
    ) -> anyhow::Result<Vec<ScheduleEntry>> {
        validate_horizon(radius_days.saturating_add(1))?;
        let snapshot = self.store.snapshot(household_id)?;
        Ok(build_schedule(&snapshot, self.now, radius_days)?)
    }
}
