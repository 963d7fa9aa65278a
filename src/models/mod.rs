//! Domain models for tend.
//!
//! # Core Concepts
//!
//! ## Stored Entities
//!
//! - [`Household`]: Grouping scope. Every query is answered per household.
//! - [`Item`]: Something in the household that needs looking after.
//! - [`Todo`]: A recurring task with an interval in days, anchored at creation.
//! - [`Care`]: Append-only record that a todo was done on a given instant.
//!
//! ## Computed Views
//!
//! These are derived on every query and never persisted:
//!
//! - [`DueDay`]: Todos due on a day (forward-looking).
//! - [`CareDay`]: Cares performed on a day (backward-looking).
//! - [`ScheduleEntry`]: The merged per-day view around today.

mod care;
mod household;
mod item;
mod schedule;
mod todo;

pub use care::*;
pub use household::*;
pub use item::*;
pub use schedule::*;
pub use todo::*;
