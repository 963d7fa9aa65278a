//! Recurring household care: which todos are due when, and what was done.
//!
//! The scheduling core lives in [`schedule`] and is pure. [`db`] persists
//! households, [`api`] serves them over HTTP and [`mcp`] exposes them to
//! assistants.

pub mod api;
pub mod db;
pub mod mcp;
pub mod models;
pub mod schedule;
