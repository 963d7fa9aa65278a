use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::Database;
use crate::models::*;
use crate::schedule::{Planner, ScheduleError, DEFAULT_HORIZON_DAYS, DEFAULT_RADIUS_DAYS};

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
/// The full error is logged server-side for debugging, but clients only
/// see a generic message to avoid leaking internal details.
///
/// Validation errors raised by the store (e.g. "Household not found",
/// "recurrence_days must be at least 1") are returned as-is with BAD_REQUEST.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    let msg = e.to_string();

    if msg.contains("not found") || msg.contains("at least") {
        tracing::warn!("Validation error: {}", msg);
        return (StatusCode::BAD_REQUEST, msg);
    }

    tracing::error!("Internal error: {}", msg);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

/// Invalid windows are the caller's fault; anything else is internal.
fn schedule_error(e: anyhow::Error) -> (StatusCode, String) {
    match e.downcast_ref::<ScheduleError>() {
        Some(err) => {
            tracing::warn!("Invalid schedule request: {}", err);
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        None => internal_error(e),
    }
}

fn household_not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "Household not found".to_string())
}

fn require_household(db: &Database, id: Uuid) -> Result<Household, (StatusCode, String)> {
    db.get_household(id)
        .map_err(internal_error)?
        .ok_or_else(household_not_found)
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Households
// ============================================================

pub async fn list_households(
    State(db): State<Database>,
) -> Result<Json<Vec<Household>>, (StatusCode, String)> {
    db.get_all_households().map(Json).map_err(internal_error)
}

pub async fn get_household(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Household>, (StatusCode, String)> {
    require_household(&db, id).map(Json)
}

pub async fn create_household(
    State(db): State<Database>,
    Json(input): Json<CreateHouseholdInput>,
) -> Result<(StatusCode, Json<Household>), (StatusCode, String)> {
    db.create_household(input)
        .map(|h| (StatusCode::CREATED, Json(h)))
        .map_err(internal_error)
}

pub async fn delete_household(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if db.delete_household(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(household_not_found())
    }
}

// ============================================================
// Items
// ============================================================

pub async fn list_items(
    State(db): State<Database>,
    Path(household_id): Path<Uuid>,
) -> Result<Json<Vec<Item>>, (StatusCode, String)> {
    require_household(&db, household_id)?;
    db.get_items_by_household(household_id)
        .map(Json)
        .map_err(internal_error)
}

pub async fn create_item(
    State(db): State<Database>,
    Path(household_id): Path<Uuid>,
    Json(input): Json<CreateItemInput>,
) -> Result<(StatusCode, Json<Item>), (StatusCode, String)> {
    require_household(&db, household_id)?;
    db.create_item(household_id, input)
        .map(|i| (StatusCode::CREATED, Json(i)))
        .map_err(internal_error)
}

pub async fn delete_item(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if db.delete_item(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Item not found".to_string()))
    }
}

// ============================================================
// Todos
// ============================================================

pub async fn list_todos(
    State(db): State<Database>,
    Path(household_id): Path<Uuid>,
) -> Result<Json<Vec<Todo>>, (StatusCode, String)> {
    require_household(&db, household_id)?;
    db.get_todos_by_household(household_id)
        .map(Json)
        .map_err(internal_error)
}

pub async fn create_todo(
    State(db): State<Database>,
    Path(household_id): Path<Uuid>,
    Json(input): Json<CreateTodoInput>,
) -> Result<(StatusCode, Json<Todo>), (StatusCode, String)> {
    require_household(&db, household_id)?;
    db.create_todo(household_id, input)
        .map(|t| (StatusCode::CREATED, Json(t)))
        .map_err(internal_error)
}

pub async fn get_todo(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Todo>, (StatusCode, String)> {
    db.get_todo(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Todo not found".to_string()))
}

pub async fn update_todo(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTodoInput>,
) -> Result<Json<Todo>, (StatusCode, String)> {
    db.update_todo(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Todo not found".to_string()))
}

pub async fn delete_todo(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if db.delete_todo(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Todo not found".to_string()))
    }
}

// ============================================================
// Cares
// ============================================================

pub async fn list_cares(
    State(db): State<Database>,
    Path(household_id): Path<Uuid>,
) -> Result<Json<Vec<Care>>, (StatusCode, String)> {
    require_household(&db, household_id)?;
    db.get_cares_by_household(household_id)
        .map(Json)
        .map_err(internal_error)
}

pub async fn list_todo_cares(
    State(db): State<Database>,
    Path(todo_id): Path<Uuid>,
) -> Result<Json<Vec<Care>>, (StatusCode, String)> {
    db.get_todo(todo_id)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "Todo not found".to_string()))?;

    db.get_cares_by_todo(todo_id)
        .map(Json)
        .map_err(internal_error)
}

pub async fn create_care(
    State(db): State<Database>,
    Path(household_id): Path<Uuid>,
    Json(input): Json<CreateCareInput>,
) -> Result<(StatusCode, Json<Care>), (StatusCode, String)> {
    require_household(&db, household_id)?;
    db.create_care(household_id, input)
        .map(|c| (StatusCode::CREATED, Json(c)))
        .map_err(internal_error)
}

pub async fn delete_care(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if db.delete_care(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Care not found".to_string()))
    }
}

// ============================================================
// Schedule views
// ============================================================

/// Query parameters for the projection and history views.
#[derive(Debug, Deserialize)]
pub struct HorizonQuery {
    /// Days to cover, today included. Defaults to 7.
    pub horizon: Option<u32>,
}

/// Query parameters for the merged schedule.
#[derive(Debug, Deserialize)]
pub struct RadiusQuery {
    /// Days either side of today. Defaults to 3.
    pub radius: Option<u32>,
}

pub async fn get_due_todos(
    State(db): State<Database>,
    Path(household_id): Path<Uuid>,
    Query(query): Query<HorizonQuery>,
) -> Result<Json<Vec<DueDay>>, (StatusCode, String)> {
    require_household(&db, household_id)?;
    Planner::new(&db)
        .project_todos(household_id, query.horizon.unwrap_or(DEFAULT_HORIZON_DAYS))
        .map(Json)
        .map_err(schedule_error)
}

pub async fn get_care_history(
    State(db): State<Database>,
    Path(household_id): Path<Uuid>,
    Query(query): Query<HorizonQuery>,
) -> Result<Json<Vec<CareDay>>, (StatusCode, String)> {
    require_household(&db, household_id)?;
    Planner::new(&db)
        .read_care_history(household_id, query.horizon.unwrap_or(DEFAULT_HORIZON_DAYS))
        .map(Json)
        .map_err(schedule_error)
}

pub async fn get_schedule(
    State(db): State<Database>,
    Path(household_id): Path<Uuid>,
    Query(query): Query<RadiusQuery>,
) -> Result<Json<Vec<ScheduleEntry>>, (StatusCode, String)> {
    require_household(&db, household_id)?;
    Planner::new(&db)
        .build_schedule(household_id, query.radius.unwrap_or(DEFAULT_RADIUS_DAYS))
        .map(Json)
        .map_err(schedule_error)
}
