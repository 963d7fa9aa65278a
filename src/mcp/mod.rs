//! MCP server so assistants can answer "what needs doing today?" and log what was done.

pub mod client;
pub mod render;
mod types;

pub use client::{ClientError, TendClient};
pub use types::*;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::Serialize;
use uuid::Uuid;

use crate::db::Database;
use crate::models::*;
use crate::schedule::{Planner, ScheduleError, DEFAULT_HORIZON_DAYS, DEFAULT_RADIUS_DAYS};

#[derive(Clone)]
pub struct McpServer {
    db: Database,
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            tool_router: Self::tool_router(),
        }
    }

    fn parse_uuid(s: &str) -> Result<Uuid, McpError> {
        Uuid::parse_str(s)
            .map_err(|e| McpError::invalid_params(format!("Invalid UUID: {}", e), None))
    }

    fn db_err(e: anyhow::Error) -> McpError {
        let msg = e.to_string();
        if msg.contains("not found") || msg.contains("at least") {
            McpError::invalid_params(msg, None)
        } else {
            McpError::internal_error(msg, None)
        }
    }

    fn plan_err(e: anyhow::Error) -> McpError {
        match e.downcast_ref::<ScheduleError>() {
            Some(err) => McpError::invalid_params(err.to_string(), None),
            None => Self::db_err(e),
        }
    }

    fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    fn household(&self, id: &str) -> Result<Household, McpError> {
        let id = Self::parse_uuid(id)?;
        self.db
            .get_household(id)
            .map_err(Self::db_err)?
            .ok_or_else(|| McpError::invalid_params("Household not found", None))
    }

    // ============================================================
    // Tool logic, shared by the tools below and the integration tests
    // ============================================================

    pub fn list_households(&self) -> Result<HouseholdListResponse, McpError> {
        let households = self.db.get_all_households().map_err(Self::db_err)?;
        Ok(HouseholdListResponse {
            households: households.into_iter().map(Into::into).collect(),
        })
    }

    pub fn schedule(&self, req: &GetScheduleRequest) -> Result<ScheduleResponse, McpError> {
        let household = self.household(&req.household_id)?;
        let planner = Planner::new(&self.db);
        let today = planner.now().date_naive();

        let entries = planner
            .build_schedule(household.id, req.radius_days.unwrap_or(DEFAULT_RADIUS_DAYS))
            .map_err(Self::plan_err)?;

        Ok(ScheduleResponse {
            household_id: household.id.to_string(),
            today: today.to_string(),
            days: entries
                .into_iter()
                .map(|entry| DayInfo::from_entry(entry, today))
                .collect(),
        })
    }

    pub fn due_todos(&self, req: &GetDueTodosRequest) -> Result<ScheduleResponse, McpError> {
        let household = self.household(&req.household_id)?;
        let planner = Planner::new(&self.db);
        let today = planner.now().date_naive();

        let days = planner
            .project_todos(household.id, req.horizon_days.unwrap_or(DEFAULT_HORIZON_DAYS))
            .map_err(Self::plan_err)?;

        Ok(ScheduleResponse {
            household_id: household.id.to_string(),
            today: today.to_string(),
            days: days
                .into_iter()
                .map(|day| {
                    let entry = ScheduleEntry {
                        date: day.date,
                        todos: day.todos,
                        cares: Vec::new(),
                    };
                    DayInfo::from_entry(entry, today)
                })
                .collect(),
        })
    }

    pub fn care_history(
        &self,
        req: &GetCareHistoryRequest,
    ) -> Result<ScheduleResponse, McpError> {
        let household = self.household(&req.household_id)?;
        let planner = Planner::new(&self.db);
        let today = planner.now().date_naive();

        let days = planner
            .read_care_history(household.id, req.horizon_days.unwrap_or(DEFAULT_HORIZON_DAYS))
            .map_err(Self::plan_err)?;

        Ok(ScheduleResponse {
            household_id: household.id.to_string(),
            today: today.to_string(),
            days: days
                .into_iter()
                .map(|day| {
                    let entry = ScheduleEntry {
                        date: day.date,
                        todos: Vec::new(),
                        cares: day.cares,
                    };
                    DayInfo::from_entry(entry, today)
                })
                .collect(),
        })
    }

    pub fn render_schedule_text(&self, req: &GetScheduleRequest) -> Result<String, McpError> {
        let household = self.household(&req.household_id)?;
        let planner = Planner::new(&self.db);

        let entries = planner
            .build_schedule(household.id, req.radius_days.unwrap_or(DEFAULT_RADIUS_DAYS))
            .map_err(Self::plan_err)?;
        let todos = self
            .db
            .get_todos_by_household(household.id)
            .map_err(Self::db_err)?;

        Ok(render::render_schedule(
            &entries,
            &todos,
            planner.now().date_naive(),
        ))
    }

    pub fn add_todo(&self, req: &CreateTodoRequest) -> Result<TodoInfo, McpError> {
        let household = self.household(&req.household_id)?;
        let item_id = req
            .item_id
            .as_deref()
            .map(Self::parse_uuid)
            .transpose()?;

        let todo = self
            .db
            .create_todo(
                household.id,
                CreateTodoInput {
                    item_id,
                    title: req.title.clone(),
                    recurrence_days: req.recurrence_days,
                    date_created: None,
                },
            )
            .map_err(Self::db_err)?;

        Ok(todo.into())
    }

    pub fn record_care(&self, req: &LogCareRequest) -> Result<CareInfo, McpError> {
        let household = self.household(&req.household_id)?;
        let todo_id = Self::parse_uuid(&req.todo_id)?;

        let care = self
            .db
            .create_care(
                household.id,
                CreateCareInput {
                    todo_id,
                    note: req.note.clone(),
                    date_created: None,
                },
            )
            .map_err(Self::db_err)?;

        Ok(care.into())
    }
}

#[tool_router]
impl McpServer {
    #[tool(
        name = "list_households",
        description = "List all households. Call this first to find the household_id the other tools need."
    )]
    async fn list_households_tool(&self) -> Result<CallToolResult, McpError> {
        Self::to_json(&self.list_households()?)
    }

    #[tool(
        description = "Get the care schedule around today: past days list what was done, today lists what is still due and what was already done, future days list what will be due. Days are oldest first."
    )]
    async fn get_schedule(
        &self,
        params: Parameters<GetScheduleRequest>,
    ) -> Result<CallToolResult, McpError> {
        Self::to_json(&self.schedule(&params.0)?)
    }

    #[tool(
        description = "List which todos are due on each day from today forward. A todo done today is not listed as due today."
    )]
    async fn get_due_todos(
        &self,
        params: Parameters<GetDueTodosRequest>,
    ) -> Result<CallToolResult, McpError> {
        Self::to_json(&self.due_todos(&params.0)?)
    }

    #[tool(description = "List what was done on each day, newest day first, ending today.")]
    async fn get_care_history(
        &self,
        params: Parameters<GetCareHistoryRequest>,
    ) -> Result<CallToolResult, McpError> {
        Self::to_json(&self.care_history(&params.0)?)
    }

    #[tool(
        description = "Render the schedule around today as plain text, one line per todo or care. Use this when showing the schedule to a person."
    )]
    async fn render_schedule(
        &self,
        params: Parameters<GetScheduleRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = self.render_schedule_text(&params.0)?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        description = "Create a recurring todo. It is due today and then every recurrence_days days until a care is logged, which restarts the cycle from the care's day."
    )]
    async fn create_todo(
        &self,
        params: Parameters<CreateTodoRequest>,
    ) -> Result<CallToolResult, McpError> {
        Self::to_json(&self.add_todo(&params.0)?)
    }

    #[tool(
        description = "Record that a todo was done now. The todo stops being due today and is next due recurrence_days from today."
    )]
    async fn log_care(
        &self,
        params: Parameters<LogCareRequest>,
    ) -> Result<CallToolResult, McpError> {
        Self::to_json(&self.record_care(&params.0)?)
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "tend".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            instructions: Some(
                r#"tend tracks recurring household chores ("todos", e.g. watering a plant every 3 days) and what was done ("cares").

A todo is due on its creation day and every recurrence_days after that. Logging a care restarts the cycle: the todo is not due again that day and is next due recurrence_days later.

WORKFLOW:
1. Call list_households to find the household_id
2. Call get_schedule (or render_schedule for a human-readable view) to see what is due today
3. Call log_care with the todo_id once a todo is done"#
                    .into(),
            ),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(db: Database) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = McpServer::new(db);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
