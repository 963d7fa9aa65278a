//! MCP server integration tests.
//!
//! These call the tool logic directly against an in-memory database;
//! `mcp_protocol_spec` covers the stdio transport.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tend::db::Database;
use tend::mcp::*;
use tend::models::*;

/// Helper to create a test MCP server with in-memory database.
fn setup() -> (McpServer, Database) {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let server = McpServer::new(db.clone());
    (server, db)
}

fn create_test_household(db: &Database) -> Household {
    db.create_household(CreateHouseholdInput {
        name: "Flat".to_string(),
    })
    .expect("Failed to create household")
}

/// Day a care was logged on, from the tool's RFC 3339 timestamp.
fn care_day(care: &CareInfo) -> NaiveDate {
    DateTime::parse_from_rfc3339(&care.date_created)
        .expect("Invalid care timestamp")
        .date_naive()
}

fn day(info: &DayInfo) -> NaiveDate {
    info.date.parse().expect("Invalid day")
}

fn create_test_todo(db: &Database, household: &Household, title: &str, every: u32) -> Todo {
    db.create_todo(
        household.id,
        CreateTodoInput {
            item_id: None,
            title: title.to_string(),
            recurrence_days: every,
            date_created: None,
        },
    )
    .expect("Failed to create todo")
}

mod list_households {
    use super::*;

    #[tokio::test]
    async fn returns_every_household() {
        let (server, db) = setup();
        let household = create_test_household(&db);

        let response = server.list_households().expect("Tool failed");

        assert_eq!(response.households.len(), 1);
        assert_eq!(response.households[0].id, household.id.to_string());
        assert_eq!(response.households[0].name, "Flat");
    }
}

mod get_schedule {
    use super::*;

    #[tokio::test]
    async fn marks_today_and_lists_due_todos() {
        let (server, db) = setup();
        let household = create_test_household(&db);
        let todo = create_test_todo(&db, &household, "Water", 1);

        let response = server
            .schedule(&GetScheduleRequest {
                household_id: household.id.to_string(),
                radius_days: Some(1),
            })
            .expect("Tool failed");

        assert_eq!(response.days[1].date, response.today);
        assert_eq!(response.days.len(), 3);
        assert!(!response.days[0].is_today);
        assert!(response.days[1].is_today);
        assert_eq!(response.days[1].due.len(), 1);
        assert_eq!(response.days[1].due[0].id, todo.id.to_string());
    }

    #[tokio::test]
    async fn defaults_to_three_days_either_side() {
        let (server, db) = setup();
        let household = create_test_household(&db);

        let response = server
            .schedule(&GetScheduleRequest {
                household_id: household.id.to_string(),
                radius_days: None,
            })
            .expect("Tool failed");

        assert_eq!(response.days.len(), 7);
    }

    #[tokio::test]
    async fn rejects_invalid_household_id() {
        let (server, _db) = setup();

        let result = server.schedule(&GetScheduleRequest {
            household_id: "not-a-uuid".to_string(),
            radius_days: None,
        });

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn rejects_oversized_radius() {
        let (server, db) = setup();
        let household = create_test_household(&db);

        let result = server.schedule(&GetScheduleRequest {
            household_id: household.id.to_string(),
            radius_days: Some(u32::MAX),
        });

        assert!(result.is_err());
    }
}

mod get_due_todos {
    use super::*;

    #[tokio::test]
    async fn projects_recurrence_forward() {
        let (server, db) = setup();
        let household = create_test_household(&db);
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        db.create_todo(
            household.id,
            CreateTodoInput {
                item_id: None,
                title: "Repot".to_string(),
                recurrence_days: 3,
                date_created: Some(created),
            },
        )
        .expect("Failed to create todo");

        let response = server
            .due_todos(&GetDueTodosRequest {
                household_id: household.id.to_string(),
                horizon_days: Some(4),
            })
            .expect("Tool failed");

        assert_eq!(response.days.len(), 4);
        for info in &response.days {
            let on_cycle = (day(info) - created.date_naive()).num_days() % 3 == 0;
            assert_eq!(info.due.len(), usize::from(on_cycle));
        }
        assert!(response.days.iter().any(|d| !d.due.is_empty()));
        assert!(response.days.iter().all(|d| d.done.is_empty()));
    }

    #[tokio::test]
    async fn rejects_zero_horizon() {
        let (server, db) = setup();
        let household = create_test_household(&db);

        let result = server.due_todos(&GetDueTodosRequest {
            household_id: household.id.to_string(),
            horizon_days: Some(0),
        });

        assert!(result.is_err());
    }
}

mod get_care_history {
    use super::*;

    #[tokio::test]
    async fn lists_todays_care_first() {
        let (server, db) = setup();
        let household = create_test_household(&db);
        let todo = create_test_todo(&db, &household, "Water", 2);
        let care = server
            .record_care(&LogCareRequest {
                household_id: household.id.to_string(),
                todo_id: todo.id.to_string(),
                note: None,
            })
            .expect("Tool failed");

        let response = server
            .care_history(&GetCareHistoryRequest {
                household_id: household.id.to_string(),
                horizon_days: Some(2),
            })
            .expect("Tool failed");

        assert_eq!(response.days.len(), 2);
        assert!(response.days[0].is_today);
        for info in &response.days {
            let expected = usize::from(day(info) == care_day(&care));
            assert_eq!(info.done.len(), expected);
        }
    }
}

mod render_schedule {
    use super::*;

    #[tokio::test]
    async fn renders_due_and_done_lines() {
        let (server, db) = setup();
        let household = create_test_household(&db);
        let water = create_test_todo(&db, &household, "Water fern", 1);
        create_test_todo(&db, &household, "Feed cat", 1);
        server
            .record_care(&LogCareRequest {
                household_id: household.id.to_string(),
                todo_id: water.id.to_string(),
                note: None,
            })
            .expect("Tool failed");

        let text = server
            .render_schedule_text(&GetScheduleRequest {
                household_id: household.id.to_string(),
                radius_days: Some(1),
            })
            .expect("Tool failed");

        assert!(text.contains("(today)"));
        assert!(text.contains("✓ Water fern"));
        assert!(text.contains("○ Feed cat"));
    }
}

mod create_todo {
    use super::*;

    #[tokio::test]
    async fn creates_todo_linked_to_item() {
        let (server, db) = setup();
        let household = create_test_household(&db);
        let item = db
            .create_item(
                household.id,
                CreateItemInput {
                    name: "Fern".to_string(),
                    description: None,
                },
            )
            .expect("Failed to create item");

        let todo = server
            .add_todo(&CreateTodoRequest {
                household_id: household.id.to_string(),
                title: "Water fern".to_string(),
                recurrence_days: 3,
                item_id: Some(item.id.to_string()),
            })
            .expect("Tool failed");

        assert_eq!(todo.title, "Water fern");
        assert_eq!(todo.item_id, Some(item.id.to_string()));
        assert_eq!(db.get_todos_by_household(household.id).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejects_zero_recurrence() {
        let (server, db) = setup();
        let household = create_test_household(&db);

        let result = server.add_todo(&CreateTodoRequest {
            household_id: household.id.to_string(),
            title: "Never".to_string(),
            recurrence_days: 0,
            item_id: None,
        });

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn rejects_unknown_household() {
        let (server, _db) = setup();

        let result = server.add_todo(&CreateTodoRequest {
            household_id: uuid::Uuid::new_v4().to_string(),
            title: "Water".to_string(),
            recurrence_days: 1,
            item_id: None,
        });

        assert!(result.is_err());
    }
}

mod log_care {
    use super::*;

    #[tokio::test]
    async fn records_care_and_clears_today() {
        let (server, db) = setup();
        let household = create_test_household(&db);
        let todo = create_test_todo(&db, &household, "Water", 2);

        let care = server
            .record_care(&LogCareRequest {
                household_id: household.id.to_string(),
                todo_id: todo.id.to_string(),
                note: Some("leaves perked up".to_string()),
            })
            .expect("Tool failed");
        assert_eq!(care.todo_id, todo.id.to_string());
        assert_eq!(care.note.as_deref(), Some("leaves perked up"));

        let due = server
            .due_todos(&GetDueTodosRequest {
                household_id: household.id.to_string(),
                horizon_days: Some(3),
            })
            .expect("Tool failed");
        let cared_on = care_day(&care);
        for info in &due.days {
            let since = (day(info) - cared_on).num_days();
            let expected = since > 0 && since % 2 == 0;
            assert_eq!(info.due.is_empty(), !expected);
        }
    }

    #[tokio::test]
    async fn rejects_todo_from_another_household() {
        let (server, db) = setup();
        let home = create_test_household(&db);
        let other = create_test_household(&db);
        let todo = create_test_todo(&db, &other, "Water", 2);

        let result = server.record_care(&LogCareRequest {
            household_id: home.id.to_string(),
            todo_id: todo.id.to_string(),
            note: None,
        });

        assert!(result.is_err());
    }
}
