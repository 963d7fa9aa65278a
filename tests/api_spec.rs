use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::json;
use tend::api::{create_router, create_router_with_security, SecurityConfig};
use tend::db::Database;
use tend::models::*;

fn setup() -> TestServer {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let app = create_router(db);
    TestServer::new(app).expect("Failed to create test server")
}

async fn create_test_household(server: &TestServer) -> Household {
    server
        .post("/api/v1/households")
        .json(&CreateHouseholdInput {
            name: "Flat".to_string(),
        })
        .await
        .json::<Household>()
}

async fn create_test_todo(server: &TestServer, household: &Household, title: &str, every: u32) -> Todo {
    server
        .post(&format!("/api/v1/households/{}/todos", household.id))
        .json(&json!({ "title": title, "recurrence_days": every }))
        .await
        .json::<Todo>()
}

mod households {
    use super::*;

    #[tokio::test]
    async fn creates_and_lists_households() {
        let server = setup();

        let response = server
            .post("/api/v1/households")
            .json(&CreateHouseholdInput {
                name: "Cottage".to_string(),
            })
            .await;
        response.assert_status(StatusCode::CREATED);

        let households: Vec<Household> = server.get("/api/v1/households").await.json();
        assert_eq!(households.len(), 1);
        assert_eq!(households[0].name, "Cottage");
    }

    #[tokio::test]
    async fn returns_404_for_unknown_household() {
        let server = setup();

        let response = server
            .get(&format!("/api/v1/households/{}", uuid::Uuid::new_v4()))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn delete_removes_household() {
        let server = setup();
        let household = create_test_household(&server).await;

        server
            .delete(&format!("/api/v1/households/{}", household.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get(&format!("/api/v1/households/{}", household.id))
            .await
            .assert_status_not_found();
    }
}

mod items {
    use super::*;

    #[tokio::test]
    async fn creates_items_and_links_todos() {
        let server = setup();
        let household = create_test_household(&server).await;

        let item: Item = server
            .post(&format!("/api/v1/households/{}/items", household.id))
            .json(&CreateItemInput {
                name: "Fern".to_string(),
                description: Some("hallway".to_string()),
            })
            .await
            .json();

        let response = server
            .post(&format!("/api/v1/households/{}/todos", household.id))
            .json(&json!({
                "title": "Water fern",
                "recurrence_days": 3,
                "item_id": item.id,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let todo: Todo = response.json();
        assert_eq!(todo.item_id, Some(item.id));

        let items: Vec<Item> = server
            .get(&format!("/api/v1/households/{}/items", household.id))
            .await
            .json();
        assert_eq!(items, vec![item]);
    }
}

mod todos {
    use super::*;

    #[tokio::test]
    async fn rejects_zero_recurrence() {
        let server = setup();
        let household = create_test_household(&server).await;

        let response = server
            .post(&format!("/api/v1/households/{}/todos", household.id))
            .json(&json!({ "title": "Never", "recurrence_days": 0 }))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn rejects_negative_recurrence() {
        let server = setup();
        let household = create_test_household(&server).await;

        let response = server
            .post(&format!("/api/v1/households/{}/todos", household.id))
            .json(&json!({ "title": "Backwards", "recurrence_days": -2 }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn updates_recurrence() {
        let server = setup();
        let household = create_test_household(&server).await;
        let todo = create_test_todo(&server, &household, "Water", 3).await;

        let response = server
            .put(&format!("/api/v1/todos/{}", todo.id))
            .json(&json!({ "recurrence_days": 7 }))
            .await;

        response.assert_status_ok();
        let updated: Todo = response.json();
        assert_eq!(updated.recurrence_days, 7);
        assert_eq!(updated.title, "Water");
    }

    #[tokio::test]
    async fn returns_404_for_unknown_todo() {
        let server = setup();

        server
            .get(&format!("/api/v1/todos/{}", uuid::Uuid::new_v4()))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn returns_404_when_listing_todos_of_unknown_household() {
        let server = setup();

        server
            .get(&format!("/api/v1/households/{}/todos", uuid::Uuid::new_v4()))
            .await
            .assert_status_not_found();
    }
}

mod cares {
    use super::*;

    #[tokio::test]
    async fn logs_care_with_note() {
        let server = setup();
        let household = create_test_household(&server).await;
        let todo = create_test_todo(&server, &household, "Water", 3).await;

        let response = server
            .post(&format!("/api/v1/households/{}/cares", household.id))
            .json(&json!({ "todo_id": todo.id, "note": "drooping" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let care: Care = response.json();
        assert_eq!(care.todo_id, todo.id);
        assert_eq!(care.note.as_deref(), Some("drooping"));

        let cares: Vec<Care> = server
            .get(&format!("/api/v1/todos/{}/cares", todo.id))
            .await
            .json();
        assert_eq!(cares, vec![care]);
    }

    #[tokio::test]
    async fn rejects_care_for_todo_in_another_household() {
        let server = setup();
        let home = create_test_household(&server).await;
        let other = create_test_household(&server).await;
        let todo = create_test_todo(&server, &other, "Water", 3).await;

        let response = server
            .post(&format!("/api/v1/households/{}/cares", home.id))
            .json(&json!({ "todo_id": todo.id }))
            .await;

        response.assert_status_bad_request();
    }
}

mod schedule_views {
    use super::*;

    /// Noon on a fixed past day, so cycles do not depend on when the test runs.
    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn on_cycle(date: NaiveDate, every: i64) -> bool {
        (date - anchor().date_naive()).num_days() % every == 0
    }

    async fn create_anchored_todo(server: &TestServer, household: &Household, every: u32) -> Todo {
        server
            .post(&format!("/api/v1/households/{}/todos", household.id))
            .json(&json!({
                "title": "Water",
                "recurrence_days": every,
                "date_created": anchor(),
            }))
            .await
            .json::<Todo>()
    }

    #[tokio::test]
    async fn due_follows_the_recurrence() {
        let server = setup();
        let household = create_test_household(&server).await;
        let todo = create_anchored_todo(&server, &household, 2).await;

        let response = server
            .get(&format!("/api/v1/households/{}/due", household.id))
            .add_query_param("horizon", 5)
            .await;

        response.assert_status_ok();
        let days: Vec<DueDay> = response.json();
        assert_eq!(days.len(), 5);
        for (offset, day) in days.iter().enumerate() {
            assert_eq!(day.date, days[0].date + Duration::days(offset as i64));
            if on_cycle(day.date, 2) {
                assert_eq!(day.todos, vec![todo.clone()]);
            } else {
                assert!(day.todos.is_empty());
            }
        }
    }

    #[tokio::test]
    async fn due_skips_todo_on_its_care_day() {
        let server = setup();
        let household = create_test_household(&server).await;
        let todo = create_anchored_todo(&server, &household, 1).await;
        let care: Care = server
            .post(&format!("/api/v1/households/{}/cares", household.id))
            .json(&json!({ "todo_id": todo.id }))
            .await
            .json();

        let days: Vec<DueDay> = server
            .get(&format!("/api/v1/households/{}/due", household.id))
            .add_query_param("horizon", 3)
            .await
            .json();

        let cared_on = care.date_created.date_naive();
        for day in &days {
            if day.date == cared_on {
                assert!(day.todos.is_empty());
            } else {
                assert_eq!(day.todos, vec![todo.clone()]);
            }
        }
    }

    #[tokio::test]
    async fn rejects_zero_horizon() {
        let server = setup();
        let household = create_test_household(&server).await;

        for view in ["due", "history"] {
            server
                .get(&format!("/api/v1/households/{}/{}", household.id, view))
                .add_query_param("horizon", 0)
                .await
                .assert_status_bad_request();
        }
    }

    #[tokio::test]
    async fn rejects_oversized_window() {
        let server = setup();
        let household = create_test_household(&server).await;

        server
            .get(&format!("/api/v1/households/{}/schedule", household.id))
            .add_query_param("radius", 100_000)
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let server = setup();
        let household = create_test_household(&server).await;
        let todo = create_anchored_todo(&server, &household, 1).await;
        let care: Care = server
            .post(&format!("/api/v1/households/{}/cares", household.id))
            .json(&json!({ "todo_id": todo.id, "date_created": Utc::now() - Duration::days(2) }))
            .await
            .json();

        let days: Vec<CareDay> = server
            .get(&format!("/api/v1/households/{}/history", household.id))
            .add_query_param("horizon", 5)
            .await
            .json();

        assert_eq!(days.len(), 5);
        assert!(days.windows(2).all(|pair| pair[0].date > pair[1].date));
        for day in &days {
            if day.date == care.date_created.date_naive() {
                assert_eq!(day.cares, vec![care.clone()]);
            } else {
                assert!(day.cares.is_empty());
            }
        }
    }

    #[tokio::test]
    async fn schedule_centers_on_today() {
        let server = setup();
        let household = create_test_household(&server).await;
        let todo = create_anchored_todo(&server, &household, 1).await;

        let response = server
            .get(&format!("/api/v1/households/{}/schedule", household.id))
            .add_query_param("radius", 2)
            .await;

        response.assert_status_ok();
        let entries: Vec<ScheduleEntry> = response.json();
        assert_eq!(entries.len(), 5);
        assert!(entries.windows(2).all(|pair| pair[0].date < pair[1].date));
        assert!(entries[..2].iter().all(|entry| entry.todos.is_empty()));
        assert!(entries[2..].iter().all(|entry| entry.todos == vec![todo.clone()]));
    }

    #[tokio::test]
    async fn schedule_defaults_to_three_days_either_side() {
        let server = setup();
        let household = create_test_household(&server).await;

        let entries: Vec<ScheduleEntry> = server
            .get(&format!("/api/v1/households/{}/schedule", household.id))
            .await
            .json();

        assert_eq!(entries.len(), 7);
    }

    #[tokio::test]
    async fn returns_404_for_unknown_household() {
        let server = setup();

        server
            .get(&format!("/api/v1/households/{}/schedule", uuid::Uuid::new_v4()))
            .await
            .assert_status_not_found();
    }
}

mod security {
    use super::*;

    fn secured_server() -> TestServer {
        let db = Database::open_memory().expect("Failed to create database");
        db.migrate().expect("Failed to migrate");
        let app = create_router_with_security(db, SecurityConfig::with_api_key("secret"));
        TestServer::new(app).expect("Failed to create test server")
    }

    #[tokio::test]
    async fn rejects_requests_without_token() {
        let server = secured_server();

        server
            .get("/api/v1/households")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejects_wrong_token() {
        let server = secured_server();

        server
            .get("/api/v1/households")
            .authorization_bearer("guess")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn accepts_matching_token() {
        let server = secured_server();

        server
            .get("/api/v1/households")
            .authorization_bearer("secret")
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn rate_limits_after_the_budget() {
        let db = Database::open_memory().expect("Failed to create database");
        db.migrate().expect("Failed to migrate");
        let app = create_router_with_security(db, SecurityConfig::with_rate_limit(2));
        let server = TestServer::new(app).expect("Failed to create test server");

        server.get("/api/v1/health").await.assert_status_ok();
        server.get("/api/v1/health").await.assert_status_ok();
        server
            .get("/api/v1/health")
            .await
            .assert_status(StatusCode::TOO_MANY_REQUESTS);
    }
}

mod cors {
    use super::*;
    use axum::http::{header, HeaderValue, Method};

    fn server_with_origins(api_key: Option<&str>) -> TestServer {
        let db = Database::open_memory().expect("Failed to create database");
        db.migrate().expect("Failed to migrate");
        let security = SecurityConfig {
            api_key: api_key.map(String::from),
            cors_origins: Some(vec!["https://home.example".to_string()]),
            rate_limiter: None,
        };
        TestServer::new(create_router_with_security(db, security))
            .expect("Failed to create test server")
    }

    fn preflight(server: &TestServer, origin: &'static str) -> axum_test::TestRequest {
        server
            .method(Method::OPTIONS, "/api/v1/households")
            .add_header(header::ORIGIN, HeaderValue::from_static(origin))
            .add_header(
                header::ACCESS_CONTROL_REQUEST_METHOD,
                HeaderValue::from_static("GET"),
            )
    }

    #[tokio::test]
    async fn preflight_allows_listed_origin() {
        let server = server_with_origins(None);

        let response = preflight(&server, "https://home.example").await;

        response.assert_status_ok();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("https://home.example"))
        );
    }

    #[tokio::test]
    async fn preflight_omits_unlisted_origin() {
        let server = server_with_origins(None);

        let response = preflight(&server, "https://elsewhere.example").await;

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn preflight_needs_no_api_key() {
        let server = server_with_origins(Some("secret"));

        let response = preflight(&server, "https://home.example").await;

        response.assert_status_ok();
    }
}
