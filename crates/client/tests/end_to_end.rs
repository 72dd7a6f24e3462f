//! The store driven over real HTTP against the full server stack, backed by
//! a fresh migrated SQLite database per test.

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use taskboard_client::{ClientConfig, ClientError, HttpApi, ProjectApi, ProjectStore, TaskSlot};
use taskboard_core::project::{Category, CreateProject, UpdateProject};
use taskboard_core::task::{CreateTask, TaskStatus, UpdateTask};

use taskboard_api::config::ServerConfig;
use taskboard_api::router::build_app_router;
use taskboard_api::state::AppState;

/// Serve the application on an ephemeral local port and return its address.
async fn spawn_server(pool: SqlitePool) -> SocketAddr {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        db_max_connections: 1,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    };
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    let app = build_app_router(state, &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn store_for(pool: SqlitePool) -> ProjectStore<HttpApi> {
    let addr = spawn_server(pool).await;
    let config = ClientConfig {
        api_url: format!("http://{addr}/api/"),
        timeout_secs: 10,
    };
    ProjectStore::new(HttpApi::from_config(&config).unwrap())
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_trip_scenario_over_http(pool: SqlitePool) {
    let store = store_for(pool).await;
    let now = Utc::now();

    store.fetch_projects().await.unwrap();
    assert!(store.projects().await.is_empty());

    let trip = store
        .create_project(&CreateProject::new("Trip", Category::Personal))
        .await
        .unwrap();
    assert_eq!(trip.category, Category::Personal);

    let flight = store
        .create_task(
            trip.id,
            &CreateTask::new("Book flight").due(now + Duration::days(2)),
        )
        .await
        .unwrap();
    assert_eq!(flight.status, TaskStatus::ToDo);
    assert_eq!(flight.project_id, trip.id);

    let summary = store.dashboard(now).await;
    assert_eq!(summary.total_projects, 1);
    assert_eq!(summary.total_tasks, 1);
    assert_eq!(summary.status_counts.to_do, 1);
    assert_eq!(summary.upcoming.len(), 1);
    assert_eq!(summary.upcoming[0].project_name, "Trip");

    store
        .update_task(flight.id, &UpdateTask::status(TaskStatus::Completed))
        .await
        .unwrap();
    assert!(store.dashboard(now).await.upcoming.is_empty());

    store.delete_project(trip.id).await.unwrap();
    assert!(store.get_project_by_id(trip.id).await.is_none());
    let summary = store.dashboard(now).await;
    assert_eq!(summary.total_projects, 0);
    assert_eq!(summary.total_tasks, 0);

    // The cascade removed the task on the server too.
    let err = store.api().update_task(flight.id, &UpdateTask::default()).await;
    assert!(err.unwrap_err().is_not_found());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_cache_matches_fresh_list(pool: SqlitePool) {
    let store = store_for(pool).await;
    store.fetch_projects().await.unwrap();

    let a = store
        .create_project(&CreateProject::new("A", Category::Work))
        .await
        .unwrap();
    store
        .create_project(&CreateProject::new("B", Category::Family))
        .await
        .unwrap();
    store
        .update_project(
            a.id,
            &UpdateProject {
                name: Some("A2".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut cached: Vec<_> = store
        .projects()
        .await
        .into_iter()
        .map(|entry| entry.project)
        .collect();
    let mut fresh = store.api().list_projects().await.unwrap();
    cached.sort_by_key(|p| p.id);
    fresh.sort_by_key(|p| p.id);
    assert_eq!(cached, fresh);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_server_errors_map_to_client_errors(pool: SqlitePool) {
    let store = store_for(pool).await;

    let err = store.load_project(424_242).await.unwrap_err();
    assert!(err.is_not_found());

    let err = store
        .create_task(424_242, &CreateTask::new("Orphan"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = store
        .create_project(&CreateProject::new("  ", Category::Other))
        .await
        .unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 400);
            assert!(!message.is_empty());
        }
        other => panic!("expected a 400 API error, got {other:?}"),
    }
    assert!(store.projects().await.is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_load_project_returns_tasks_in_due_order(pool: SqlitePool) {
    let store = store_for(pool).await;
    let now = Utc::now();
    let project = store
        .create_project(&CreateProject::new("Home", Category::Personal))
        .await
        .unwrap();
    for (title, due) in [
        ("undated", None),
        ("later", Some(now + Duration::days(3))),
        ("sooner", Some(now + Duration::hours(5))),
    ] {
        let input = CreateTask {
            due_date: due,
            ..CreateTask::new(title)
        };
        store.api().create_task(project.id, &input).await.unwrap();
    }

    let entry = store.load_project(project.id).await.unwrap();
    let titles: Vec<_> = entry
        .tasks
        .loaded()
        .unwrap()
        .iter()
        .map(|t| t.title.clone())
        .collect();
    assert_eq!(titles, vec!["sooner", "later", "undated"]);

    let cached = store.get_project_by_id(project.id).await.unwrap();
    assert!(matches!(cached.tasks, TaskSlot::Loaded(ref tasks) if tasks.len() == 3));
}
