//! Tests for running the survey on the SQLite store

mod common;

use std::sync::Arc;

use axum_test::TestServer;
use common::{complete_scalar_steps, location, post_step, start_visitor};
use serde_json::json;
use survey_core::{Variant, Wizard};
use survey_server::{routes, AdminCredentials, AppState, ResponseStore, SessionStore, SqliteStore};
use tempfile::TempDir;

fn create_sqlite_server(path: &str) -> (TestServer, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::open(path).unwrap());
    let state = Arc::new(AppState::new(
        Wizard::new(Variant::Full),
        AdminCredentials::with_cost("admin", "changeme", 4).unwrap(),
        store.clone(),
        store.clone(),
    ));
    let server = TestServer::new(routes::create_router(state)).unwrap();
    (server, store)
}

/// Test: one database file backs sessions and responses
#[tokio::test]
async fn test_survey_persists_to_sqlite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("survey.db");
    let path = path.to_str().unwrap();

    {
        let (server, _) = create_sqlite_server(path);
        let visitor = start_visitor(&server).await;
        complete_scalar_steps(&server, &visitor, "Grocery").await;

        post_step(&server, &visitor, 5, json!({ "brands": ["5"] })).await;
        post_step(&server, &visitor, 6, json!({ "channels": ["6"] })).await;
        let response = post_step(&server, &visitor, 7, json!({ "ratings": { "5": "2" } })).await;
        assert_eq!(location(&response), "/thanks");
    }

    let store = SqliteStore::open(path).unwrap();
    let stored = store.list().unwrap();
    assert_eq!(stored.len(), 1);
    let brands = stored[0].extras.brand_answers().unwrap();
    assert_eq!(brands.brand_selection, vec![5]);
    assert_eq!(brands.channels_by_brand[&5].codes, vec![6]);
    assert_eq!(brands.ratings_by_brand[&5], 2);
}

/// Test: wizard progress lives in the database, not in the process
#[tokio::test]
async fn test_session_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("survey.db");
    let path = path.to_str().unwrap();

    let visitor = {
        let (server, _) = create_sqlite_server(path);
        let visitor = start_visitor(&server).await;
        complete_scalar_steps(&server, &visitor, "Pharmacy").await;
        visitor
    };

    let (server, store) = create_sqlite_server(path);
    let response = server.get("/").add_cookie(visitor.cookie()).await;
    assert_eq!(location(&response), "/step/5");

    assert_eq!(store.cleanup_expired(-1).unwrap(), 1);
    let response = server.get("/").add_cookie(visitor.cookie()).await;
    assert_eq!(location(&response), "/step/1");
}

/// Test: in-memory databases work for throwaway runs
#[test]
fn test_memory_database() {
    let store = SqliteStore::open(":memory:").unwrap();
    assert!(store.list().unwrap().is_empty());
    let session = store.create().unwrap();
    assert!(store.get(&session.id).unwrap().is_some());
}
