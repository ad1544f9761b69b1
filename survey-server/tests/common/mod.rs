//! Common test utilities for survey server integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{json, Value};
use survey_core::{NewResponse, StoredResponse, Variant, Wizard, WizardSession};
use survey_server::store::{SessionId, StoreResult, VisitorSession};
use survey_server::{
    routes, AdminCredentials, AppState, InMemoryResponseStore, InMemorySessionStore,
    ResponseStore, SessionStore, SurveyError,
};

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "changeme";

/// Response store that refuses every write
#[derive(Default)]
pub struct FailingResponseStore;

impl ResponseStore for FailingResponseStore {
    fn insert(&self, _response: NewResponse) -> StoreResult<StoredResponse> {
        Err(SurveyError::Internal("database is locked".to_string()))
    }

    fn list(&self) -> StoreResult<Vec<StoredResponse>> {
        Ok(Vec::new())
    }
}

/// Session store that cannot write back a freshly reset wizard
#[derive(Default)]
pub struct ResetFailingSessionStore {
    inner: InMemorySessionStore,
}

impl SessionStore for ResetFailingSessionStore {
    fn create(&self) -> StoreResult<VisitorSession> {
        self.inner.create()
    }

    fn get(&self, session_id: &SessionId) -> StoreResult<Option<VisitorSession>> {
        self.inner.get(session_id)
    }

    fn save(&self, session: &VisitorSession) -> StoreResult<()> {
        if session.wizard == WizardSession::default() {
            return Err(SurveyError::Internal("disk I/O error".to_string()));
        }
        self.inner.save(session)
    }

    fn cleanup_expired(&self, max_age_minutes: i64) -> StoreResult<u64> {
        self.inner.cleanup_expired(max_age_minutes)
    }
}

fn admin() -> AdminCredentials {
    // Minimum bcrypt cost keeps the tests fast
    AdminCredentials::with_cost(ADMIN_USER, ADMIN_PASS, 4).expect("Failed to hash password")
}

fn build_server<S, R>(variant: Variant, sessions: S, responses: R) -> TestServer
where
    S: SessionStore + 'static,
    R: ResponseStore + 'static,
{
    let state = Arc::new(AppState::new(Wizard::new(variant), admin(), sessions, responses));

    let app = routes::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Create a test server and keep a handle on its response store
pub fn create_test_server(variant: Variant) -> (TestServer, Arc<InMemoryResponseStore>) {
    let responses = Arc::new(InMemoryResponseStore::new());
    let server = build_server(variant, InMemorySessionStore::new(), responses.clone());
    (server, responses)
}

/// Create a test server whose response store always fails
pub fn create_failing_server() -> TestServer {
    build_server(Variant::Full, InMemorySessionStore::new(), FailingResponseStore)
}

/// Create a test server that stores responses but cannot reset a wizard
pub fn create_reset_failing_server() -> (TestServer, Arc<InMemoryResponseStore>) {
    let responses = Arc::new(InMemoryResponseStore::new());
    let server = build_server(
        Variant::Full,
        ResetFailingSessionStore::default(),
        responses.clone(),
    );
    (server, responses)
}

/// A browser with a session cookie and its anti-forgery token
pub struct Visitor {
    pub session: String,
    pub csrf: String,
}

impl Visitor {
    pub fn cookie(&self) -> cookie::Cookie<'static> {
        cookie::Cookie::new(survey_server::routes::SESSION_COOKIE, self.session.clone())
    }
}

/// Start a session and read its token from the session context
pub async fn start_visitor(server: &TestServer) -> Visitor {
    let response = server.get("/session").await;
    assert_eq!(response.status_code(), 200);

    let session = response
        .maybe_cookie(survey_server::routes::SESSION_COOKIE)
        .expect("No session cookie")
        .value()
        .to_string();
    let body: Value = response.json();
    let csrf = body["csrf_token"].as_str().expect("No csrf token").to_string();

    Visitor { session, csrf }
}

/// POST a step with the visitor's cookie and token merged into `fields`
pub async fn post_step(
    server: &TestServer,
    visitor: &Visitor,
    step: u8,
    fields: Value,
) -> axum_test::TestResponse {
    let mut body = fields;
    body["_csrf"] = json!(visitor.csrf);

    server
        .post(&format!("/step/{step}"))
        .add_cookie(visitor.cookie())
        .json(&body)
        .await
}

/// GET a path with the visitor's cookie
pub async fn get(server: &TestServer, visitor: &Visitor, path: &str) -> axum_test::TestResponse {
    server.get(path).add_cookie(visitor.cookie()).await
}

pub fn location(response: &axum_test::TestResponse) -> String {
    response
        .headers()
        .get("location")
        .expect("No location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// Submit valid answers for steps 1-4
pub async fn complete_scalar_steps(server: &TestServer, visitor: &Visitor, store_type: &str) {
    let mut perception = json!({ "brand_perception": "Agree" });
    if store_type == "Baby Store" {
        perception["primary_diaper_brand"] = json!("Huggies");
    }

    let steps = [
        (
            1,
            json!({ "name": "Nguyễn Thị Lan", "role": "Owner", "store_type": store_type }),
        ),
        (2, json!({ "satisfaction": "4", "frequency": "Weekly" })),
        (3, perception),
        (4, json!({ "open_feedback": "Giao hàng nhanh" })),
    ];

    for (step, fields) in steps {
        let response = post_step(server, visitor, step, fields).await;
        assert_eq!(response.status_code(), 303, "step {step} rejected");
    }
}

/// Log in as admin and return the admin's visitor
pub async fn login_admin(server: &TestServer) -> Visitor {
    let visitor = start_visitor(server).await;

    let response = server
        .post("/admin/login")
        .add_cookie(visitor.cookie())
        .json(&json!({
            "_csrf": visitor.csrf,
            "username": ADMIN_USER,
            "password": ADMIN_PASS,
        }))
        .await;
    assert_eq!(response.status_code(), 303);

    visitor
}
