//! Visitor session context and cookie helpers

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};
use tower_cookies::{Cookie, Cookies};

use crate::error::SurveyError;
use crate::state::AppState;
use crate::store::{ResponseStore, SessionId, SessionStore, StoreResult, VisitorSession};

pub const SESSION_COOKIE: &str = "survey_session";

#[derive(Serialize)]
pub struct SessionContext {
    pub csrf_token: String,
    pub allowed_step: u8,
    pub total_steps: u8,
    pub is_admin: bool,
    pub server_time: i64,
}

/// GET /session
///
/// Starts a session when the visitor has none, so a client can pick up its
/// anti-forgery token before the first POST.
pub async fn get_session_context<S, R>(
    State(state): State<Arc<AppState<S, R>>>,
    cookies: Cookies,
) -> Result<Json<SessionContext>, SurveyError>
where
    S: SessionStore,
    R: ResponseStore,
{
    let session = load_or_create_session(&cookies, &state.session_store)?;

    Ok(Json(SessionContext {
        csrf_token: session.csrf_token,
        allowed_step: state.wizard.allowed_step(&session.wizard).number(),
        total_steps: state.wizard.variant().total_steps(),
        is_admin: session.is_admin,
        server_time: chrono::Utc::now().timestamp(),
    }))
}

/// Helper to get current session from cookies
pub fn get_session_from_cookies<S: SessionStore>(
    cookies: &Cookies,
    session_store: &S,
) -> StoreResult<Option<VisitorSession>> {
    match cookies.get(SESSION_COOKIE) {
        Some(c) => session_store.get(&SessionId(c.value().to_string())),
        None => Ok(None),
    }
}

/// Current session, or a fresh one with its cookie set
pub fn load_or_create_session<S: SessionStore>(
    cookies: &Cookies,
    session_store: &S,
) -> StoreResult<VisitorSession> {
    if let Some(session) = get_session_from_cookies(cookies, session_store)? {
        return Ok(session);
    }

    let session = session_store.create()?;
    tracing::debug!(session_id = %session.id.0, "Started visitor session");
    set_session_cookie(cookies, &session.id.0);
    Ok(session)
}

/// Field name every POST carries its anti-forgery token in
pub const CSRF_FIELD: &str = "_csrf";

/// Decode a POST body into its fields without judging them.
///
/// Anything that is not a JSON object decodes to no fields, so a malformed
/// body fails the token check instead of the body parser.
pub fn body_fields(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(fields)) => fields,
        _ => Map::new(),
    }
}

/// The `_csrf` field of a decoded body
pub fn csrf_field(fields: &Map<String, Value>) -> Option<&str> {
    fields.get(CSRF_FIELD).and_then(Value::as_str)
}

/// Reject a POST whose `_csrf` does not match the session token
pub fn verify_csrf(session: Option<&VisitorSession>, token: Option<&str>) -> Result<(), SurveyError> {
    match (session, token) {
        (Some(session), Some(token)) if !token.is_empty() && token == session.csrf_token => Ok(()),
        _ => {
            tracing::warn!("Rejected request with missing or mismatched CSRF token");
            Err(SurveyError::InvalidCsrf)
        }
    }
}

/// Helper to set session cookie
pub fn set_session_cookie(cookies: &Cookies, session_id: &str) {
    let cookie = Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true)
        .build();
    cookies.add(cookie);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> VisitorSession {
        VisitorSession::new(SessionId("sid".to_string()), "token-1".to_string())
    }

    #[test]
    fn test_verify_csrf() {
        let session = session();
        assert!(verify_csrf(Some(&session), Some("token-1")).is_ok());
        assert!(verify_csrf(Some(&session), Some("token-2")).is_err());
        assert!(verify_csrf(Some(&session), None).is_err());
        assert!(verify_csrf(None, Some("token-1")).is_err());
    }

    #[test]
    fn test_body_fields() {
        let fields = body_fields(br#"{"_csrf": "token-1", "satisfaction": 3}"#);
        assert_eq!(csrf_field(&fields), Some("token-1"));

        let fields = body_fields(br#"{"_csrf": 42}"#);
        assert_eq!(csrf_field(&fields), None);

        assert!(body_fields(b"satisfaction=3").is_empty());
        assert!(body_fields(b"[1, 2]").is_empty());
        assert!(body_fields(b"").is_empty());
    }

    #[test]
    fn test_empty_token_never_matches() {
        let session = VisitorSession::new(SessionId("sid".to_string()), String::new());
        assert!(verify_csrf(Some(&session), Some("")).is_err());
    }
}
