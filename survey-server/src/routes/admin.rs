//! Admin login, dashboard and export endpoints

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use survey_core::{export, DashboardSummary, ExportMode};
use tower_cookies::Cookies;

use super::session::{
    body_fields, csrf_field, get_session_from_cookies, load_or_create_session, verify_csrf,
};
use crate::error::SurveyError;
use crate::state::AppState;
use crate::store::{ResponseStore, SessionStore, VisitorSession};

const LOGIN_PATH: &str = "/admin/login";

#[derive(Serialize)]
pub struct LoginView {
    pub csrf_token: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub mode: ExportMode,
}

/// The current session if it belongs to a logged-in admin
fn admin_session<S: SessionStore>(
    cookies: &Cookies,
    session_store: &S,
) -> Result<Option<VisitorSession>, SurveyError> {
    Ok(get_session_from_cookies(cookies, session_store)?.filter(|s| s.is_admin))
}

/// GET /admin/login
pub async fn login_page<S, R>(
    State(state): State<Arc<AppState<S, R>>>,
    cookies: Cookies,
) -> Result<Response, SurveyError>
where
    S: SessionStore,
    R: ResponseStore,
{
    let session = load_or_create_session(&cookies, &state.session_store)?;
    if session.is_admin {
        return Ok(Redirect::to("/admin").into_response());
    }

    Ok(Json(LoginView {
        csrf_token: session.csrf_token,
    })
    .into_response())
}

/// POST /admin/login
pub async fn login<S, R>(
    State(state): State<Arc<AppState<S, R>>>,
    cookies: Cookies,
    body: Bytes,
) -> Result<Redirect, SurveyError>
where
    S: SessionStore,
    R: ResponseStore,
{
    let fields = body_fields(&body);
    let session = get_session_from_cookies(&cookies, &state.session_store)?;
    verify_csrf(session.as_ref(), csrf_field(&fields))?;
    let Some(mut session) = session else {
        return Err(SurveyError::InvalidCsrf);
    };

    // Wrongly typed fields count as a failed login
    let req: LoginRequest = serde_json::from_value(Value::Object(fields)).unwrap_or_default();

    let valid = state
        .admin
        .verify(req.username.trim(), &req.password)
        .map_err(|e| SurveyError::Internal(e.to_string()))?;

    if !valid {
        tracing::warn!(username = %req.username, "Failed admin login");
        return Err(SurveyError::InvalidCredentials);
    }

    session.is_admin = true;
    state.session_store.save(&session)?;
    tracing::info!(username = %state.admin.username, "Admin logged in");

    Ok(Redirect::to("/admin"))
}

/// GET /admin/logout
pub async fn logout<S, R>(
    State(state): State<Arc<AppState<S, R>>>,
    cookies: Cookies,
) -> Result<Redirect, SurveyError>
where
    S: SessionStore,
    R: ResponseStore,
{
    // Keep the session itself so an unfinished survey survives logout
    if let Some(mut session) = admin_session(&cookies, &state.session_store)? {
        session.is_admin = false;
        state.session_store.save(&session)?;
    }

    Ok(Redirect::to(LOGIN_PATH))
}

/// GET /admin
pub async fn dashboard<S, R>(
    State(state): State<Arc<AppState<S, R>>>,
    cookies: Cookies,
) -> Result<Response, SurveyError>
where
    S: SessionStore,
    R: ResponseStore,
{
    if admin_session(&cookies, &state.session_store)?.is_none() {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    }

    let responses = state.response_store.list()?;
    Ok(Json(DashboardSummary::compute(&responses)).into_response())
}

/// GET /admin/export?mode=value|text
pub async fn export_csv<S, R>(
    State(state): State<Arc<AppState<S, R>>>,
    cookies: Cookies,
    Query(query): Query<ExportQuery>,
) -> Result<Response, SurveyError>
where
    S: SessionStore,
    R: ResponseStore,
{
    if admin_session(&cookies, &state.session_store)?.is_none() {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    }

    let responses = state.response_store.list()?;
    let body = export::to_csv_bytes(&responses, query.mode)?;
    tracing::info!(mode = %query.mode, rows = responses.len(), "Exported responses");

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", query.mode.filename()),
        ),
    ];
    Ok((headers, body).into_response())
}
