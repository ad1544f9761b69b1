//! Survey wizard endpoints

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use survey_core::{Entry, FieldError, Outcome, Step, StepForm, StepView};
use tower_cookies::Cookies;

use super::session::{
    body_fields, csrf_field, get_session_from_cookies, load_or_create_session, verify_csrf,
};
use crate::error::SurveyError;
use crate::state::AppState;
use crate::store::{ResponseStore, SessionStore};

/// A step view plus the token the next POST must echo
#[derive(Serialize)]
pub struct PageView {
    pub csrf_token: String,
    #[serde(flatten)]
    pub view: StepView,
}

#[derive(Serialize)]
pub struct ThanksView {
    pub success: bool,
    pub message: &'static str,
}

fn step_path(step: Step) -> String {
    format!("/step/{}", step.number())
}

/// GET /
pub async fn home<S, R>(
    State(state): State<Arc<AppState<S, R>>>,
    cookies: Cookies,
) -> Result<Redirect, SurveyError>
where
    S: SessionStore,
    R: ResponseStore,
{
    let session = load_or_create_session(&cookies, &state.session_store)?;
    let allowed = state.wizard.allowed_step(&session.wizard);
    Ok(Redirect::to(&step_path(allowed)))
}

/// GET /step/:step
pub async fn get_step<S, R>(
    State(state): State<Arc<AppState<S, R>>>,
    cookies: Cookies,
    Path(step): Path<u8>,
) -> Result<Response, SurveyError>
where
    S: SessionStore,
    R: ResponseStore,
{
    let step = state.wizard.step(step)?;
    let mut session = load_or_create_session(&cookies, &state.session_store)?;
    let before = session.wizard.clone();

    match state.wizard.enter(&mut session.wizard, step) {
        Entry::Show(view) => Ok(Json(PageView {
            csrf_token: session.csrf_token,
            view,
        })
        .into_response()),
        Entry::Redirect(target) => {
            // Only an exhausted channel loop moves the visitor on
            if session.wizard != before {
                state.session_store.save(&session)?;
            }
            tracing::debug!(requested = %step, target = %target, "Redirecting step request");
            Ok(Redirect::to(&step_path(target)).into_response())
        }
    }
}

/// POST /step/:step
///
/// The body is read as raw bytes so the token is checked before anything
/// else looks at it.
pub async fn post_step<S, R>(
    State(state): State<Arc<AppState<S, R>>>,
    cookies: Cookies,
    Path(step): Path<u8>,
    body: Bytes,
) -> Result<Response, SurveyError>
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
    let step = state.wizard.step(step)?;

    let form = match StepForm::from_value(Value::Object(fields)) {
        Ok(form) => form,
        Err(e) => {
            if let Some(target) = state.wizard.guard(&session.wizard, step) {
                return Ok(Redirect::to(&step_path(target)).into_response());
            }
            tracing::debug!(step = %step, error = %e, "Malformed step submission");
            let errors = vec![FieldError::new("form", "Dữ liệu gửi lên không hợp lệ.")];
            let view = state.wizard.view(&session.wizard, step, errors);
            return Ok(unprocessable(session.csrf_token, view));
        }
    };

    match state.wizard.submit(&mut session.wizard, step, &form) {
        Outcome::Redirect(target) => Ok(Redirect::to(&step_path(target)).into_response()),
        Outcome::Invalid(view) => {
            tracing::debug!(step = %step, errors = view.errors.len(), "Step submission rejected");
            Ok(unprocessable(session.csrf_token, view))
        }
        Outcome::Advance(next) => {
            state.session_store.save(&session)?;
            Ok(Redirect::to(&step_path(next)).into_response())
        }
        Outcome::Complete(response) => {
            // The wizard is only reset once the response is safely stored
            let stored = state.response_store.insert(response)?;
            tracing::info!(response_id = stored.id.0, "Survey response stored");

            // The row is written; a failed reset must not invite a resubmission
            session.wizard.reset();
            if let Err(e) = state.session_store.save(&session) {
                tracing::warn!(
                    response_id = stored.id.0,
                    error = %e,
                    "Stored response but could not reset the wizard"
                );
            }
            Ok(Redirect::to("/thanks").into_response())
        }
    }
}

fn unprocessable(csrf_token: String, view: StepView) -> Response {
    let page = PageView { csrf_token, view };
    (StatusCode::UNPROCESSABLE_ENTITY, Json(page)).into_response()
}

/// GET /back/:from_step
pub async fn back<S, R>(
    State(state): State<Arc<AppState<S, R>>>,
    cookies: Cookies,
    Path(from_step): Path<u8>,
) -> Result<Redirect, SurveyError>
where
    S: SessionStore,
    R: ResponseStore,
{
    let mut session = load_or_create_session(&cookies, &state.session_store)?;
    let target = state.wizard.back(&mut session.wizard, from_step);
    state.session_store.save(&session)?;

    Ok(Redirect::to(&step_path(target)))
}

/// GET /thanks
pub async fn thanks() -> Json<ThanksView> {
    Json(ThanksView {
        success: true,
        message: "Cảm ơn bạn đã hoàn thành khảo sát!",
    })
}
