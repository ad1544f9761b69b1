//! HTTP routes for the survey

mod admin;
mod session;
mod wizard;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::store::{ResponseStore, SessionStore};

pub use session::SESSION_COOKIE;

/// Create the router with all routes
pub fn create_router<S, R>(state: Arc<AppState<S, R>>) -> Router
where
    S: SessionStore + 'static,
    R: ResponseStore + 'static,
{
    Router::new()
        .route("/", get(wizard::home))
        .route("/session", get(session::get_session_context))
        .route("/step/:step", get(wizard::get_step).post(wizard::post_step))
        .route("/back/:from_step", get(wizard::back))
        .route("/thanks", get(wizard::thanks))
        .route("/admin/login", get(admin::login_page).post(admin::login))
        .route("/admin/logout", get(admin::logout))
        .route("/admin", get(admin::dashboard))
        .route("/admin/export", get(admin::export_csv))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
