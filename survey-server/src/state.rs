//! Application state

use survey_core::Wizard;

use crate::crypto::AdminCredentials;
use crate::store::{ResponseStore, SessionStore};

/// Shared application state
pub struct AppState<S, R>
where
    S: SessionStore,
    R: ResponseStore,
{
    /// The configured survey flow
    pub wizard: Wizard,
    pub admin: AdminCredentials,
    pub session_store: S,
    pub response_store: R,
}

impl<S, R> AppState<S, R>
where
    S: SessionStore,
    R: ResponseStore,
{
    pub fn new(wizard: Wizard, admin: AdminCredentials, session_store: S, response_store: R) -> Self {
        Self {
            wizard,
            admin,
            session_store,
            response_store,
        }
    }
}
