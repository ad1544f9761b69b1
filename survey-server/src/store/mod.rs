//! Storage abstractions for the survey server

pub mod memory;
pub mod models;
pub mod sqlite;

pub use memory::{InMemoryResponseStore, InMemorySessionStore};
pub use models::*;
pub use sqlite::SqliteStore;

use std::sync::Arc;

use survey_core::{NewResponse, StoredResponse};

use crate::error::SurveyError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, SurveyError>;

/// Trait for per-visitor session storage
pub trait SessionStore: Send + Sync {
    /// Create a fresh session with a new id and anti-forgery token
    fn create(&self) -> StoreResult<VisitorSession>;

    /// Get a session by ID
    fn get(&self, session_id: &SessionId) -> StoreResult<Option<VisitorSession>>;

    /// Write back a session after it changed
    fn save(&self, session: &VisitorSession) -> StoreResult<()>;

    /// Delete sessions not written for `max_age_minutes`
    fn cleanup_expired(&self, max_age_minutes: i64) -> StoreResult<u64>;
}

/// Trait for completed survey responses. Append-only.
pub trait ResponseStore: Send + Sync {
    /// Write one response atomically; the store assigns id and timestamp
    fn insert(&self, response: NewResponse) -> StoreResult<StoredResponse>;

    /// All responses, oldest first
    fn list(&self) -> StoreResult<Vec<StoredResponse>>;
}

// Let one store instance back several roles
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn create(&self) -> StoreResult<VisitorSession> {
        (**self).create()
    }

    fn get(&self, session_id: &SessionId) -> StoreResult<Option<VisitorSession>> {
        (**self).get(session_id)
    }

    fn save(&self, session: &VisitorSession) -> StoreResult<()> {
        (**self).save(session)
    }

    fn cleanup_expired(&self, max_age_minutes: i64) -> StoreResult<u64> {
        (**self).cleanup_expired(max_age_minutes)
    }
}

impl<T: ResponseStore + ?Sized> ResponseStore for Arc<T> {
    fn insert(&self, response: NewResponse) -> StoreResult<StoredResponse> {
        (**self).insert(response)
    }

    fn list(&self) -> StoreResult<Vec<StoredResponse>> {
        (**self).list()
    }
}
