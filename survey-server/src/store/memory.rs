//! In-memory storage implementations

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use survey_core::{NewResponse, ResponseId, StoredResponse};

use super::{ResponseStore, SessionId, SessionStore, StoreResult, VisitorSession};
use crate::crypto::generate_token;

/// In-memory session store
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, VisitorSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self) -> StoreResult<VisitorSession> {
        let session = VisitorSession::new(SessionId(generate_token()), generate_token());
        self.sessions
            .write()
            .unwrap()
            .insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn get(&self, session_id: &SessionId) -> StoreResult<Option<VisitorSession>> {
        Ok(self.sessions.read().unwrap().get(session_id).cloned())
    }

    fn save(&self, session: &VisitorSession) -> StoreResult<()> {
        let mut session = session.clone();
        session.updated_at = Utc::now();
        self.sessions
            .write()
            .unwrap()
            .insert(session.id.clone(), session);
        Ok(())
    }

    fn cleanup_expired(&self, max_age_minutes: i64) -> StoreResult<u64> {
        let cutoff = Utc::now() - chrono::Duration::minutes(max_age_minutes);
        let mut sessions = self.sessions.write().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| s.updated_at > cutoff);
        Ok((before - sessions.len()) as u64)
    }
}

/// In-memory response store
pub struct InMemoryResponseStore {
    responses: RwLock<Vec<StoredResponse>>,
}

impl InMemoryResponseStore {
    pub fn new() -> Self {
        Self {
            responses: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryResponseStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseStore for InMemoryResponseStore {
    fn insert(&self, response: NewResponse) -> StoreResult<StoredResponse> {
        // Id assignment and push happen under one write lock
        let mut responses = self.responses.write().unwrap();
        let id = ResponseId(responses.len() as u64 + 1);
        let stored = StoredResponse::from_new(id, Utc::now(), response);
        responses.push(stored.clone());
        Ok(stored)
    }

    fn list(&self) -> StoreResult<Vec<StoredResponse>> {
        Ok(self.responses.read().unwrap().clone())
    }
}
