//! Data models for server-side storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use survey_core::WizardSession;

/// Opaque visitor session identifier, carried in the session cookie
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Everything the server remembers about one browser
#[derive(Debug, Clone, PartialEq)]
pub struct VisitorSession {
    pub id: SessionId,
    /// Anti-forgery token every POST must echo back as `_csrf`
    pub csrf_token: String,
    /// Set by a successful admin login, cleared by logout
    pub is_admin: bool,
    pub wizard: WizardSession,
    pub created_at: DateTime<Utc>,
    /// Last time the session was written; drives expiry
    pub updated_at: DateTime<Utc>,
}

impl VisitorSession {
    pub fn new(id: SessionId, csrf_token: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            csrf_token,
            is_admin: false,
            wizard: WizardSession::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
