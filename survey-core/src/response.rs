//! Completed survey records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extras::Extras;
use crate::session::Answers;

/// Unique response identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResponseId(pub u64);

/// A fully validated submission, ready to be written once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResponse {
    pub answers: Answers,
    pub extras: Extras,
}

/// A persisted response. Never updated after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub id: ResponseId,
    pub created_at: DateTime<Utc>,
    pub answers: Answers,
    pub extras: Extras,
}

impl StoredResponse {
    pub fn from_new(id: ResponseId, created_at: DateTime<Utc>, new: NewResponse) -> Self {
        Self {
            id,
            created_at,
            answers: new.answers,
            extras: new.extras,
        }
    }

    /// Satisfaction as a number, if the stored text parses
    pub fn satisfaction_score(&self) -> Option<u8> {
        self.answers.satisfaction.trim().parse().ok()
    }
}
