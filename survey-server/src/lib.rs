//! Retailer Survey Server
//!
//! Serves the multi-step survey wizard over HTTP, keeps each visitor's
//! progress in a server-side session, stores completed responses in SQLite
//! and gives an administrator a dashboard and CSV export.

pub mod config;
pub mod crypto;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;

pub use config::Config;
pub use crypto::AdminCredentials;
pub use error::SurveyError;
pub use state::AppState;
pub use store::{
    InMemoryResponseStore, InMemorySessionStore, ResponseStore, SessionStore, SqliteStore,
};
