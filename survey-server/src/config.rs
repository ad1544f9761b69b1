//! Server configuration

use std::fmt;

use survey_core::Variant;

#[derive(Clone)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// SQLite database file, or `:memory:`
    pub database_path: String,

    pub admin_user: String,

    /// Plain text; hashed once at startup
    pub admin_pass: String,

    /// Which survey to serve
    pub variant: Variant,

    /// Idle sessions older than this are purged
    pub session_ttl_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            database_path: "data/survey.db".to_string(),
            admin_user: "admin".to_string(),
            admin_pass: "changeme".to_string(),
            variant: Variant::Full,
            session_ttl_minutes: 24 * 60,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Helper to get non-empty env var
        let get = |key: &str| lookup(key).filter(|s| !s.is_empty());
        let defaults = Self::default();

        let variant = match get("SURVEY_VARIANT").map(|s| s.parse::<Variant>()) {
            Some(Ok(variant)) => variant,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Ignoring SURVEY_VARIANT");
                defaults.variant
            }
            None => defaults.variant,
        };

        Self {
            port: get("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            database_path: get("DATABASE_PATH").unwrap_or(defaults.database_path),
            admin_user: get("ADMIN_USER").unwrap_or(defaults.admin_user),
            admin_pass: get("ADMIN_PASS").unwrap_or(defaults.admin_pass),
            variant,
            session_ttl_minutes: get("SESSION_TTL_MINUTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.session_ttl_minutes),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("database_path", &self.database_path)
            .field("admin_user", &self.admin_user)
            .field("admin_pass", &"[redacted]")
            .field("variant", &self.variant)
            .field("session_ttl_minutes", &self.session_ttl_minutes)
            .finish()
    }
}
