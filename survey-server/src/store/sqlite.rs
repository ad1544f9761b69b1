//! SQLite-based storage implementation

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use survey_core::{Answers, Extras, NewResponse, ResponseId, StoredResponse, WizardSession};

use super::{ResponseStore, SessionId, SessionStore, StoreResult, VisitorSession};
use crate::crypto::generate_token;
use crate::error::SurveyError;

/// Current schema version
const SCHEMA_VERSION: i32 = 2;

/// SQLite-based store implementing both ResponseStore and SessionStore
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path
    pub fn open(path: &str) -> Result<Self, SurveyError> {
        let conn = Connection::open(path).map_err(|e| SurveyError::Internal(e.to_string()))?;

        // Run migrations
        Self::migrate(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run database migrations
    fn migrate(conn: &Connection) -> Result<(), SurveyError> {
        // Check current schema version
        let current_version = Self::get_schema_version(conn)?;

        if current_version < SCHEMA_VERSION {
            tracing::info!(
                current = current_version,
                target = SCHEMA_VERSION,
                "Running database migrations"
            );

            if current_version < 1 {
                Self::migrate_v1(conn)?;
            }
            if current_version < 2 {
                Self::migrate_v2(conn)?;
            }

            // Update schema version
            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )
            .map_err(|e| SurveyError::Internal(e.to_string()))?;

            tracing::info!("Database migrations complete");
        }

        Ok(())
    }

    /// Get current schema version (0 if no schema exists)
    fn get_schema_version(conn: &Connection) -> Result<i32, SurveyError> {
        // Check if schema_version table exists
        let table_exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
                [],
                |row| row.get(0),
            )
            .map_err(|e| SurveyError::Internal(e.to_string()))?;

        if !table_exists {
            return Ok(0);
        }

        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0).map(|v| v.unwrap_or(0))
        })
        .map_err(|e| SurveyError::Internal(e.to_string()))
    }

    /// Migration to version 1: responses table
    fn migrate_v1(conn: &Connection) -> Result<(), SurveyError> {
        conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Completed responses (append-only)
            CREATE TABLE IF NOT EXISTS responses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at TEXT NOT NULL,
                name TEXT NOT NULL,
                role TEXT NOT NULL,
                store_type TEXT NOT NULL,
                satisfaction TEXT NOT NULL,
                frequency TEXT NOT NULL,
                brand_perception TEXT NOT NULL,
                primary_diaper_brand TEXT NOT NULL DEFAULT '',
                open_feedback TEXT NOT NULL DEFAULT ''
            );
            CREATE INDEX IF NOT EXISTS idx_responses_created_at ON responses(created_at);
            "#,
        )
        .map_err(|e| SurveyError::Internal(e.to_string()))?;

        Ok(())
    }

    /// Migration to version 2: extras payload and visitor sessions
    fn migrate_v2(conn: &Connection) -> Result<(), SurveyError> {
        conn.execute_batch(
            r#"
            -- Rows written before the brand loop existed are basic responses
            ALTER TABLE responses ADD COLUMN extras TEXT NOT NULL DEFAULT '{"kind":"basic"}';

            -- Visitor sessions; the wizard state is a JSON document
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                csrf_token TEXT NOT NULL,
                is_admin INTEGER NOT NULL DEFAULT 0,
                wizard TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_updated_at ON sessions(updated_at);
            "#,
        )
        .map_err(|e| SurveyError::Internal(e.to_string()))?;

        Ok(())
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Surface a bad JSON column as a conversion error instead of dropping it
fn json_column_error(index: usize, e: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e))
}

fn response_from_row(row: &Row<'_>) -> rusqlite::Result<StoredResponse> {
    let id: i64 = row.get(0)?;
    let created_at: String = row.get(1)?;
    let extras: String = row.get(10)?;
    Ok(StoredResponse {
        id: ResponseId(id as u64),
        created_at: parse_timestamp(&created_at),
        answers: Answers {
            name: row.get(2)?,
            role: row.get(3)?,
            store_type: row.get(4)?,
            satisfaction: row.get(5)?,
            frequency: row.get(6)?,
            brand_perception: row.get(7)?,
            primary_diaper_brand: row.get(8)?,
            open_feedback: row.get(9)?,
        },
        extras: Extras::from_json(&extras).map_err(|e| json_column_error(10, e))?,
    })
}

impl ResponseStore for SqliteStore {
    fn insert(&self, response: NewResponse) -> StoreResult<StoredResponse> {
        let extras = response
            .extras
            .to_json()
            .map_err(|e| SurveyError::Internal(e.to_string()))?;
        let created_at = Utc::now();

        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| SurveyError::Internal(e.to_string()))?;

        let answers = &response.answers;
        tx.execute(
            "INSERT INTO responses (created_at, name, role, store_type, satisfaction, frequency,
                                    brand_perception, primary_diaper_brand, open_feedback, extras)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                created_at.to_rfc3339(),
                answers.name,
                answers.role,
                answers.store_type,
                answers.satisfaction,
                answers.frequency,
                answers.brand_perception,
                answers.primary_diaper_brand,
                answers.open_feedback,
                extras,
            ],
        )
        .map_err(|e| SurveyError::Internal(e.to_string()))?;
        let id = tx.last_insert_rowid() as u64;

        tx.commit()
            .map_err(|e| SurveyError::Internal(e.to_string()))?;

        Ok(StoredResponse::from_new(ResponseId(id), created_at, response))
    }

    fn list(&self) -> StoreResult<Vec<StoredResponse>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT id, created_at, name, role, store_type, satisfaction, frequency,
                        brand_perception, primary_diaper_brand, open_feedback, extras
                 FROM responses ORDER BY id",
            )
            .map_err(|e| SurveyError::Internal(e.to_string()))?;

        let responses = stmt
            .query_map([], response_from_row)
            .map_err(|e| SurveyError::Internal(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SurveyError::Internal(e.to_string()))?;

        Ok(responses)
    }
}

impl SessionStore for SqliteStore {
    fn create(&self) -> StoreResult<VisitorSession> {
        let session = VisitorSession::new(SessionId(generate_token()), generate_token());
        let wizard = serde_json::to_string(&session.wizard)
            .map_err(|e| SurveyError::Internal(e.to_string()))?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO sessions (id, csrf_token, is_admin, wizard, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session.id.0,
                session.csrf_token,
                session.is_admin as i32,
                wizard,
                session.created_at.to_rfc3339(),
                session.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| SurveyError::Internal(e.to_string()))?;

        Ok(session)
    }

    fn get(&self, session_id: &SessionId) -> StoreResult<Option<VisitorSession>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT id, csrf_token, is_admin, wizard, created_at, updated_at
             FROM sessions WHERE id = ?1",
            params![session_id.0],
            |row| {
                let id: String = row.get(0)?;
                let csrf_token: String = row.get(1)?;
                let is_admin: i32 = row.get(2)?;
                let wizard: String = row.get(3)?;
                let created_at: String = row.get(4)?;
                let updated_at: String = row.get(5)?;
                Ok(VisitorSession {
                    id: SessionId(id),
                    csrf_token,
                    is_admin: is_admin != 0,
                    wizard: serde_json::from_str::<WizardSession>(&wizard)
                        .map_err(|e| json_column_error(3, e))?,
                    created_at: parse_timestamp(&created_at),
                    updated_at: parse_timestamp(&updated_at),
                })
            },
        )
        .optional()
        .map_err(|e| SurveyError::Internal(e.to_string()))
    }

    fn save(&self, session: &VisitorSession) -> StoreResult<()> {
        let wizard = serde_json::to_string(&session.wizard)
            .map_err(|e| SurveyError::Internal(e.to_string()))?;
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO sessions (id, csrf_token, is_admin, wizard, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                csrf_token = excluded.csrf_token,
                is_admin = excluded.is_admin,
                wizard = excluded.wizard,
                updated_at = excluded.updated_at",
            params![
                session.id.0,
                session.csrf_token,
                session.is_admin as i32,
                wizard,
                session.created_at.to_rfc3339(),
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| SurveyError::Internal(e.to_string()))?;

        Ok(())
    }

    fn cleanup_expired(&self, max_age_minutes: i64) -> StoreResult<u64> {
        let conn = self.conn.lock().unwrap();
        let cutoff = (Utc::now() - chrono::Duration::minutes(max_age_minutes)).to_rfc3339();

        let rows_deleted = conn
            .execute("DELETE FROM sessions WHERE updated_at < ?1", params![cutoff])
            .map_err(|e| SurveyError::Internal(e.to_string()))?;

        Ok(rows_deleted as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_core::{BrandAnswers, ChannelChoice, Step};
    use tempfile::TempDir;

    fn create_test_store() -> (SqliteStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.db");
        let store = SqliteStore::open(path.to_str().unwrap()).unwrap();
        (store, dir) // Return dir to keep it alive
    }

    fn new_response(name: &str, extras: Extras) -> NewResponse {
        NewResponse {
            answers: Answers {
                name: name.to_string(),
                role: "Staff".to_string(),
                store_type: "Pharmacy".to_string(),
                satisfaction: "3".to_string(),
                frequency: "Weekly".to_string(),
                brand_perception: "Disagree".to_string(),
                primary_diaper_brand: String::new(),
                open_feedback: "Ổn".to_string(),
            },
            extras,
        }
    }

    #[test]
    fn test_insert_and_list_responses() {
        let (store, _dir) = create_test_store();

        let mut brands = BrandAnswers {
            brand_selection: vec![1, 98],
            brand_other_text: Some("Local Co".to_string()),
            ..Default::default()
        };
        brands.channels_by_brand.insert(
            1,
            ChannelChoice {
                codes: vec![2],
                other: String::new(),
            },
        );
        brands.ratings_by_brand.insert(1, 4);

        let stored = store
            .insert(new_response("Ánh Mai", Extras::BrandLoop(brands.clone())))
            .unwrap();
        store.insert(new_response("Bình", Extras::Basic)).unwrap();

        let all = store.list().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, stored.id);
        assert_eq!(all[0].answers.name, "Ánh Mai");
        assert_eq!(all[0].extras, Extras::BrandLoop(brands));
        assert_eq!(all[1].extras, Extras::Basic);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("survey.db");
        let path = path.to_str().unwrap();

        {
            let store = SqliteStore::open(path).unwrap();
            store.insert(new_response("Châu", Extras::Basic)).unwrap();
        }

        let store = SqliteStore::open(path).unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_session_lifecycle() {
        let (store, _dir) = create_test_store();

        let mut session = store.create().unwrap();
        assert!(store.get(&session.id).unwrap().is_some());

        session.wizard.allowed_step = Step::Channels;
        session.wizard.brands.brand_selection = vec![2, 3];
        session.wizard.loop_cursor = 1;
        session.is_admin = true;
        store.save(&session).unwrap();

        let loaded = store.get(&session.id).unwrap().unwrap();
        assert_eq!(loaded.wizard, session.wizard);
        assert_eq!(loaded.csrf_token, session.csrf_token);
        assert!(loaded.is_admin);

        assert_eq!(store.cleanup_expired(-1).unwrap(), 1);
        assert!(store.get(&session.id).unwrap().is_none());
    }

    #[test]
    fn test_cleanup_expired_sessions() {
        let (store, _dir) = create_test_store();
        store.create().unwrap();

        assert_eq!(store.cleanup_expired(60).unwrap(), 0);
        assert_eq!(store.cleanup_expired(-1).unwrap(), 1);
    }

    #[test]
    fn test_corrupt_extras_is_an_error() {
        let (store, _dir) = create_test_store();
        store.insert(new_response("Dũng", Extras::Basic)).unwrap();

        store
            .conn
            .lock()
            .unwrap()
            .execute("UPDATE responses SET extras = 'not json'", [])
            .unwrap();

        assert!(matches!(store.list(), Err(SurveyError::Internal(_))));
    }
}
