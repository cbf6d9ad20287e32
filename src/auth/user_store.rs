//! Credential Storage
//! Mission: Look up and persist credentials by username with SQLite

use crate::auth::{
    error::StoreError,
    models::{Authorities, Credential},
};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// Lookup-by-username credential backend.
///
/// Calls may suspend; callers impose no timeout of their own.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, StoreError>;

    /// Persist a new credential; `UsernameTaken` if the name is in use
    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        authorities: Authorities,
    ) -> Result<Credential, StoreError>;
}

/// Credential store with SQLite backend
#[derive(Clone)]
pub struct SqliteUserStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    /// Open (or create) the store at `db_path`; `:memory:` is accepted
    pub fn new(db_path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS credentials (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                authorities TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub async fn count(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM credentials", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl CredentialStore for SqliteUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT id, username, password_hash, authorities, created_at
             FROM credentials WHERE username = ?1",
        )?;

        let row = stmt
            .query_row(params![username], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .optional()?;

        let Some((id, username, password_hash, authorities, created_at)) = row else {
            return Ok(None);
        };

        let id = Uuid::parse_str(&id)
            .map_err(|e| StoreError::Corrupt(format!("credential id {}: {}", id, e)))?;

        Ok(Some(Credential {
            id,
            username,
            password_hash,
            authorities: Credential::parse_authorities(&authorities),
            created_at,
        }))
    }

    async fn insert(
        &self,
        username: &str,
        password_hash: &str,
        authorities: Authorities,
    ) -> Result<Credential, StoreError> {
        let credential = Credential {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            authorities,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.conn.lock().await;
        let result = conn.execute(
            "INSERT INTO credentials (id, username, password_hash, authorities, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                credential.id.to_string(),
                credential.username,
                credential.password_hash,
                credential.authorities_column(),
                credential.created_at,
            ],
        );

        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                return Err(StoreError::UsernameTaken(credential.username));
            }
            Err(e) => return Err(e.into()),
        }

        info!(username = %credential.username, "Stored credential");

        Ok(credential)
    }
}
