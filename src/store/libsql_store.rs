//! libSQL backend — async `ProfileStore` implementation.
//!
//! Supports local file and in-memory databases; in-memory is used by the
//! test suite.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database, params};
use tracing::info;

use crate::error::StoreError;
use crate::flow::fields::ProfileField;
use crate::store::traits::{Profile, ProfileStore, UserId};

/// libSQL profile store.
///
/// Holds a single connection reused for all operations;
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<Database>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and initialize the schema.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Open(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to open database: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        store.init_schema().await?;
        info!(path = %path.display(), "Profile database opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to create in-memory database: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS users (
                    user_id INTEGER PRIMARY KEY,
                    full_name TEXT NOT NULL,
                    national_id TEXT NOT NULL,
                    student_id TEXT NOT NULL,
                    phone TEXT NOT NULL,
                    created_at TEXT NOT NULL
                )",
                (),
            )
            .await
            .map_err(|e| StoreError::Open(format!("Schema init failed: {e}")))?;
        Ok(())
    }
}

/// Parse an RFC 3339 timestamp written by `insert`.
fn parse_created_at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn row_to_profile(row: &libsql::Row) -> Result<Profile, libsql::Error> {
    let created_str: String = row.get(5)?;
    Ok(Profile {
        user_id: row.get(0)?,
        full_name: row.get(1)?,
        national_id: row.get(2)?,
        student_id: row.get(3)?,
        phone: row.get(4)?,
        created_at: parse_created_at(&created_str),
    })
}

#[async_trait]
impl ProfileStore for LibSqlStore {
    async fn get(&self, user_id: UserId) -> Result<Option<Profile>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT user_id, full_name, national_id, student_id, phone, created_at
                 FROM users WHERE user_id = ?1",
                params![user_id],
            )
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        match rows
            .next()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?
        {
            Some(row) => {
                let profile =
                    row_to_profile(&row).map_err(|e| StoreError::Query(e.to_string()))?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    async fn insert(&self, profile: &Profile) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO users (user_id, full_name, national_id, student_id, phone, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    profile.user_id,
                    profile.full_name.as_str(),
                    profile.national_id.as_str(),
                    profile.student_id.as_str(),
                    profile.phone.as_str(),
                    profile.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| {
                let message = e.to_string();
                if message.contains("UNIQUE constraint") || message.contains("PRIMARY KEY") {
                    StoreError::Duplicate(profile.user_id)
                } else {
                    StoreError::Query(message)
                }
            })?;
        Ok(())
    }

    async fn update_field(
        &self,
        user_id: UserId,
        field: ProfileField,
        value: &str,
    ) -> Result<(), StoreError> {
        // field.name() is a closed set of column names, never user input.
        let sql = format!("UPDATE users SET {} = ?1 WHERE user_id = ?2", field.name());
        let affected = self
            .conn
            .execute(&sql, params![value, user_id])
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        if affected == 0 {
            return Err(StoreError::NotFound(user_id));
        }
        Ok(())
    }
}
