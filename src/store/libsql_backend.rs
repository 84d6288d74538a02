//! libSQL backend — async `RequestStore` implementation.
//!
//! Supports local file and in-memory databases. `libsql::Connection` is
//! `Send + Sync` and safe for concurrent async use.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use async_trait::async_trait;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::model::{IntakeFields, Request, RequestStatus, User};
use crate::store::traits::RequestStore;

/// libSQL store backend.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        info!(path = %path.display(), "Database opened");
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

/// Convert `Option<&str>` to a libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

/// Map a libsql Row to a User.
///
/// Column order: 0:id, 1:chat_id, 2:username, 3:first_name, 4:created_at,
/// 5:last_seen_at
fn row_to_user(row: &libsql::Row) -> Result<User, libsql::Error> {
    let created_str: String = row.get(4)?;
    let seen_str: String = row.get(5)?;
    Ok(User {
        id: row.get(0)?,
        chat_id: row.get(1)?,
        username: row.get(2).ok(),
        first_name: row.get(3).ok(),
        created_at: parse_datetime(&created_str),
        last_seen_at: parse_datetime(&seen_str),
    })
}

/// Map a libsql Row to a Request.
///
/// Column order matches REQUEST_COLUMNS, with the joined owner first_name
/// appended last.
fn row_to_request(row: &libsql::Row) -> Result<Request, libsql::Error> {
    let status_str: String = row.get(4)?;
    let created_str: String = row.get(5)?;
    let updated_str: String = row.get(6)?;
    Ok(Request {
        id: row.get(0)?,
        user_id: row.get(1)?,
        chat_id: row.get(2)?,
        username: row.get(3).ok(),
        status: RequestStatus::parse(&status_str),
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
        fields: IntakeFields {
            destination: row.get(7)?,
            dates: row.get(8)?,
            adults: row.get(9)?,
            children: row.get(10)?,
            budget: row.get(11)?,
            wishes: row.get(12)?,
            contact: row.get(13)?,
        },
        operator_comment: row.get(14).ok(),
        operator_id: row.get(15).ok(),
        first_name: row.get(16).ok(),
    })
}

const REQUEST_COLUMNS: &str = "r.id, r.user_id, r.chat_id, r.username, r.status, \
     r.created_at, r.updated_at, r.destination, r.dates, r.adults, r.children, \
     r.budget, r.wishes, r.contact, r.operator_comment, r.operator_id, u.first_name";

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl RequestStore for LibSqlStore {
    async fn upsert_user(
        &self,
        chat_id: i64,
        username: Option<&str>,
        first_name: Option<&str>,
    ) -> Result<i64, DatabaseError> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();

        let mut rows = conn
            .query("SELECT id FROM users WHERE chat_id = ?1", params![chat_id])
            .await
            .map_err(|e| DatabaseError::Query(format!("upsert_user lookup: {e}")))?;

        let existing = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("upsert_user lookup: {e}")))?;

        if let Some(row) = existing {
            let user_id: i64 = row
                .get(0)
                .map_err(|e| DatabaseError::Query(format!("upsert_user id: {e}")))?;
            conn.execute(
                "UPDATE users SET username = ?1, first_name = ?2, last_seen_at = ?3 WHERE id = ?4",
                params![opt_text(username), opt_text(first_name), now, user_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("upsert_user update: {e}")))?;
            return Ok(user_id);
        }

        conn.execute(
            "INSERT INTO users (chat_id, username, first_name, created_at, last_seen_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![chat_id, opt_text(username), opt_text(first_name), now],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("upsert_user insert: {e}")))?;

        let user_id = conn.last_insert_rowid();
        debug!(chat_id, user_id, "User created");
        Ok(user_id)
    }

    async fn user_by_chat_id(&self, chat_id: i64) -> Result<Option<User>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                "SELECT id, chat_id, username, first_name, created_at, last_seen_at
                 FROM users WHERE chat_id = ?1",
                params![chat_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("user_by_chat_id: {e}")))?;

        let row = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("user_by_chat_id: {e}")))?;

        match row {
            Some(row) => {
                let user = row_to_user(&row)
                    .map_err(|e| DatabaseError::Query(format!("user_by_chat_id row: {e}")))?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    async fn create_request(
        &self,
        user: &User,
        fields: &IntakeFields,
    ) -> Result<i64, DatabaseError> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO requests (
                user_id, chat_id, username, status, created_at, updated_at,
                destination, dates, adults, children, budget, wishes, contact
             ) VALUES (?1, ?2, ?3, 'new', ?4, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                user.id,
                user.chat_id,
                opt_text(user.username.as_deref()),
                now,
                fields.destination.as_str(),
                fields.dates.as_str(),
                fields.adults,
                fields.children,
                fields.budget.as_str(),
                fields.wishes.as_str(),
                fields.contact.as_str(),
            ],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("create_request: {e}")))?;

        let id = conn.last_insert_rowid();
        debug!(request_id = id, user_id = user.id, "Request created");
        Ok(id)
    }

    async fn request(&self, id: i64) -> Result<Option<Request>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {REQUEST_COLUMNS} FROM requests r
                     LEFT JOIN users u ON u.id = r.user_id
                     WHERE r.id = ?1"
                ),
                params![id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("request: {e}")))?;

        let row = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("request: {e}")))?;

        match row {
            Some(row) => {
                let request = row_to_request(&row)
                    .map_err(|e| DatabaseError::Query(format!("request row: {e}")))?;
                Ok(Some(request))
            }
            None => Ok(None),
        }
    }

    async fn requests_for_user(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<Request>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {REQUEST_COLUMNS} FROM requests r
                     LEFT JOIN users u ON u.id = r.user_id
                     WHERE r.user_id = ?1
                     ORDER BY r.id DESC LIMIT ?2"
                ),
                params![user_id, limit as i64],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("requests_for_user: {e}")))?;

        let mut requests = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            match row_to_request(&row) {
                Ok(request) => requests.push(request),
                Err(e) => {
                    tracing::warn!("Skipping request row: {e}");
                }
            }
        }
        Ok(requests)
    }

    async fn requests_by_status(
        &self,
        statuses: &[RequestStatus],
        limit: usize,
    ) -> Result<Vec<Request>, DatabaseError> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn();
        let placeholders = (1..=statuses.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(",");
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM requests r
             LEFT JOIN users u ON u.id = r.user_id
             WHERE r.status IN ({placeholders})
             ORDER BY r.id DESC LIMIT ?{}",
            statuses.len() + 1
        );

        let mut values: Vec<libsql::Value> = statuses
            .iter()
            .map(|s| libsql::Value::Text(s.as_str().to_string()))
            .collect();
        values.push(libsql::Value::Integer(limit as i64));

        let mut rows = conn
            .query(&sql, values)
            .await
            .map_err(|e| DatabaseError::Query(format!("requests_by_status: {e}")))?;

        let mut requests = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            match row_to_request(&row) {
                Ok(request) => requests.push(request),
                Err(e) => {
                    tracing::warn!("Skipping request row: {e}");
                }
            }
        }
        Ok(requests)
    }

    async fn set_status(
        &self,
        id: i64,
        status: RequestStatus,
        operator_id: i64,
        comment: &str,
    ) -> Result<(), DatabaseError> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();

        let affected = conn
            .execute(
                "UPDATE requests
                 SET status = ?1, operator_id = ?2, operator_comment = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![status.as_str(), operator_id, comment, now, id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("set_status: {e}")))?;

        if affected == 0 {
            return Err(DatabaseError::NotFound {
                entity: "request".into(),
                id: id.to_string(),
            });
        }

        debug!(request_id = id, status = %status, operator_id, "Request status updated");
        Ok(())
    }
}
