// SQLite-backed notification sink.
//
// Tables:
// - moderation_notifications: in-app notifications written by the spam detector

use crate::core::moderation::{ModerationError, NotificationRequest, NotificationSink};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;

/// A notification as stored in SQLite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredNotification {
    pub id: u64,
    pub user_id: u64,
    pub message: String,
    pub entity_id: u64,
    pub entity_url: String,
    pub is_already_saved: bool,
    pub delivered: bool,
    pub created_at: DateTime<Utc>,
}

pub struct SqliteNotificationStore {
    pool: Pool<Sqlite>,
}

impl SqliteNotificationStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) a database file or `sqlite::memory:` and migrate it.
    pub async fn connect(database_url: &str) -> Result<Self, ModerationError> {
        let path_str = database_url.trim_start_matches("sqlite://");
        if !database_url.contains(":memory:") && !Path::new(path_str).exists() {
            if let Some(parent) = Path::new(path_str).parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ModerationError::StorageError(e.to_string()))?;
            }
            std::fs::File::create(path_str)
                .map_err(|e| ModerationError::StorageError(e.to_string()))?;
        }

        let conn_str = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            format!("sqlite://{}", database_url)
        };

        // In-memory databases live per connection, so keep a single one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&conn_str)
            .await
            .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), ModerationError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS moderation_notifications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                message TEXT NOT NULL,
                entity_id INTEGER NOT NULL,
                entity_url TEXT NOT NULL,
                is_already_saved BOOLEAN NOT NULL DEFAULT 0,
                delivered BOOLEAN NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_moderation_notifications_user
                ON moderation_notifications(user_id, id);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(())
    }

    /// Notifications for a user, oldest first.
    pub async fn list_for_user(&self, user_id: u64) -> Result<Vec<StoredNotification>, ModerationError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, message, entity_id, entity_url, is_already_saved, delivered, created_at
            FROM moderation_notifications
            WHERE user_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(user_id as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        let mut notifications = Vec::with_capacity(rows.len());
        for row in rows {
            let created_at_str: String = row.get("created_at");
            let created_at = DateTime::parse_from_rfc3339(&created_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| ModerationError::StorageError(e.to_string()))?;

            notifications.push(StoredNotification {
                id: row.get::<i64, _>("id") as u64,
                user_id: row.get::<i64, _>("user_id") as u64,
                message: row.get("message"),
                entity_id: row.get::<i64, _>("entity_id") as u64,
                entity_url: row.get("entity_url"),
                is_already_saved: row.get("is_already_saved"),
                delivered: row.get("delivered"),
                created_at,
            });
        }
        Ok(notifications)
    }
}

#[async_trait]
impl NotificationSink for SqliteNotificationStore {
    async fn persist(&self, request: &NotificationRequest) -> Result<u64, ModerationError> {
        // Written straight to the delivered state; nothing queues these.
        let result = sqlx::query(
            r#"
            INSERT INTO moderation_notifications
                (user_id, message, entity_id, entity_url, is_already_saved, delivered, created_at)
            VALUES (?, ?, ?, ?, ?, 1, ?)
            "#,
        )
        .bind(request.recipient_user_id as i64)
        .bind(&request.message)
        .bind(request.entity_id as i64)
        .bind(&request.entity_url)
        .bind(request.is_already_saved)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::StorageError(e.to_string()))?;

        Ok(result.last_insert_rowid() as u64)
    }
}
