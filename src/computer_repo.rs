// SQLite presence store: one row per computer, upserted on every state change.

use chrono::{Local, NaiveDateTime};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;

use crate::models::{ComputerRecord, PresenceStatus, format_timestamp, parse_timestamp};

pub struct ComputerRepo {
    pool: SqlitePool,
}

impl ComputerRepo {
    pub async fn connect(path: &str, max_pool_size: u32) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size)
            .connect_with(opts)
            .await?;
        Ok(Self { pool })
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS computers (
                name TEXT PRIMARY KEY,
                last_seen TEXT,
                status TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Upserts `name` with the current local time.
    pub async fn update_status(&self, name: &str, status: PresenceStatus) -> anyhow::Result<()> {
        self.update_status_at(name, status, Local::now().naive_local())
            .await
    }

    #[instrument(skip(self), fields(repo = "computers", operation = "update_status"))]
    pub async fn update_status_at(
        &self,
        name: &str,
        status: PresenceStatus,
        at: NaiveDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO computers (name, last_seen, status)
            VALUES ($1, $2, $3)
            ON CONFLICT(name) DO UPDATE SET
                last_seen = excluded.last_seen,
                status = excluded.status
            "#,
        )
        .bind(name)
        .bind(format_timestamp(&at))
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// All computers, most recently seen first. Rows with an unreadable
    /// `last_seen` are skipped with a warning.
    #[instrument(skip(self), fields(repo = "computers", operation = "get_all"))]
    pub async fn get_all(&self) -> anyhow::Result<Vec<ComputerRecord>> {
        let rows = sqlx::query("SELECT name, last_seen, status FROM computers ORDER BY last_seen DESC")
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("name")?;
            let last_seen: Option<String> = row.try_get("last_seen")?;
            let status: Option<String> = row.try_get("status")?;
            let Some(last_seen) = last_seen.as_deref().and_then(parse_timestamp) else {
                tracing::warn!(computer = %name, "Skipping row with unreadable last_seen");
                continue;
            };
            out.push(ComputerRecord {
                name,
                last_seen,
                status: PresenceStatus::from_db(status.as_deref().unwrap_or_default()),
            });
        }
        Ok(out)
    }
}
