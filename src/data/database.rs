//! SQLite database operations
//!
//! Durable implementation of the store traits. Uses SQLx with embedded
//! migrations.

use std::path::Path;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Sqlite, SqlitePool};
use url::Url;

use super::models::{AcceptList, Activity, ReferenceType};
use super::store::{AcceptListStore, ActivityStore, clip_range};
use crate::error::AppError;
use crate::metrics::{DB_QUERIES_TOTAL, DB_QUERY_DURATION_SECONDS};

/// Database connection pool wrapper
pub struct Database {
    pool: Pool<Sqlite>,
}

fn parse_stored_url(raw: &str) -> Result<Url, AppError> {
    Url::parse(raw)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid IRI {raw:?} in database: {e}")))
}

fn to_sql_count(value: usize) -> Result<i64, AppError> {
    i64::try_from(value).map_err(|e| AppError::Internal(e.into()))
}

fn record_query(operation: &str, table: &str, started: Instant) {
    DB_QUERIES_TOTAL.with_label_values(&[operation, table]).inc();
    DB_QUERY_DURATION_SECONDS
        .with_label_values(&[operation, table])
        .observe(started.elapsed().as_secs_f64());
}

impl Database {
    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!(path = %path.display(), "Database connected and migrated successfully");

        Ok(Self { pool })
    }
}

#[async_trait]
impl ActivityStore for Database {
    async fn add_activity(&self, activity: &Activity) -> Result<(), AppError> {
        let started = Instant::now();
        let body = serde_json::to_string(activity).map_err(AppError::Serialization)?;

        sqlx::query(
            r#"
            INSERT INTO activities (iri, activity_type, body, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(iri) DO UPDATE SET
                activity_type = excluded.activity_type,
                body = excluded.body
            "#,
        )
        .bind(activity.id.as_str())
        .bind(&activity.activity_type)
        .bind(body)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        record_query("insert", "activities", started);
        Ok(())
    }

    async fn get_activity(&self, iri: &Url) -> Result<Option<Activity>, AppError> {
        let started = Instant::now();
        let body = sqlx::query_scalar::<_, String>("SELECT body FROM activities WHERE iri = ?")
            .bind(iri.as_str())
            .fetch_optional(&self.pool)
            .await?;
        record_query("select", "activities", started);

        body.map(|raw| {
            serde_json::from_str::<Activity>(&raw).map_err(|e| {
                AppError::Internal(anyhow::anyhow!("corrupt activity {iri} in database: {e}"))
            })
        })
        .transpose()
    }

    async fn add_reference(
        &self,
        reference_type: ReferenceType,
        owner: &Url,
        member: &Url,
    ) -> Result<(), AppError> {
        let started = Instant::now();
        sqlx::query(
            r#"
            INSERT INTO activity_references (reference_type, owner_iri, member_iri, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(reference_type.as_str())
        .bind(owner.as_str())
        .bind(member.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        record_query("insert", "activity_references", started);
        Ok(())
    }

    async fn count_references(
        &self,
        reference_type: ReferenceType,
        owner: &Url,
    ) -> Result<usize, AppError> {
        let started = Instant::now();
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM activity_references WHERE reference_type = ? AND owner_iri = ?",
        )
        .bind(reference_type.as_str())
        .bind(owner.as_str())
        .fetch_one(&self.pool)
        .await?;
        record_query("count", "activity_references", started);

        usize::try_from(count).map_err(|e| AppError::Internal(e.into()))
    }

    async fn references_before(
        &self,
        reference_type: ReferenceType,
        owner: &Url,
        position: usize,
        limit: usize,
    ) -> Result<Vec<Url>, AppError> {
        let total = self.count_references(reference_type, owner).await?;
        let range = clip_range(total, position, limit);
        if range.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let members = sqlx::query_scalar::<_, String>(
            r#"
            SELECT member_iri FROM activity_references
            WHERE reference_type = ? AND owner_iri = ?
            ORDER BY seq ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(reference_type.as_str())
        .bind(owner.as_str())
        .bind(to_sql_count(range.len())?)
        .bind(to_sql_count(range.start)?)
        .fetch_all(&self.pool)
        .await?;
        record_query("select", "activity_references", started);

        members
            .iter()
            .rev()
            .map(|raw| parse_stored_url(raw.as_str()))
            .collect()
    }
}

#[async_trait]
impl AcceptListStore for Database {
    async fn update(
        &self,
        accept_type: &str,
        additions: &[Url],
        removals: &[Url],
    ) -> Result<(), AppError> {
        let started = Instant::now();
        let mut tx = self.pool.begin().await?;
        let now = Utc::now().to_rfc3339();

        for url in additions {
            sqlx::query(
                "INSERT OR IGNORE INTO accept_list (accept_type, url, created_at) VALUES (?, ?, ?)",
            )
            .bind(accept_type)
            .bind(url.as_str())
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        for url in removals {
            sqlx::query("DELETE FROM accept_list WHERE accept_type = ? AND url = ?")
                .bind(accept_type)
                .bind(url.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        record_query("update", "accept_list", started);

        Ok(())
    }

    async fn get(&self, accept_type: &str) -> Result<Vec<Url>, AppError> {
        let started = Instant::now();
        let urls = sqlx::query_scalar::<_, String>(
            "SELECT url FROM accept_list WHERE accept_type = ? ORDER BY url ASC",
        )
        .bind(accept_type)
        .fetch_all(&self.pool)
        .await?;
        record_query("select", "accept_list", started);

        urls.iter().map(|raw| parse_stored_url(raw.as_str())).collect()
    }

    async fn get_all(&self) -> Result<Vec<AcceptList>, AppError> {
        let started = Instant::now();
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT accept_type, url FROM accept_list ORDER BY accept_type ASC, url ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        record_query("select", "accept_list", started);

        let mut lists: Vec<AcceptList> = Vec::new();
        for (accept_type, raw) in rows {
            let url = parse_stored_url(&raw)?;
            match lists.last_mut() {
                Some(list) if list.accept_type == accept_type => list.urls.push(url),
                _ => lists.push(AcceptList {
                    accept_type,
                    urls: vec![url],
                }),
            }
        }

        Ok(lists)
    }
}
