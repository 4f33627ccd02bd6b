//! Database operations for the thumbnail job queue.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use greenleaf_core::{ThumbnailJobId, UserId};

use super::RepositoryError;

/// A rendition waiting to be produced by the image worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailJob {
    pub id: ThumbnailJobId,
    pub user_id: UserId,
    /// Image field on the user, e.g. `avatar`.
    pub image_attr: String,
    /// Stored name of the source image.
    pub source_path: String,
    /// Rendition key set the job belongs to, e.g. `user_avatars`.
    pub size_set: String,
    /// Rendition name within the set, e.g. `default`.
    pub rendition: String,
    /// Rendition key, e.g. `thumbnail__445x445`.
    pub rendition_key: String,
    /// `pending` until the worker picks the job up.
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ThumbnailJobRow {
    id: i32,
    user_id: i32,
    image_attr: String,
    source_path: String,
    size_set: String,
    rendition: String,
    rendition_key: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<ThumbnailJobRow> for ThumbnailJob {
    fn from(row: ThumbnailJobRow) -> Self {
        Self {
            id: ThumbnailJobId::new(row.id),
            user_id: UserId::new(row.user_id),
            image_attr: row.image_attr,
            source_path: row.source_path,
            size_set: row.size_set,
            rendition: row.rendition,
            rendition_key: row.rendition_key,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

/// Parameters for enqueueing a rendition.
#[derive(Debug)]
pub struct EnqueueThumbnail<'a> {
    pub user_id: UserId,
    pub image_attr: &'a str,
    pub source_path: &'a str,
    pub size_set: &'a str,
    pub rendition: &'a str,
    pub rendition_key: &'a str,
}

/// Repository for thumbnail jobs.
pub struct ThumbnailJobRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ThumbnailJobRepository<'a> {
    /// Create a new thumbnail job repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Queue a rendition. Re-queueing the same rendition of the same source
    /// returns the existing job.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn enqueue(&self, job: EnqueueThumbnail<'_>) -> Result<ThumbnailJob, RepositoryError> {
        let row = sqlx::query_as::<_, ThumbnailJobRow>(
            r#"
            INSERT INTO account.thumbnail_job
                (user_id, image_attr, source_path, size_set, rendition, rendition_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, image_attr, source_path, rendition_key)
                DO UPDATE SET rendition = EXCLUDED.rendition
            RETURNING id, user_id, image_attr, source_path, size_set,
                      rendition, rendition_key, status, created_at
            "#,
        )
        .bind(job.user_id)
        .bind(job.image_attr)
        .bind(job.source_path)
        .bind(job.size_set)
        .bind(job.rendition)
        .bind(job.rendition_key)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Pending jobs for a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_pending_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ThumbnailJob>, RepositoryError> {
        let rows = sqlx::query_as::<_, ThumbnailJobRow>(
            r#"
            SELECT id, user_id, image_attr, source_path, size_set,
                   rendition, rendition_key, status, created_at
            FROM account.thumbnail_job
            WHERE user_id = $1 AND status = 'pending'
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
