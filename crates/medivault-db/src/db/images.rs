use chrono::Utc;
use medivault_core::models::MedicalImage;
use medivault_core::AppError;
use medivault_storage::Storage;
use sqlx::{PgPool, Postgres};
use std::sync::Arc;
use uuid::Uuid;

/// Outcome of a failed start-analysis transition.
///
/// The conditional update distinguishes only "changed a row" from "did not";
/// a follow-up owner-scoped read classifies the failure. A record owned by
/// someone else classifies as `NotFound`.
#[derive(Debug)]
pub enum StartAnalysisError {
    NotFound,
    AlreadyStarted,
    AlreadyCompleted,
    Database(AppError),
}

impl From<StartAnalysisError> for AppError {
    fn from(err: StartAnalysisError) -> Self {
        match err {
            StartAnalysisError::NotFound => {
                AppError::NotFound("Image not found".to_string())
            }
            StartAnalysisError::AlreadyStarted => {
                AppError::Conflict("Analysis is already in progress".to_string())
            }
            StartAnalysisError::AlreadyCompleted => {
                AppError::Conflict("Image has already been analyzed".to_string())
            }
            StartAnalysisError::Database(e) => e,
        }
    }
}

/// Medical image repository
///
/// Coordinates the database rows with the storage backend. Every read and
/// write below takes an owner id and scopes the query with it, so callers
/// cannot observe records they do not own.
#[derive(Clone)]
pub struct ImageRepository {
    pool: PgPool,
    storage: Arc<dyn Storage>,
}

impl ImageRepository {
    pub fn new(pool: PgPool, storage: Arc<dyn Storage>) -> Self {
        Self { pool, storage }
    }

    /// Public URL for an image's stored blob.
    pub fn url(&self, image: &MedicalImage) -> String {
        self.storage.url(&image.storage_key)
    }

    /// Upload the payload to storage and insert the record.
    ///
    /// If the insert fails after the blob was written, the blob is removed
    /// again on a best-effort basis.
    #[tracing::instrument(
        skip(self, data),
        fields(db.table = "medical_images", db.operation = "insert", user_id = %user_id)
    )]
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        user_id: Uuid,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
        title: String,
        description: String,
        width: Option<i32>,
        height: Option<i32>,
    ) -> Result<MedicalImage, AppError> {
        let file_size = data.len() as i64;

        let (storage_key, _url) = self
            .storage
            .upload(user_id, filename, content_type, data)
            .await
            .map_err(|e| AppError::Storage(format!("Storage upload error: {}", e)))?;

        let now = Utc::now();
        let result = sqlx::query_as::<Postgres, MedicalImage>(
            r#"
            INSERT INTO medical_images (
                id, user_id, storage_key, content_type, title, description,
                analyzed, analysis_started_at, analysis_completed_at,
                width, height, file_size, uploaded_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, false, NULL, NULL, $7, $8, $9, $10, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&storage_key)
        .bind(content_type)
        .bind(&title)
        .bind(&description)
        .bind(width)
        .bind(height)
        .bind(file_size)
        .bind(now)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(image) => Ok(image),
            Err(e) => {
                if let Err(cleanup_err) = self.storage.delete(&storage_key).await {
                    tracing::warn!(
                        storage_key = %storage_key,
                        error = %cleanup_err,
                        "Failed to remove blob after insert failure"
                    );
                }
                Err(AppError::from(e))
            }
        }
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "medical_images", db.operation = "select", db.record_id = %id, user_id = %owner_id)
    )]
    pub async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<MedicalImage>, AppError> {
        let image: Option<MedicalImage> = sqlx::query_as::<Postgres, MedicalImage>(
            "SELECT * FROM medical_images WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(image)
    }

    /// List the owner's images, newest first.
    #[tracing::instrument(
        skip(self),
        fields(db.table = "medical_images", db.operation = "select", user_id = %owner_id)
    )]
    pub async fn list(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MedicalImage>, AppError> {
        let images: Vec<MedicalImage> = sqlx::query_as::<Postgres, MedicalImage>(
            r#"
            SELECT * FROM medical_images
            WHERE user_id = $1
            ORDER BY uploaded_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    /// Update title/description. Unset fields keep their current value.
    #[tracing::instrument(
        skip(self),
        fields(db.table = "medical_images", db.operation = "update", db.record_id = %id, user_id = %owner_id)
    )]
    pub async fn update_details(
        &self,
        owner_id: Uuid,
        id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<MedicalImage, AppError> {
        let image: Option<MedicalImage> = sqlx::query_as::<Postgres, MedicalImage>(
            r#"
            UPDATE medical_images
            SET title = COALESCE($3, title),
                description = COALESCE($4, description),
                updated_at = $5
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(title)
        .bind(description)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        image.ok_or_else(|| AppError::NotFound("Image not found".to_string()))
    }

    /// Delete the record, its blob, and (via cascade) any analysis result.
    ///
    /// The blob is removed before the row; if the row delete then fails the
    /// record remains without a blob, which the storage layer treats as
    /// missing rather than an error.
    #[tracing::instrument(
        skip(self),
        fields(db.table = "medical_images", db.operation = "delete", db.record_id = %id, user_id = %owner_id)
    )]
    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let image = self
            .get(owner_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

        if let Err(e) = self.storage.delete(&image.storage_key).await {
            tracing::warn!(
                storage_key = %image.storage_key,
                error = %e,
                "Failed to delete blob; continuing with record delete"
            );
        }

        sqlx::query("DELETE FROM medical_images WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Atomically claim the image for analysis.
    ///
    /// The transition succeeds only from the unstarted state; under N
    /// concurrent calls exactly one row update wins. Losers are classified
    /// by a follow-up owner-scoped read.
    #[tracing::instrument(
        skip(self),
        fields(db.table = "medical_images", db.operation = "update", db.record_id = %id, user_id = %owner_id)
    )]
    pub async fn start_analysis(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> Result<MedicalImage, StartAnalysisError> {
        let claimed: Option<MedicalImage> = sqlx::query_as::<Postgres, MedicalImage>(
            r#"
            UPDATE medical_images
            SET analysis_started_at = $3, updated_at = $3
            WHERE id = $1 AND user_id = $2
              AND analyzed = false AND analysis_started_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StartAnalysisError::Database(AppError::from(e)))?;

        if let Some(image) = claimed {
            return Ok(image);
        }

        match self
            .get(owner_id, id)
            .await
            .map_err(StartAnalysisError::Database)?
        {
            None => Err(StartAnalysisError::NotFound),
            Some(image) if image.analyzed => Err(StartAnalysisError::AlreadyCompleted),
            Some(_) => Err(StartAnalysisError::AlreadyStarted),
        }
    }

    /// Unscoped fetch for the analysis worker's write-back path.
    #[tracing::instrument(
        skip(self),
        fields(db.table = "medical_images", db.operation = "select", db.record_id = %id)
    )]
    pub async fn get_any(&self, id: Uuid) -> Result<Option<MedicalImage>, AppError> {
        let image: Option<MedicalImage> =
            sqlx::query_as::<Postgres, MedicalImage>("SELECT * FROM medical_images WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(image)
    }
}
