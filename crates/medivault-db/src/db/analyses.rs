use chrono::Utc;
use medivault_core::models::{Analysis, NewAnalysis};
use medivault_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::transaction::with_transaction;

/// Analysis result repository
///
/// Results are written once by the analysis worker and read by the owning
/// user. The unique constraint on `image_id` enforces at most one result
/// per image.
#[derive(Clone)]
pub struct AnalysisRepository {
    pool: PgPool,
}

impl AnalysisRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record the worker's result and mark the image analyzed, atomically.
    ///
    /// Either both the result row and the image flags land, or neither does.
    /// A duplicate write-back hits the unique constraint and maps to a
    /// conflict; a write-back for a deleted image hits the foreign key and
    /// maps to not-found.
    #[tracing::instrument(
        skip(self, new),
        fields(db.table = "analysis_results", db.operation = "insert", image_id = %image_id)
    )]
    pub async fn create_for_image(
        &self,
        image_id: Uuid,
        new: NewAnalysis,
    ) -> Result<Analysis, AppError> {
        let now = Utc::now();

        with_transaction(&self.pool, |tx| {
            Box::pin(async move {
                let analysis: Analysis = sqlx::query_as::<Postgres, Analysis>(
                    r#"
                    INSERT INTO analysis_results (
                        id, image_id, results,
                        dice_score, iou_score, precision_score, recall_score,
                        processing_time, model_version, created_at, updated_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
                    RETURNING *
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(image_id)
                .bind(&new.results)
                .bind(new.dice_score)
                .bind(new.iou_score)
                .bind(new.precision)
                .bind(new.recall)
                .bind(new.processing_time)
                .bind(&new.model_version)
                .bind(now)
                .fetch_one(&mut **tx)
                .await?;

                sqlx::query(
                    r#"
                    UPDATE medical_images
                    SET analyzed = true,
                        analysis_started_at = COALESCE(analysis_started_at, $2),
                        analysis_completed_at = $2,
                        updated_at = $2
                    WHERE id = $1
                    "#,
                )
                .bind(image_id)
                .bind(now)
                .execute(&mut **tx)
                .await?;

                Ok::<_, sqlx::Error>(analysis)
            })
        })
        .await
        .map_err(|e| match e.downcast_ref::<sqlx::Error>() {
            Some(sqlx::Error::Database(db)) if db.is_unique_violation() => AppError::Conflict(
                "An analysis result already exists for this image".to_string(),
            ),
            Some(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                AppError::NotFound("Image not found".to_string())
            }
            _ => AppError::from(e),
        })
    }

    /// Fetch the result for an image the caller owns.
    #[tracing::instrument(
        skip(self),
        fields(db.table = "analysis_results", db.operation = "select", image_id = %image_id, user_id = %owner_id)
    )]
    pub async fn get_for_image(
        &self,
        owner_id: Uuid,
        image_id: Uuid,
    ) -> Result<Option<Analysis>, AppError> {
        let analysis: Option<Analysis> = sqlx::query_as::<Postgres, Analysis>(
            r#"
            SELECT a.*
            FROM analysis_results a
            JOIN medical_images m ON m.id = a.image_id
            WHERE a.image_id = $1 AND m.user_id = $2
            "#,
        )
        .bind(image_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(analysis)
    }
}
