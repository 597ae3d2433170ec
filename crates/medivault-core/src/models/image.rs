use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Medical image record. Owned by exactly one user; ownership is set at
/// upload from the authenticated caller and never changes.
///
/// Analysis lifecycle is encoded in two timestamps plus the `analyzed` flag:
/// unstarted (both null), started (`analysis_started_at` set), completed
/// (`analyzed` true, `analysis_completed_at` set). `analyzed` implies
/// `analysis_started_at` is set; the schema enforces this.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MedicalImage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub storage_key: String,
    pub content_type: String,
    pub title: String,
    pub description: String,
    pub analyzed: bool,
    pub analysis_started_at: Option<DateTime<Utc>>,
    pub analysis_completed_at: Option<DateTime<Utc>>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub file_size: i64,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Analysis state derived from the timestamps (see `MedicalImage`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisState {
    Unstarted,
    Started,
    Completed,
}

impl MedicalImage {
    pub fn analysis_state(&self) -> AnalysisState {
        if self.analyzed {
            AnalysisState::Completed
        } else if self.analysis_started_at.is_some() {
            AnalysisState::Started
        } else {
            AnalysisState::Unstarted
        }
    }
}

/// API view of a medical image; `image_url` is resolved from the storage
/// backend at response-build time.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImageResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub content_type: String,
    pub title: String,
    pub description: String,
    pub analyzed: bool,
    pub analysis_state: AnalysisState,
    pub analysis_started_at: Option<DateTime<Utc>>,
    pub analysis_completed_at: Option<DateTime<Utc>>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub file_size: i64,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImageResponse {
    pub fn from_image(image: MedicalImage, image_url: String) -> Self {
        let analysis_state = image.analysis_state();
        ImageResponse {
            id: image.id,
            user_id: image.user_id,
            image_url,
            content_type: image.content_type,
            title: image.title,
            description: image.description,
            analyzed: image.analyzed,
            analysis_state,
            analysis_started_at: image.analysis_started_at,
            analysis_completed_at: image.analysis_completed_at,
            width: image.width,
            height: image.height,
            file_size: image.file_size,
            uploaded_at: image.uploaded_at,
            updated_at: image.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateImageRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StartAnalysisResponse {
    pub message: String,
    pub image_id: Uuid,
    pub analysis_started_at: DateTime<Utc>,
}
