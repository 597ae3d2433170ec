use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

/// Analysis result written once by the analysis worker. At most one per
/// image (unique constraint on `image_id`); removed with the image.
///
/// Metric scores are expected in [0,1] but stored as given; the worker is
/// trusted for ranges.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Analysis {
    pub id: Uuid,
    pub image_id: Uuid,
    pub results: JsonValue,
    pub dice_score: Option<f64>,
    pub iou_score: Option<f64>,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "precision_score"))]
    pub precision: Option<f64>,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "recall_score"))]
    pub recall: Option<f64>,
    pub processing_time: Option<f64>,
    pub model_version: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Worker payload for completing an analysis.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewAnalysis {
    /// Opaque structured result document.
    #[serde(default = "empty_results")]
    pub results: JsonValue,
    /// Dice coefficient, expected in [0,1].
    pub dice_score: Option<f64>,
    /// Intersection-over-union, expected in [0,1].
    pub iou_score: Option<f64>,
    /// Precision, expected in [0,1].
    pub precision: Option<f64>,
    /// Recall, expected in [0,1].
    pub recall: Option<f64>,
    /// Wall-clock processing time in seconds.
    pub processing_time: Option<f64>,
    #[serde(default)]
    pub model_version: String,
}

fn empty_results() -> JsonValue {
    JsonValue::Object(serde_json::Map::new())
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalysisResponse {
    pub id: Uuid,
    pub image_id: Uuid,
    pub results: JsonValue,
    pub dice_score: Option<f64>,
    pub iou_score: Option<f64>,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub processing_time: Option<f64>,
    pub model_version: String,
    pub created_at: DateTime<Utc>,
}

impl From<Analysis> for AnalysisResponse {
    fn from(a: Analysis) -> Self {
        AnalysisResponse {
            id: a.id,
            image_id: a.image_id,
            results: a.results,
            dice_score: a.dice_score,
            iou_score: a.iou_score,
            precision: a.precision,
            recall: a.recall,
            processing_time: a.processing_time,
            model_version: a.model_version,
            created_at: a.created_at,
        }
    }
}
