use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Multipart field carrying the model weights.
pub const MODEL_FIELD: &str = "model";
/// Multipart field carrying one image file; repeated once per image.
pub const IMAGES_FIELD: &str = "images";
/// Multipart field carrying one client-generated image id; repeated, same order as `images`.
pub const IMAGE_IDS_FIELD: &str = "image_ids";

/// Key under which the uploaded model's filename is added to inference results.
pub const MODEL_FILENAME_KEY: &str = "model_filename";
pub const DEFAULT_MODEL_FILENAME: &str = "model.pt";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok".into(),
        }
    }
}

/// Dataset being annotated in a workspace.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DatasetSplit {
    Train,
    Val,
}

impl DatasetSplit {
    pub fn phase_label(&self) -> &'static str {
        match self {
            DatasetSplit::Train => "Phase 2",
            DatasetSplit::Val => "Phase 3",
        }
    }

    pub fn dataset_name(&self) -> &'static str {
        match self {
            DatasetSplit::Train => "Train",
            DatasetSplit::Val => "Val",
        }
    }

    pub fn export_filename(&self) -> String {
        format!("{}.zip", self)
    }
}
