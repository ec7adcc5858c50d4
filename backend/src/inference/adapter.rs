use serde_json::Value;
use shared::{DEFAULT_MODEL_FILENAME, MODEL_FILENAME_KEY};

use super::bridge::{ImageRequest, InferenceError, InferenceResult};
use super::engine::{EngineSlot, EngineUnavailable};
use crate::upload::UploadedAsset;

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error(transparent)]
    Unavailable(#[from] EngineUnavailable),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Runs one batched inference over the uploaded model and labelled images,
/// then adds the model filename to the engine's result.
pub async fn run_inference<I>(
    slot: &EngineSlot,
    model: UploadedAsset,
    images: I,
) -> Result<InferenceResult, AdapterError>
where
    I: IntoIterator<Item = (String, UploadedAsset)>,
{
    let engine = slot.ensure_engine()?;

    let requests: Vec<ImageRequest> = images
        .into_iter()
        .map(|(image_id, upload)| ImageRequest {
            image_id,
            filename: upload.filename.unwrap_or_default(),
            data: upload.data,
        })
        .collect();

    let model_filename = model
        .filename
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_MODEL_FILENAME.to_string());

    let mut result = engine.run(model.data, requests).await?;
    // the engine's own value wins if it reports this key
    result
        .entry(MODEL_FILENAME_KEY)
        .or_insert(Value::String(model_filename));
    Ok(result)
}
