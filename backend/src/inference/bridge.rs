use actix_web::web::Bytes;
use futures::future::BoxFuture;
use serde_json::{Map, Value};

/// Result mapping returned by a bridge. Its structure belongs to the engine.
pub type InferenceResult = Map<String, Value>;

/// One uploaded image prepared for batched inference.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub image_id: String,
    pub filename: String,
    pub data: Bytes,
}

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("{0}")]
    Rejected(String),
    #[error("Inference bridge request failed: {0}")]
    Transport(String),
    #[error("Inference bridge returned an unexpected response: {0}")]
    MalformedResponse(String),
}

/// Object-detection engine the server delegates to.
///
/// `run` receives the raw model weights and the whole batch of images in one
/// call. Implementations must be shareable between workers; whether they may
/// run concurrently is controlled by [`super::engine::Engine`].
pub trait InferenceBridge: Send + Sync {
    fn run(
        &self,
        model: Bytes,
        requests: Vec<ImageRequest>,
    ) -> BoxFuture<'_, Result<InferenceResult, InferenceError>>;
}
