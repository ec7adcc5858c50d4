use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use shared::ErrorResponse;

use crate::inference::adapter::AdapterError;
use crate::inference::bridge::InferenceError;
use crate::inference::engine::EngineUnavailable;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Please provide a model file.")]
    MissingModel,
    #[error("Please select at least one image to run inference on.")]
    MissingImages,
    #[error("The number of image_ids ({ids}) does not match the number of images ({images}).")]
    IdCountMismatch { ids: usize, images: usize },
    #[error("Malformed multipart request: {0}")]
    Multipart(String),
    #[error("Field {0} must be valid UTF-8 text.")]
    InvalidText(String),
    #[error("Upload exceeds the limit of {limit} bytes.")]
    PayloadTooLarge { limit: usize },
    #[error(transparent)]
    Unavailable(#[from] EngineUnavailable),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl From<AdapterError> for ApiError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::Unavailable(e) => ApiError::Unavailable(e),
            AdapterError::Inference(e) => ApiError::Inference(e),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.to_string()))
    }
}
