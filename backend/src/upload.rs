use actix_multipart::Multipart;
use actix_web::web::{Bytes, BytesMut};
use futures::TryStreamExt;
use log::debug;
use shared::{IMAGE_IDS_FIELD, IMAGES_FIELD, MODEL_FIELD};

use crate::error::ApiError;

/// A file read from one multipart part.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedAsset {
    pub filename: Option<String>,
    pub data: Bytes,
}

impl UploadedAsset {
    pub fn new(filename: Option<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename,
            data: data.into(),
        }
    }
}

/// Fields of an inference submission, as received.
#[derive(Debug, Default)]
pub struct InferenceForm {
    pub model: Option<UploadedAsset>,
    pub images: Vec<UploadedAsset>,
    pub image_ids: Vec<String>,
}

impl InferenceForm {
    /// Drains the multipart stream. `model` and `images` only count when the
    /// part is a file with a non-empty filename, `image_ids` only when it is a
    /// plain field. Everything else is read and dropped; a repeated `model`
    /// field keeps the last one.
    pub async fn from_multipart(mut payload: Multipart, limit: usize) -> Result<Self, ApiError> {
        let mut form = InferenceForm::default();
        let mut received = 0usize;

        while let Some(mut field) = payload
            .try_next()
            .await
            .map_err(|e| ApiError::Multipart(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let filename = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(str::to_string);

            let mut data = BytesMut::new();
            while let Some(chunk) = field
                .try_next()
                .await
                .map_err(|e| ApiError::Multipart(e.to_string()))?
            {
                received += chunk.len();
                if received > limit {
                    return Err(ApiError::PayloadTooLarge { limit });
                }
                data.extend_from_slice(&chunk);
            }

            // an empty filename is what browsers send for an unselected file input
            let filename = filename.filter(|f| !f.is_empty());
            match (name.as_str(), filename) {
                (MODEL_FIELD, Some(filename)) => {
                    form.model = Some(UploadedAsset::new(Some(filename), data.freeze()))
                }
                (IMAGES_FIELD, Some(filename)) => {
                    form.images.push(UploadedAsset::new(Some(filename), data.freeze()))
                }
                (IMAGE_IDS_FIELD, None) => {
                    let id = String::from_utf8(data.to_vec())
                        .map_err(|_| ApiError::InvalidText(IMAGE_IDS_FIELD.to_string()))?;
                    form.image_ids.push(id);
                }
                (other, filename) => debug!(
                    "Ignoring multipart field {:?} (filename {:?})",
                    other, filename
                ),
            }
        }

        Ok(form)
    }

    /// Checks the submission in order: model, at least one image, one id per
    /// image. Ids are paired with images by position.
    pub fn validate(self) -> Result<(UploadedAsset, Vec<(String, UploadedAsset)>), ApiError> {
        let model = self.model.ok_or(ApiError::MissingModel)?;
        if self.images.is_empty() {
            return Err(ApiError::MissingImages);
        }
        if self.image_ids.len() != self.images.len() {
            return Err(ApiError::IdCountMismatch {
                ids: self.image_ids.len(),
                images: self.images.len(),
            });
        }
        Ok((model, self.image_ids.into_iter().zip(self.images).collect()))
    }
}
