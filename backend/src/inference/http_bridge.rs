use actix_web::web::Bytes;
use futures::future::BoxFuture;
use log::{debug, info};
use reqwest::{Body, Client};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use shared::{DEFAULT_MODEL_FILENAME, IMAGE_IDS_FIELD, IMAGES_FIELD, MODEL_FIELD};
use std::sync::Arc;
use url::Url;

use super::bridge::{ImageRequest, InferenceBridge, InferenceError, InferenceResult};
use super::engine::BridgeFactory;
use crate::config::AppConfig;

/// Bridge backed by a YOLOv9 inference sidecar reachable over HTTP.
///
/// The batch is posted as one multipart request to `<base>/run`: the model
/// weights first, then an `image_ids`/`images` pair per request in order.
pub struct HttpBridge {
    client: Client,
    endpoint: Url,
}

impl HttpBridge {
    /// Resolves the sidecar endpoint from the configuration. The returned
    /// factory builds the HTTP client lazily.
    pub fn locate(config: &AppConfig) -> Result<BridgeFactory, String> {
        let base = config
            .bridge_url
            .as_deref()
            .ok_or_else(|| "YOLOV9_BRIDGE_URL is not set".to_string())?;
        let endpoint = run_endpoint(base)?;
        let timeout = config.bridge_timeout;

        info!("YOLOv9 bridge located at {}", endpoint);

        Ok(Box::new(move || -> Result<Arc<dyn InferenceBridge>, String> {
            let mut builder = Client::builder();
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }
            let client = builder.build().map_err(|e| e.to_string())?;
            Ok(Arc::new(HttpBridge {
                client,
                endpoint: endpoint.clone(),
            }) as Arc<dyn InferenceBridge>)
        }))
    }

    fn build_form(model: Bytes, requests: Vec<ImageRequest>) -> Form {
        let mut form = Form::new().part(
            MODEL_FIELD,
            shared_part(model).file_name(DEFAULT_MODEL_FILENAME),
        );
        for request in requests {
            form = form.text(IMAGE_IDS_FIELD, request.image_id).part(
                IMAGES_FIELD,
                shared_part(request.data).file_name(request.filename),
            );
        }
        form
    }
}

/// Wraps uploaded bytes without copying them; the length is kept so the
/// sidecar still receives a sized part.
fn shared_part(data: Bytes) -> Part {
    let len = data.len() as u64;
    Part::stream_with_length(Body::from(data), len)
}

impl InferenceBridge for HttpBridge {
    fn run(
        &self,
        model: Bytes,
        requests: Vec<ImageRequest>,
    ) -> BoxFuture<'_, Result<InferenceResult, InferenceError>> {
        Box::pin(async move {
            debug!(
                "Posting {} image(s) and {} model bytes to {}",
                requests.len(),
                model.len(),
                self.endpoint
            );
            let form = Self::build_form(model, requests);
            let response = self
                .client
                .post(self.endpoint.clone())
                .multipart(form)
                .send()
                .await
                .map_err(|e| InferenceError::Transport(e.to_string()))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| InferenceError::Transport(e.to_string()))?;

            if !status.is_success() {
                return Err(InferenceError::Rejected(rejection_message(
                    status.as_u16(),
                    &body,
                )));
            }
            parse_result(&body)
        })
    }
}

fn run_endpoint(base: &str) -> Result<Url, String> {
    let mut base =
        Url::parse(base.trim()).map_err(|e| format!("invalid YOLOV9_BRIDGE_URL {:?}: {}", base, e))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(format!(
            "YOLOV9_BRIDGE_URL must use http or https, got {:?}",
            base.scheme()
        ));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("run").map_err(|e| e.to_string())
}

fn rejection_message(status: u16, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["error", "detail"] {
            if let Some(Value::String(message)) = map.get(key) {
                return message.clone();
            }
        }
    }
    let text = body.trim();
    if text.is_empty() {
        format!("Inference bridge responded with status {}", status)
    } else {
        text.to_string()
    }
}

fn parse_result(body: &str) -> Result<InferenceResult, InferenceError> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(InferenceError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(InferenceError::MalformedResponse(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
