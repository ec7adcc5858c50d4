use actix_web::web::Bytes;
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::bridge::{ImageRequest, InferenceBridge, InferenceError, InferenceResult};
use super::engine::EngineSlot;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model_len: usize,
    pub requests: Vec<ImageRequest>,
}

/// Bridge double that records every batch and answers with a fixed outcome.
#[derive(Default)]
pub struct RecordingBridge {
    pub calls: Mutex<Vec<RecordedCall>>,
    pub constructions: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    result: InferenceResult,
    failure: Option<String>,
    delay: Option<Duration>,
}

impl RecordingBridge {
    pub fn returning(result: Value) -> Self {
        Self {
            result: result.as_object().cloned().unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Slot whose factory hands out this bridge and counts constructions.
    pub fn into_slot(self: &Arc<Self>, max_concurrency: usize) -> EngineSlot {
        let bridge = self.clone();
        EngineSlot::new(
            Box::new(move || -> Result<Arc<dyn InferenceBridge>, String> {
                bridge.constructions.fetch_add(1, Ordering::SeqCst);
                Ok(bridge.clone())
            }),
            max_concurrency,
        )
    }
}

impl InferenceBridge for RecordingBridge {
    fn run(
        &self,
        model: Bytes,
        requests: Vec<ImageRequest>,
    ) -> BoxFuture<'_, Result<InferenceResult, InferenceError>> {
        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.calls.lock().unwrap().push(RecordedCall {
                model_len: model.len(),
                requests,
            });
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match &self.failure {
                Some(message) => Err(InferenceError::Rejected(message.clone())),
                None => Ok(self.result.clone()),
            }
        })
    }
}
