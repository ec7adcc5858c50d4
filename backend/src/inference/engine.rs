use actix_web::web::Bytes;
use log::{error, info};
use std::sync::{Arc, OnceLock};
use tokio::sync::Semaphore;

use super::bridge::{ImageRequest, InferenceBridge, InferenceError, InferenceResult};
use super::http_bridge::HttpBridge;
use crate::config::AppConfig;

/// Constructs the bridge. Called at most once per [`EngineSlot`].
pub type BridgeFactory =
    Box<dyn Fn() -> Result<Arc<dyn InferenceBridge>, String> + Send + Sync>;

#[derive(Debug, Clone, thiserror::Error)]
#[error("YOLOv9 bridge could not be initialised: {reason}")]
pub struct EngineUnavailable {
    reason: String,
}

/// Handle to the constructed bridge. Calls go through a semaphore so that a
/// non-reentrant bridge is never entered by two requests at once.
#[derive(Clone)]
pub struct Engine {
    bridge: Arc<dyn InferenceBridge>,
    permits: Arc<Semaphore>,
}

impl Engine {
    pub async fn run(
        &self,
        model: Bytes,
        requests: Vec<ImageRequest>,
    ) -> Result<InferenceResult, InferenceError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| InferenceError::Transport(e.to_string()))?;
        self.bridge.run(model, requests).await
    }
}

/// Application-scoped holder of the single engine instance.
///
/// Locating the bridge happens when the slot is built; construction happens on
/// first use. Both outcomes are remembered, so an unavailable bridge yields the
/// same error for the lifetime of the slot.
pub struct EngineSlot {
    located: Result<BridgeFactory, String>,
    max_concurrency: usize,
    engine: OnceLock<Result<Engine, EngineUnavailable>>,
}

impl EngineSlot {
    pub fn new(factory: BridgeFactory, max_concurrency: usize) -> Self {
        Self {
            located: Ok(factory),
            max_concurrency: max_concurrency.max(1),
            engine: OnceLock::new(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            located: Err(reason.into()),
            max_concurrency: 1,
            engine: OnceLock::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        match HttpBridge::locate(config) {
            Ok(factory) => Self::new(factory, config.max_concurrency),
            Err(reason) => {
                error!("YOLOv9 bridge is unavailable: {}", reason);
                Self::unavailable(reason)
            }
        }
    }

    pub fn ensure_engine(&self) -> Result<Engine, EngineUnavailable> {
        self.engine
            .get_or_init(|| {
                let factory = self.located.as_ref().map_err(|reason| EngineUnavailable {
                    reason: reason.clone(),
                })?;
                let bridge = factory().map_err(|reason| {
                    error!("Failed to construct YOLOv9 bridge: {}", reason);
                    EngineUnavailable { reason }
                })?;
                info!(
                    "YOLOv9 bridge constructed (max {} concurrent runs)",
                    self.max_concurrency
                );
                Ok(Engine {
                    bridge,
                    permits: Arc::new(Semaphore::new(self.max_concurrency)),
                })
            })
            .clone()
    }
}
