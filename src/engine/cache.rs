use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::{Device, EngineFactory, EngineHandle, EngineKey};

/// Memoizes engine construction so each (model, device, alternate) key is built once.
///
/// Concurrent callers asking for the same key wait on a shared cell; only one
/// of them runs the factory. Construction failures are memoized as well.
pub struct EngineCache {
    factory: Arc<dyn EngineFactory>,
    alternate_model: String,
    slots: Mutex<HashMap<EngineKey, Arc<OnceCell<EngineHandle>>>>,
}

impl EngineCache {
    pub fn new(factory: Arc<dyn EngineFactory>, alternate_model: impl Into<String>) -> Self {
        Self {
            factory,
            alternate_model: alternate_model.into(),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the handle for this configuration, constructing it on first use
    pub async fn get_or_create(&self, model: &str, device: Device, use_alternate: bool) -> EngineHandle {
        let key = EngineKey {
            model: model.to_string(),
            device,
            use_alternate,
        };

        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots.entry(key.clone()).or_default().clone()
        };

        slot.get_or_init(|| self.construct(&key)).await.clone()
    }

    async fn construct(&self, key: &EngineKey) -> EngineHandle {
        let model = if key.use_alternate {
            self.alternate_model.as_str()
        } else {
            key.model.as_str()
        };

        info!("Creating translation engine: model={}, device={}", model, key.device);

        match self.factory.build(model, key.device).await {
            Ok(engine) => {
                info!("Translation engine ready: {}", model);
                EngineHandle::Ready(engine)
            }
            Err(e) => {
                warn!("Translation engine creation failed for {}: {}", model, e);
                EngineHandle::Failed(e.to_string())
            }
        }
    }

    /// Number of memoized configurations
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every memoized handle; the next request rebuilds its engine
    pub fn clear(&self) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        info!("Releasing {} translation engine(s)", slots.len());
        slots.clear();
    }
}
