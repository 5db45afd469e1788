use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{Config, EngineConfig};
use crate::dispatch::{Dispatcher, TranslationOutcome, TranslationRequest};
use crate::engine::{Device, DeviceSelector, EngineCache, EngineFactory, EngineHandle};
use crate::error::{PolyglotError, Result};
use crate::languages::LanguageTable;

/// Everything a surface needs to serve translations, built once at startup
pub struct Session {
    languages: LanguageTable,
    model: String,
    device: Device,
    engines: EngineCache,
    dispatcher: Dispatcher,
}

impl Session {
    /// Load the language table and prepare the engine cache.
    ///
    /// A missing or malformed language table is fatal; engine construction
    /// is deferred until the first translation.
    pub fn new(config: &Config, factory: Arc<dyn EngineFactory>) -> Result<Self> {
        let languages = LanguageTable::load(&config.languages.path, config.languages.duplicates)?;
        Self::with_languages(languages, &config.engine, factory)
    }

    pub fn with_languages(
        languages: LanguageTable,
        engine: &EngineConfig,
        factory: Arc<dyn EngineFactory>,
    ) -> Result<Self> {
        let device = engine.device.parse::<DeviceSelector>()?.resolve();
        info!("Using device {} for model {}", device, engine.model);

        Ok(Self {
            languages,
            model: engine.model.clone(),
            device,
            engines: EngineCache::new(factory, engine.alternate_model.clone()),
            dispatcher: Dispatcher::new(engine.source_language.clone()),
        })
    }

    pub fn languages(&self) -> &LanguageTable {
        &self.languages
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Engine handle for the primary or alternate model
    pub async fn engine(&self, use_alternate: bool) -> EngineHandle {
        self.engines
            .get_or_create(&self.model, self.device, use_alternate)
            .await
    }

    /// Resolve the display name, then translate `text` into that language.
    ///
    /// Only an unknown language name is an error; every engine or input
    /// problem is reported through the outcome.
    pub async fn translate(
        &self,
        text: &str,
        language: &str,
        use_alternate: bool,
    ) -> Result<TranslationOutcome> {
        let code = self
            .languages
            .resolve_code(language)
            .ok_or_else(|| PolyglotError::UnknownLanguage(language.to_string()))?;

        debug!("Resolved '{}' to {}", language, code);

        let handle = self.engine(use_alternate).await;
        let request = TranslationRequest::new(text, code);
        Ok(self.dispatcher.translate(&handle, &request).await)
    }

    /// Release every constructed engine
    pub fn shutdown(&self) {
        self.engines.clear();
    }
}
