use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{PolyglotError, Result};
use super::{Device, EngineFactory, TranslationEngine};

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters<'a>,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceParameters<'a> {
    src_lang: &'a str,
    tgt_lang: &'a str,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
    use_gpu: bool,
}

/// Engine backed by a hosted translation pipeline
pub struct HttpEngine {
    client: Client,
    url: String,
    device: Device,
    api_token: Option<String>,
}

#[async_trait]
impl TranslationEngine for HttpEngine {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Value> {
        let request = InferenceRequest {
            inputs: text,
            parameters: InferenceParameters {
                src_lang: source_language,
                tgt_lang: target_language,
            },
            options: InferenceOptions {
                wait_for_model: true,
                use_gpu: self.device.is_accelerated(),
            },
        };

        debug!("Sending translation request to: {}", self.url);

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| PolyglotError::Engine(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(PolyglotError::Engine(format!(
                "Inference API error {}: {}", status, error_text
            )));
        }

        let raw: Value = response.json().await
            .map_err(|e| PolyglotError::Engine(format!("Failed to parse response: {}", e)))?;

        debug!("Raw engine response: {}", raw);
        Ok(raw)
    }
}

/// Builds `HttpEngine`s against an inference endpoint
pub struct HttpEngineFactory {
    endpoint: String,
    timeout: Duration,
    verify_on_load: bool,
    api_token: Option<String>,
}

impl HttpEngineFactory {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
            verify_on_load: config.verify_on_load,
            api_token: config.api_token(),
        }
    }

    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token;
        self
    }

    /// Check that the endpoint knows the model before handing out an engine
    async fn check_model_availability(&self, client: &Client, model: &str) -> Result<()> {
        let url = format!("{}/status/{}", self.endpoint, model);

        let mut builder = client.get(&url);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| PolyglotError::Engine(format!("Failed to connect to inference endpoint: {}", e)))?;

        if response.status().is_success() {
            info!("Model '{}' is available at {}", model, self.endpoint);
            Ok(())
        } else {
            Err(PolyglotError::Engine(format!(
                "Model '{}' is not available at {} (status {})",
                model,
                self.endpoint,
                response.status()
            )))
        }
    }
}

#[async_trait]
impl EngineFactory for HttpEngineFactory {
    async fn build(&self, model: &str, device: Device) -> Result<Arc<dyn TranslationEngine>> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("polyglot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        if self.verify_on_load {
            self.check_model_availability(&client, model).await?;
        }

        Ok(Arc::new(HttpEngine {
            client,
            url: format!("{}/models/{}", self.endpoint, model),
            device,
            api_token: self.api_token.clone(),
        }))
    }
}
