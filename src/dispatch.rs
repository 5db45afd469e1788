use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

use crate::engine::EngineHandle;

/// A single translation action: source text and destination FLORES-200 code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub target_code: String,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, target_code: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            target_code: target_code.into(),
        }
    }
}

/// Why a translation produced no text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    #[error("Please enter text to translate.")]
    EmptyInput,

    #[error("Pipeline creation failed: {0}")]
    EngineUnavailable(String),

    #[error("Error during translation: {0}")]
    Engine(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    Translated { text: String },
    Failed(FailureReason),
}

impl TranslationOutcome {
    pub fn is_translated(&self) -> bool {
        matches!(self, TranslationOutcome::Translated { .. })
    }

    /// Translated text, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            TranslationOutcome::Translated { text } => Some(text),
            TranslationOutcome::Failed(_) => None,
        }
    }
}

impl fmt::Display for TranslationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslationOutcome::Translated { text } => f.write_str(text),
            TranslationOutcome::Failed(reason) => write!(f, "{}", reason),
        }
    }
}

/// Runs translation requests against an engine handle
#[derive(Debug, Clone)]
pub struct Dispatcher {
    source_language: String,
}

impl Dispatcher {
    pub fn new(source_language: impl Into<String>) -> Self {
        Self {
            source_language: source_language.into(),
        }
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    /// Validate the request, invoke the engine once, and normalize the result.
    ///
    /// Never returns an error: every failure becomes `TranslationOutcome::Failed`.
    pub async fn translate(&self, handle: &EngineHandle, request: &TranslationRequest) -> TranslationOutcome {
        if request.text.trim().is_empty() {
            debug!("Rejecting empty translation input");
            return TranslationOutcome::Failed(FailureReason::EmptyInput);
        }

        let engine = match handle {
            EngineHandle::Ready(engine) => engine,
            EngineHandle::Failed(reason) => {
                return TranslationOutcome::Failed(FailureReason::EngineUnavailable(reason.clone()));
            }
        };

        debug!(
            "Translating {} chars {} -> {}",
            request.text.chars().count(),
            self.source_language,
            request.target_code
        );

        match engine
            .translate(&request.text, &self.source_language, &request.target_code)
            .await
        {
            Ok(raw) => TranslationOutcome::Translated {
                text: extract_translation(&raw),
            },
            Err(e) => {
                warn!("Translation to {} failed: {}", request.target_code, e);
                TranslationOutcome::Failed(FailureReason::Engine(e.to_string()))
            }
        }
    }
}

/// Pull `translation_text` out of a pipeline result, or stringify the whole result
fn extract_translation(raw: &Value) -> String {
    let first = match raw {
        Value::Array(items) => items.first(),
        other => Some(other),
    };

    first
        .and_then(|item| item.get("translation_text"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| raw.to_string())
}
