//! HTTP surface over a shared session

use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dispatch::TranslationOutcome;
use crate::error::{PolyglotError, Result};
use crate::session::Session;

/// Application state
#[derive(Clone)]
pub struct AppState {
    session: Arc<Session>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub device: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguageItem {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguagesResponse {
    pub languages: Vec<LanguageItem>,
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub language: String,
    #[serde(default)]
    pub small_model: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub request_id: Uuid,
    pub created: i64,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranslateResponse {
    fn new(status: &str, text: Option<String>, error: Option<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            created: chrono::Utc::now().timestamp(),
            status: status.to_string(),
            text,
            error,
        }
    }
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "polyglot".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        device: state.session.device().to_string(),
    })
}

async fn list_languages(State(state): State<AppState>) -> Json<LanguagesResponse> {
    let languages = state
        .session
        .languages()
        .entries()
        .map(|(name, code)| LanguageItem {
            name: name.to_string(),
            code: code.to_string(),
        })
        .collect();

    Json(LanguagesResponse { languages })
}

/// Translation failures are reported in the body with 200; only an unknown
/// destination language is a client error.
async fn translate(
    State(state): State<AppState>,
    Json(payload): Json<TranslateRequest>,
) -> (StatusCode, Json<TranslateResponse>) {
    match state
        .session
        .translate(&payload.text, &payload.language, payload.small_model)
        .await
    {
        Ok(TranslationOutcome::Translated { text }) => (
            StatusCode::OK,
            Json(TranslateResponse::new("ok", Some(text), None)),
        ),
        Ok(TranslationOutcome::Failed(reason)) => (
            StatusCode::OK,
            Json(TranslateResponse::new("failed", None, Some(reason.to_string()))),
        ),
        Err(e @ PolyglotError::UnknownLanguage(_)) => {
            warn!("Unknown destination language: {}", payload.language);
            (
                StatusCode::NOT_FOUND,
                Json(TranslateResponse::new("failed", None, Some(e.to_string()))),
            )
        }
        Err(e) => {
            warn!("Translation request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TranslateResponse::new("failed", None, Some(e.to_string()))),
            )
        }
    }
}

pub fn router(session: Arc<Session>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/languages", get(list_languages))
        .route("/translate", post(translate))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { session })
}

/// Run the HTTP server until interrupted
pub async fn run_server(session: Arc<Session>, bind: &str) -> Result<()> {
    let addr: SocketAddr = bind
        .parse()
        .map_err(|e| PolyglotError::Config(format!("Invalid bind address '{}': {}", bind, e)))?;

    let app = router(session.clone());

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    session.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockEngineFactory;
    use crate::session::tests::{bonjour_factory, test_engine_config, test_languages};

    fn state(factory: MockEngineFactory) -> AppState {
        let session = Session::with_languages(test_languages(), &test_engine_config(), Arc::new(factory)).unwrap();
        AppState {
            session: Arc::new(session),
        }
    }

    fn request(text: &str, language: &str) -> TranslateRequest {
        TranslateRequest {
            text: text.to_string(),
            language: language.to_string(),
            small_model: false,
        }
    }

    #[tokio::test]
    async fn test_translate_success() {
        let (status, Json(body)) = translate(State(state(bonjour_factory())), Json(request("Hello world", "French"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.text.as_deref(), Some("Bonjour le monde"));
        assert!(body.error.is_none());
    }

    #[tokio::test]
    async fn test_translate_empty_text_reports_failure() {
        let (status, Json(body)) = translate(State(state(bonjour_factory())), Json(request("  ", "French"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "failed");
        assert_eq!(body.error.as_deref(), Some("Please enter text to translate."));
    }

    #[tokio::test]
    async fn test_translate_unknown_language_is_not_found() {
        let mut factory = MockEngineFactory::new();
        factory.expect_build().times(0);

        let (status, Json(body)) = translate(State(state(factory)), Json(request("Hello", "Klingon"))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error.as_deref(), Some("Destination language code not found."));
    }

    #[tokio::test]
    async fn test_languages_are_sorted() {
        let Json(body) = list_languages(State(state(MockEngineFactory::new()))).await;

        let names: Vec<&str> = body.languages.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["French", "German"]);
        assert_eq!(body.languages[0].code, "fra_Latn");
    }

    #[tokio::test]
    async fn test_health_reports_device() {
        let Json(body) = health_check(State(state(MockEngineFactory::new()))).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.device, "cpu");
    }
}
