use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolyglotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to load language table: {0}")]
    Load(String),

    #[error("Destination language code not found.")]
    UnknownLanguage(String),

    #[error("Translation engine error: {0}")]
    Engine(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PolyglotError>;
