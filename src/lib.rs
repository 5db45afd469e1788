//! Polyglot - English-to-many text translation
//!
//! Wraps a pretrained multilingual translation model (NLLB-200 by default)
//! behind a language table keyed by display name, a memoized engine cache,
//! and CLI, interactive and HTTP surfaces.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod interactive;
pub mod languages;
pub mod server;
pub mod session;
