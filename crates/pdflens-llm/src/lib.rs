//! pdflens Remote Service Layer
//!
//! Implementations of the collaborator traits from `pdflens-domain`.
//!
//! # Architecture
//!
//! The analysis engine only sees the `FileService`, `AnalysisService` and
//! `DocumentFetcher` traits. This crate provides:
//!
//! - `GeminiClient`: Gemini Files API uploads, status polling and structured
//!   `generateContent` calls
//! - `HttpFetcher`: bounded-time PDF download from a web address
//! - `MockFileService`, `MockAnalysisService`, `MockFetcher`: deterministic,
//!   scripted stand-ins for tests
//!
//! # Examples
//!
//! ```no_run
//! use pdflens_llm::{GeminiClient, GeminiConfig};
//!
//! # fn example() -> Result<(), pdflens_llm::LlmError> {
//! let client = GeminiClient::new(GeminiConfig::from_env()?)?;
//! # let _ = client;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod fetch;
pub mod gemini;
pub mod mock;

use thiserror::Error;

pub use config::GeminiConfig;
pub use fetch::HttpFetcher;
pub use gemini::GeminiClient;
pub use mock::{MockAnalysisService, MockFetcher, MockFileService, RecordedInference};

/// Errors that can occur while setting up a remote client
#[derive(Error, Debug)]
pub enum LlmError {
    /// No API key in the environment
    #[error("GEMINI_API_KEY not set. Get your key from https://aistudio.google.com/apikey")]
    MissingApiKey,

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}
