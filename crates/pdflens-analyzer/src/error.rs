//! Error types for the Analyzer

use pdflens_chunker::ChunkError;
use pdflens_domain::{FetchError, RemoteError, RequestError, SourceError};
use pdflens_llm::LlmError;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during analysis
///
/// Only size-limit failures on partitioned input are recovered internally;
/// everything here aborts the call.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// Local path failed validation
    #[error(transparent)]
    Validation(#[from] SourceError),

    /// Request shape is malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] RequestError),

    /// Document could not be fetched from its web address
    #[error("Failed to fetch PDF from URL: {0}")]
    Fetch(#[from] FetchError),

    /// Upload returned no identifiers, or the file reached a failed state
    #[error("File upload failed: {0}")]
    UploadFailed(String),

    /// The uploaded file never left the processing state
    #[error("File processing timed out: {name} still processing after {attempts} polls")]
    ProcessingTimeout {
        /// Remote resource name
        name: String,
        /// Polls performed
        attempts: u32,
    },

    /// A single page still exceeds the service's capacity
    #[error("Cannot split a single-page chunk (page {page} of the original PDF)")]
    Unsplittable {
        /// One-based page number in the original document
        page: u32,
    },

    /// The document has no pages
    #[error("PDF has no pages")]
    EmptyDocument,

    /// The document could not be parsed or re-serialized
    #[error("PDF processing error: {0}")]
    Document(String),

    /// Input exceeded the service's capacity where no split is possible
    #[error("Document exceeds the analysis service's input limit: {0}")]
    SizeLimit(RemoteError),

    /// Any other remote failure
    #[error(transparent)]
    Remote(RemoteError),

    /// The model reply could not be interpreted
    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    /// Reading a local file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote client could not be constructed
    #[error(transparent)]
    Client(#[from] LlmError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Background PDF work panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<RemoteError> for AnalyzeError {
    fn from(e: RemoteError) -> Self {
        if e.is_size_limit() {
            AnalyzeError::SizeLimit(e)
        } else {
            AnalyzeError::Remote(e)
        }
    }
}

impl From<ChunkError> for AnalyzeError {
    fn from(e: ChunkError) -> Self {
        match e {
            ChunkError::EmptyDocument => AnalyzeError::EmptyDocument,
            ChunkError::Unsplittable { page } => AnalyzeError::Unsplittable { page },
            other => AnalyzeError::Document(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AnalyzeError {
    fn from(e: serde_json::Error) -> Self {
        AnalyzeError::InvalidResponse(format!("JSON parse error: {}", e))
    }
}

/// Caller-facing rendering of an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    /// One-line description
    pub error: String,

    /// Hint or raw service message, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AnalyzeError {
    /// Render the error with an actionable hint where one applies
    pub fn report(&self) -> ErrorReport {
        let (error, details) = match self {
            AnalyzeError::Remote(RemoteError::Api { status, message })
            | AnalyzeError::SizeLimit(RemoteError::Api { status, message }) => (
                format!("Gemini API error (HTTP {})", status),
                Some(message.clone()),
            ),
            AnalyzeError::Client(LlmError::MissingApiKey) => (
                self.to_string(),
                Some("Set the GEMINI_API_KEY environment variable.".to_string()),
            ),
            AnalyzeError::Validation(SourceError::NotFound(_)) => (
                self.to_string(),
                Some("Ensure the path is absolute and the file exists.".to_string()),
            ),
            AnalyzeError::Fetch(_) => (
                self.to_string(),
                Some("Check that the URL is accessible and points to a valid PDF file.".to_string()),
            ),
            _ => (self.to_string(), None),
        };
        ErrorReport { error, details }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_size_limit_remote_error_converts_to_size_limit() {
        let err: AnalyzeError = RemoteError::Api {
            status: 400,
            message: "The input token count exceeds the maximum".to_string(),
        }
        .into();
        assert!(matches!(err, AnalyzeError::SizeLimit(_)));

        let err: AnalyzeError = RemoteError::Communication("reset".to_string()).into();
        assert!(matches!(err, AnalyzeError::Remote(_)));
    }

    #[test]
    fn test_chunk_error_conversion() {
        let err: AnalyzeError = ChunkError::Unsplittable { page: 7 }.into();
        assert!(matches!(err, AnalyzeError::Unsplittable { page: 7 }));
        assert!(err.to_string().contains("single-page chunk"));

        let err: AnalyzeError = ChunkError::Parse("bad xref".to_string()).into();
        assert!(matches!(err, AnalyzeError::Document(_)));
    }

    #[test]
    fn test_api_error_report() {
        let report = AnalyzeError::Remote(RemoteError::Api {
            status: 503,
            message: "The model is overloaded.".to_string(),
        })
        .report();

        assert_eq!(report.error, "Gemini API error (HTTP 503)");
        assert_eq!(report.details.as_deref(), Some("The model is overloaded."));
    }

    #[test]
    fn test_not_found_report_has_hint() {
        let report =
            AnalyzeError::Validation(SourceError::NotFound(PathBuf::from("/tmp/missing.pdf")))
                .report();

        assert_eq!(report.error, "PDF file not found: /tmp/missing.pdf");
        assert!(report.details.unwrap().contains("absolute"));
    }

    #[test]
    fn test_fetch_report_has_hint() {
        let report = AnalyzeError::Fetch(FetchError::Timeout(Duration::from_secs(60))).report();
        assert_eq!(
            report.error,
            "Failed to fetch PDF from URL: Request timed out after 60s"
        );
        assert!(report.details.is_some());
    }

    #[test]
    fn test_missing_key_report() {
        let report = AnalyzeError::Client(LlmError::MissingApiKey).report();
        assert!(report.error.contains("GEMINI_API_KEY"));
        assert!(report.details.is_some());
    }

    #[test]
    fn test_plain_report_omits_details() {
        let report = AnalyzeError::EmptyDocument.report();
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"error":"PDF has no pages"}"#);
    }
}
