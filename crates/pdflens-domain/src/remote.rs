//! Types exchanged with the remote collaborators

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// MIME type sent with every upload and inference call
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// HTTP status the analysis service uses for oversized input
const SIZE_LIMIT_STATUS: u16 = 400;

/// Message fragment that marks an oversized-input rejection
const SIZE_LIMIT_MARKER: &str = "input token count exceeds";

/// Processing state of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    /// Still being ingested; poll again
    Processing,
    /// Ready for use
    Active,
    /// Ingestion failed; terminal
    Failed,
    /// Any state this client does not know about
    #[serde(other)]
    Unknown,
}

/// A file held by the remote file-handle service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Resource name used for status polling (e.g. `files/abc123`)
    pub name: String,

    /// Address used to reference the file in inference calls
    pub uri: String,

    /// State reported at upload time
    pub state: FileState,
}

/// Which structured-output schema the analysis call must follow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSchema {
    /// `responses[{query, answer}]`
    Answers,
    /// `responses[{query, answer}]` plus a required `findings_summary`
    AnswersWithFindings,
}

/// A single analysis call against an uploaded file
#[derive(Debug, Clone, Copy)]
pub struct InferenceRequest<'a> {
    /// Address of the uploaded file
    pub file_uri: &'a str,
    /// MIME type of the uploaded file
    pub mime_type: &'a str,
    /// User prompt listing the queries
    pub prompt: &'a str,
    /// System instruction for this call
    pub system_instruction: &'a str,
    /// Required output shape
    pub schema: ResponseSchema,
}

/// Failures reported by the remote file-handle or analysis service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The service answered with an error status
    #[error("Remote API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message returned by the service
        message: String,
    },

    /// The request never produced a response
    #[error("Communication error: {0}")]
    Communication(String),

    /// The response could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// Whether this failure means the input exceeded the service's capacity
    ///
    /// Only these failures are recoverable by splitting the input.
    pub fn is_size_limit(&self) -> bool {
        match self {
            RemoteError::Api { status, message } => {
                *status == SIZE_LIMIT_STATUS && message.contains(SIZE_LIMIT_MARKER)
            }
            _ => false,
        }
    }

    /// HTTP status if the service returned one
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures while fetching a document from a web address
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No response within the wall-clock bound
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Non-success status
    #[error("HTTP {status}: {reason}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase
        reason: String,
    },

    /// The response is not a PDF
    #[error("URL does not point to a PDF file. Content-Type: {0}")]
    ContentTypeMismatch(String),

    /// Connection-level failure
    #[error("Failed to fetch URL: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_limit_signature() {
        let err = RemoteError::Api {
            status: 400,
            message: "The input token count exceeds the maximum number of tokens allowed"
                .to_string(),
        };
        assert!(err.is_size_limit());
    }

    #[test]
    fn test_other_400_is_not_size_limit() {
        let err = RemoteError::Api {
            status: 400,
            message: "Request contains an invalid argument.".to_string(),
        };
        assert!(!err.is_size_limit());
    }

    #[test]
    fn test_marker_with_other_status_is_not_size_limit() {
        let err = RemoteError::Api {
            status: 500,
            message: "input token count exceeds".to_string(),
        };
        assert!(!err.is_size_limit());
        assert!(!RemoteError::Communication("input token count exceeds".to_string()).is_size_limit());
    }

    #[test]
    fn test_file_state_wire_names() {
        let state: FileState = serde_json::from_str(r#""PROCESSING""#).unwrap();
        assert_eq!(state, FileState::Processing);
        let state: FileState = serde_json::from_str(r#""STATE_UNSPECIFIED""#).unwrap();
        assert_eq!(state, FileState::Unknown);
    }

    #[test]
    fn test_fetch_timeout_message() {
        let err = FetchError::Timeout(Duration::from_secs(60));
        assert_eq!(err.to_string(), "Request timed out after 60s");
    }
}
