//! Request and response types for document analysis

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw source as supplied by the caller
///
/// Serialized untagged: either a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceInput {
    /// Local path, web address or a single external handle
    Single(String),

    /// External handles from a previous partitioned run
    Many(Vec<String>),
}

impl From<&str> for SourceInput {
    fn from(value: &str) -> Self {
        SourceInput::Single(value.to_string())
    }
}

impl From<String> for SourceInput {
    fn from(value: String) -> Self {
        SourceInput::Single(value)
    }
}

impl From<Vec<String>> for SourceInput {
    fn from(value: Vec<String>) -> Self {
        SourceInput::Many(value)
    }
}

/// Request to answer a list of questions about a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Where the document comes from
    #[serde(rename = "pdf_source")]
    pub source: SourceInput,

    /// Questions to answer; order is preserved in the response
    pub queries: Vec<String>,
}

impl AnalysisRequest {
    /// Create a new request
    pub fn new(source: impl Into<SourceInput>, queries: Vec<String>) -> Self {
        Self {
            source: source.into(),
            queries,
        }
    }

    /// Check the request shape before any I/O happens
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.queries.is_empty() {
            return Err(RequestError::NoQueries);
        }
        if let Some(index) = self.queries.iter().position(|q| q.is_empty()) {
            return Err(RequestError::EmptyQuery { index });
        }
        if let SourceInput::Many(handles) = &self.source {
            if handles.is_empty() {
                return Err(RequestError::EmptyHandleList);
            }
            if let Some(index) = handles.iter().position(|h| h.is_empty()) {
                return Err(RequestError::EmptyHandle { index });
            }
        }
        Ok(())
    }
}

/// Malformed request errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// No queries were supplied
    #[error("At least one query is required")]
    NoQueries,

    /// A query is the empty string
    #[error("Query {} is empty", .index + 1)]
    EmptyQuery {
        /// Zero-based position of the offending query
        index: usize,
    },

    /// The handle list is empty
    #[error("Cached handle list must contain at least one handle")]
    EmptyHandleList,

    /// A handle in the list is the empty string
    #[error("Cached handle {} is empty", .index + 1)]
    EmptyHandle {
        /// Zero-based position of the offending handle
        index: usize,
    },
}

/// Answer to a single query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// The original question
    pub query: String,

    /// The answer based on document content
    pub answer: String,
}

impl QueryResponse {
    /// Create a new query/answer pair
    pub fn new(query: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            answer: answer.into(),
        }
    }
}

/// Result of an analysis call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Echo of the caller's source
    #[serde(rename = "pdf_source")]
    pub source: SourceInput,

    /// Handles produced (or replayed) during this call, in document order
    ///
    /// Passing them back as the source skips re-upload on follow-up calls.
    #[serde(rename = "cached_uris")]
    pub cached_handles: Vec<String>,

    /// One answer per input query, in input order
    pub responses: Vec<QueryResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(queries: &[&str]) -> AnalysisRequest {
        AnalysisRequest::new(
            "/path/to/file.pdf",
            queries.iter().map(|q| q.to_string()).collect(),
        )
    }

    #[test]
    fn test_rejects_empty_queries() {
        assert_eq!(request(&[]).validate(), Err(RequestError::NoQueries));
    }

    #[test]
    fn test_rejects_empty_query_string() {
        assert_eq!(
            request(&[""]).validate(),
            Err(RequestError::EmptyQuery { index: 0 })
        );
        assert_eq!(
            request(&["valid query", ""]).validate(),
            Err(RequestError::EmptyQuery { index: 1 })
        );
    }

    #[test]
    fn test_accepts_valid_queries() {
        assert!(request(&["What is this document about?"]).validate().is_ok());
        assert!(request(&["First question?", "Second question?"])
            .validate()
            .is_ok());
    }

    #[test]
    fn test_rejects_empty_handle_list() {
        let req = AnalysisRequest::new(Vec::<String>::new(), vec!["q".to_string()]);
        assert_eq!(req.validate(), Err(RequestError::EmptyHandleList));

        let req = AnalysisRequest::new(
            vec!["files/a".to_string(), String::new()],
            vec!["q".to_string()],
        );
        assert_eq!(req.validate(), Err(RequestError::EmptyHandle { index: 1 }));
    }

    #[test]
    fn test_source_input_deserializes_untagged() {
        let single: AnalysisRequest =
            serde_json::from_str(r#"{"pdf_source": "/a.pdf", "queries": ["q"]}"#).unwrap();
        assert_eq!(single.source, SourceInput::Single("/a.pdf".to_string()));

        let many: AnalysisRequest =
            serde_json::from_str(r#"{"pdf_source": ["u1", "u2"], "queries": ["q"]}"#).unwrap();
        assert_eq!(
            many.source,
            SourceInput::Many(vec!["u1".to_string(), "u2".to_string()])
        );
    }

    #[test]
    fn test_response_wire_field_names() {
        let response = AnalysisResponse {
            source: SourceInput::Single("/a.pdf".to_string()),
            cached_handles: vec!["uri-1".to_string()],
            responses: vec![QueryResponse::new("q", "a")],
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["pdf_source"], "/a.pdf");
        assert_eq!(json["cached_uris"][0], "uri-1");
        assert_eq!(json["responses"][0]["answer"], "a");
    }
}
