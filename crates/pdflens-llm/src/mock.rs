//! Mock collaborators for deterministic testing
//!
//! These return scripted results without any network calls. Clones share
//! state, so a test can hand one clone to the engine and inspect the other.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pdflens_domain::{
    AnalysisService, DocumentFetcher, FetchError, FileService, FileState, InferenceRequest,
    RemoteError, RemoteFile, ResponseSchema, EXTERNAL_HANDLE_PREFIX,
};
use url::Url;

/// Mock file-handle service
///
/// Uploads always succeed with handles `files/mock-N`. Status calls pop
/// from a script and report `Active` once it is empty.
///
/// # Examples
///
/// ```
/// use pdflens_domain::FileState;
/// use pdflens_llm::MockFileService;
///
/// let files = MockFileService::new().with_statuses(vec![FileState::Processing]);
/// assert_eq!(files.upload_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockFileService {
    state: Arc<Mutex<FileScript>>,
}

#[derive(Debug, Default)]
struct FileScript {
    statuses: VecDeque<FileState>,
    uploaded_sizes: Vec<usize>,
    status_calls: usize,
    missing_uri: bool,
    upload_error: Option<RemoteError>,
    upload_state: Option<FileState>,
}

impl MockFileService {
    /// Create a service whose files are immediately active
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the states returned by successive status calls
    pub fn with_statuses(self, statuses: Vec<FileState>) -> Self {
        self.state.lock().unwrap().statuses = statuses.into();
        self
    }

    /// State reported in the upload response itself (defaults to processing)
    pub fn with_upload_state(self, state: FileState) -> Self {
        self.state.lock().unwrap().upload_state = Some(state);
        self
    }

    /// Make uploads come back without a URI
    pub fn with_missing_uri(self) -> Self {
        self.state.lock().unwrap().missing_uri = true;
        self
    }

    /// Make every upload fail with the given error
    pub fn with_upload_error(self, error: RemoteError) -> Self {
        self.state.lock().unwrap().upload_error = Some(error);
        self
    }

    /// Number of uploads performed
    pub fn upload_count(&self) -> usize {
        self.state.lock().unwrap().uploaded_sizes.len()
    }

    /// Byte sizes of every upload, in order
    pub fn uploaded_sizes(&self) -> Vec<usize> {
        self.state.lock().unwrap().uploaded_sizes.clone()
    }

    /// Number of status polls performed
    pub fn status_calls(&self) -> usize {
        self.state.lock().unwrap().status_calls
    }

    /// URI the mock assigns to the n-th upload (1-based)
    pub fn uri_for(n: usize) -> String {
        format!("{}v1beta/files/mock-{}", EXTERNAL_HANDLE_PREFIX, n)
    }
}

impl FileService for MockFileService {
    async fn upload(&self, bytes: &[u8], _mime_type: &str) -> Result<RemoteFile, RemoteError> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = &state.upload_error {
            return Err(error.clone());
        }

        state.uploaded_sizes.push(bytes.len());
        let n = state.uploaded_sizes.len();

        Ok(RemoteFile {
            name: format!("files/mock-{}", n),
            uri: if state.missing_uri {
                String::new()
            } else {
                Self::uri_for(n)
            },
            state: state.upload_state.unwrap_or(FileState::Processing),
        })
    }

    async fn status(&self, _name: &str) -> Result<FileState, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.status_calls += 1;
        Ok(state.statuses.pop_front().unwrap_or(FileState::Active))
    }
}

/// One recorded analysis call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedInference {
    /// File the call referenced
    pub file_uri: String,
    /// User prompt
    pub prompt: String,
    /// System instruction
    pub system_instruction: String,
    /// Requested schema
    pub schema: ResponseSchema,
}

/// Mock analysis service
///
/// Replies are consumed in order; an exhausted script yields an
/// `InvalidResponse` error.
///
/// # Examples
///
/// ```
/// use pdflens_llm::MockAnalysisService;
///
/// let analysis = MockAnalysisService::new();
/// analysis.push_error(MockAnalysisService::size_limit_error());
/// analysis.push_reply(r#"{"responses": [], "findings_summary": "none"}"#);
/// assert_eq!(analysis.call_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockAnalysisService {
    state: Arc<Mutex<AnalysisScript>>,
}

#[derive(Debug, Default)]
struct AnalysisScript {
    replies: VecDeque<Result<String, RemoteError>>,
    calls: Vec<RecordedInference>,
}

impl MockAnalysisService {
    /// Create a service with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful raw reply
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.state.lock().unwrap().replies.push_back(Ok(reply.into()));
    }

    /// Queue a failure
    pub fn push_error(&self, error: RemoteError) {
        self.state.lock().unwrap().replies.push_back(Err(error));
    }

    /// The error the service returns when input exceeds its capacity
    pub fn size_limit_error() -> RemoteError {
        RemoteError::Api {
            status: 400,
            message: "The input token count exceeds the maximum number of tokens allowed (1048576)."
                .to_string(),
        }
    }

    /// Every call made so far
    pub fn calls(&self) -> Vec<RecordedInference> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    /// Replies not yet consumed
    pub fn remaining(&self) -> usize {
        self.state.lock().unwrap().replies.len()
    }
}

impl AnalysisService for MockAnalysisService {
    async fn infer(&self, request: InferenceRequest<'_>) -> Result<String, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RecordedInference {
            file_uri: request.file_uri.to_string(),
            prompt: request.prompt.to_string(),
            system_instruction: request.system_instruction.to_string(),
            schema: request.schema,
        });
        state.replies.pop_front().unwrap_or_else(|| {
            Err(RemoteError::InvalidResponse(
                "mock script exhausted".to_string(),
            ))
        })
    }
}

/// Mock document fetcher returning a fixed result
#[derive(Debug, Clone)]
pub struct MockFetcher {
    result: Result<Vec<u8>, FetchError>,
    requests: Arc<Mutex<Vec<(Url, Duration)>>>,
}

impl MockFetcher {
    /// Serve the given bytes for every URL
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            result: Ok(bytes),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail every fetch with the given error
    pub fn failing(error: FetchError) -> Self {
        Self {
            result: Err(error),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// URLs and timeouts requested so far
    pub fn requests(&self) -> Vec<(Url, Duration)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl DocumentFetcher for MockFetcher {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        self.requests.lock().unwrap().push((url.clone(), timeout));
        self.result.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str) -> InferenceRequest<'_> {
        InferenceRequest {
            file_uri: uri,
            mime_type: "application/pdf",
            prompt: "prompt",
            system_instruction: "system",
            schema: ResponseSchema::Answers,
        }
    }

    #[tokio::test]
    async fn test_file_service_uploads_and_statuses() {
        let files = MockFileService::new().with_statuses(vec![FileState::Processing]);

        let first = files.upload(b"abc", "application/pdf").await.unwrap();
        let second = files.upload(b"defg", "application/pdf").await.unwrap();
        assert_eq!(first.name, "files/mock-1");
        assert_eq!(second.uri, MockFileService::uri_for(2));
        assert_eq!(files.uploaded_sizes(), vec![3, 4]);

        assert_eq!(files.status("files/mock-1").await.unwrap(), FileState::Processing);
        assert_eq!(files.status("files/mock-1").await.unwrap(), FileState::Active);
        assert_eq!(files.status_calls(), 2);
    }

    #[tokio::test]
    async fn test_analysis_script_order() {
        let analysis = MockAnalysisService::new();
        analysis.push_error(MockAnalysisService::size_limit_error());
        analysis.push_reply("{}");

        assert!(analysis.infer(request("u1")).await.unwrap_err().is_size_limit());
        assert_eq!(analysis.infer(request("u2")).await.unwrap(), "{}");
        assert!(matches!(
            analysis.infer(request("u3")).await,
            Err(RemoteError::InvalidResponse(_))
        ));

        let calls = analysis.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].file_uri, "u2");
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let analysis = MockAnalysisService::new();
        let clone = analysis.clone();
        analysis.push_reply("{}");

        clone.infer(request("u")).await.unwrap();
        assert_eq!(analysis.call_count(), 1);
        assert_eq!(analysis.remaining(), 0);
    }

    #[tokio::test]
    async fn test_fetcher_records_requests() {
        let fetcher = MockFetcher::new(vec![1, 2, 3]);
        let url = Url::parse("https://example.com/a.pdf").unwrap();

        let bytes = fetcher.fetch(&url, Duration::from_secs(5)).await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
        assert_eq!(fetcher.requests(), vec![(url, Duration::from_secs(5))]);
    }
}
