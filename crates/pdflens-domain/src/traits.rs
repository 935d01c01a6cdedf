//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the analysis engine and the
//! remote services it depends on. Implementations live in `pdflens-llm`.

use std::future::Future;
use std::time::Duration;

use url::Url;

use crate::remote::{FetchError, FileState, InferenceRequest, RemoteError, RemoteFile};

/// Remote file-handle service
///
/// Callers must poll [`FileService::status`] until the state leaves
/// `Processing` before using the file's URI.
pub trait FileService {
    /// Upload a byte payload and return its handle
    fn upload(
        &self,
        bytes: &[u8],
        mime_type: &str,
    ) -> impl Future<Output = Result<RemoteFile, RemoteError>> + Send;

    /// Current processing state of an uploaded file
    fn status(&self, name: &str) -> impl Future<Output = Result<FileState, RemoteError>> + Send;
}

/// Remote analysis service
pub trait AnalysisService {
    /// Run one structured analysis call and return the raw JSON text
    fn infer(
        &self,
        request: InferenceRequest<'_>,
    ) -> impl Future<Output = Result<String, RemoteError>> + Send;
}

/// Document fetch from a web address
pub trait DocumentFetcher {
    /// Fetch a PDF, failing on non-success status, wrong content type or timeout
    fn fetch(
        &self,
        url: &Url,
        timeout: Duration,
    ) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}
