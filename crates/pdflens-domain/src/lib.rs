//! pdflens Domain Layer
//!
//! This crate contains the core vocabulary of pdflens: what a caller asks for,
//! what it gets back, and the traits that describe the remote collaborators the
//! analysis engine talks to. It performs no network I/O.
//!
//! ## Key Concepts
//!
//! - **Source**: where the document comes from - a local path, a web address,
//!   a handle to a file already uploaded to the remote service, or a list of
//!   such handles from a previous partitioned run
//! - **Queries**: an ordered, non-empty list of questions about the document
//! - **Reconciliation**: every input query receives exactly one answer, in
//!   input order, whatever the model returned
//! - **Collaborators**: file-handle service, analysis service, document fetch
//!
//! ## Architecture
//!
//! - Pure types and logic only
//! - Infrastructure implementations live in `pdflens-llm`
//! - The scheduling engine lives in `pdflens-analyzer`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod reconcile;
pub mod remote;
pub mod request;
pub mod source;
pub mod traits;

// Re-exports for convenience
pub use reconcile::{reconcile_answers, NO_ANSWER_PLACEHOLDER};
pub use remote::{
    FetchError, FileState, InferenceRequest, RemoteError, RemoteFile, ResponseSchema,
    PDF_MIME_TYPE,
};
pub use request::{AnalysisRequest, AnalysisResponse, QueryResponse, RequestError, SourceInput};
pub use source::{
    classify, is_external_handle, is_web_url, validate_local_path, AnalysisSource, SourceError,
    EXTERNAL_HANDLE_PREFIX,
};
pub use traits::{AnalysisService, DocumentFetcher, FileService};
