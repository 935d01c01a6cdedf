//! Error types for partitioning

use thiserror::Error;

/// Errors that can occur while wrapping or splitting a document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkError {
    /// The document parsed but contains no pages
    #[error("PDF has no pages")]
    EmptyDocument,

    /// A single page cannot be divided further
    #[error("Cannot split a single-page chunk (page {page} of the original PDF)")]
    Unsplittable {
        /// One-based page number in the original document
        page: u32,
    },

    /// The bytes are not a readable PDF
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    /// A page subset could not be serialized
    #[error("Failed to write PDF fragment: {0}")]
    Write(String),

    /// The payload's page count disagrees with the partition metadata
    #[error("Partition claims {expected} pages but payload has {actual}")]
    PageCountMismatch {
        /// Pages recorded in the partition
        expected: u32,
        /// Pages found in the payload
        actual: u32,
    },
}

/// Result alias for this crate
pub type Result<T> = std::result::Result<T, ChunkError>;
