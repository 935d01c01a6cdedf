//! pdflens Chunker
//!
//! Page-range partitions of a PDF document.
//!
//! # Overview
//!
//! A [`Partition`] is a contiguous page range of a document together with a
//! self-contained PDF payload holding only those pages. Partitions are split
//! in half (first half takes the extra page on odd counts) until the pieces
//! are small enough for the remote service.
//!
//! ```text
//! [0, 10) ──split──> [0, 5) + [5, 10)
//! [0, 7)  ──split──> [0, 4) + [4, 7)
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use pdflens_chunker::Partition;
//!
//! # fn example(bytes: Vec<u8>) -> Result<(), pdflens_chunker::ChunkError> {
//! let whole = Partition::wrap(bytes)?;
//! let (first, second) = whole.split_in_half()?;
//! assert_eq!(first.start_page() + first.page_count(), second.start_page());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod partition;

#[cfg(any(test, feature = "test-support"))]
pub mod fixtures;

pub use error::{ChunkError, Result};
pub use partition::{split_counts, Partition};
