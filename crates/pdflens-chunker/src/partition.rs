//! Partition model and the halving split

use std::fmt;
use std::ops::Range;

use lopdf::Document;
use tracing::debug;

use crate::error::{ChunkError, Result};

/// A contiguous page range of a document plus the payload for just that range
///
/// Invariants:
/// - `page_count >= 1`
/// - `start_page + page_count <= total_pages`
/// - `bytes` parses on its own and holds exactly `page_count` pages
///
/// Partitions are immutable; splitting produces new ones.
#[derive(Clone, PartialEq, Eq)]
pub struct Partition {
    bytes: Vec<u8>,
    start_page: u32,
    page_count: u32,
    total_pages: u32,
}

impl Partition {
    /// Wrap a full PDF payload as a partition covering every page
    pub fn wrap(bytes: Vec<u8>) -> Result<Self> {
        let doc = load(&bytes)?;
        let page_count = doc.get_pages().len() as u32;
        if page_count == 0 {
            return Err(ChunkError::EmptyDocument);
        }

        Ok(Self {
            bytes,
            start_page: 0,
            page_count,
            total_pages: page_count,
        })
    }

    /// Split into two contiguous halves
    ///
    /// The first half receives `ceil(page_count / 2)` pages. Both halves keep
    /// `total_pages` and carry independently parseable payloads.
    pub fn split_in_half(&self) -> Result<(Partition, Partition)> {
        let (first_count, second_count) = split_counts(self.page_count).ok_or(
            ChunkError::Unsplittable {
                page: self.start_page + 1,
            },
        )?;

        let doc = load(&self.bytes)?;
        let actual = doc.get_pages().len() as u32;
        if actual != self.page_count {
            return Err(ChunkError::PageCountMismatch {
                expected: self.page_count,
                actual,
            });
        }

        let first_bytes = extract_pages(&doc, 0..first_count as usize)?;
        let second_bytes = extract_pages(&doc, first_count as usize..self.page_count as usize)?;

        debug!(
            "Split pages {}-{} into {} + {} pages ({} -> {} + {} bytes)",
            self.start_page + 1,
            self.end_page(),
            first_count,
            second_count,
            self.bytes.len(),
            first_bytes.len(),
            second_bytes.len()
        );

        let first = Partition {
            bytes: first_bytes,
            start_page: self.start_page,
            page_count: first_count,
            total_pages: self.total_pages,
        };
        let second = Partition {
            bytes: second_bytes,
            start_page: self.start_page + first_count,
            page_count: second_count,
            total_pages: self.total_pages,
        };

        Ok((first, second))
    }

    /// Payload covering exactly this partition's pages
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload size in bytes
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Zero-based index of the first page in the original document
    pub fn start_page(&self) -> u32 {
        self.start_page
    }

    /// Number of pages in this partition
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Page count of the original document
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// One-based number of the last page covered
    pub fn end_page(&self) -> u32 {
        self.start_page + self.page_count
    }
}

impl fmt::Debug for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partition")
            .field("start_page", &self.start_page)
            .field("page_count", &self.page_count)
            .field("total_pages", &self.total_pages)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Page counts of the two halves, or `None` when there is nothing to split
///
/// # Examples
///
/// ```
/// use pdflens_chunker::split_counts;
///
/// assert_eq!(split_counts(10), Some((5, 5)));
/// assert_eq!(split_counts(7), Some((4, 3)));
/// assert_eq!(split_counts(1), None);
/// ```
pub fn split_counts(page_count: u32) -> Option<(u32, u32)> {
    if page_count <= 1 {
        return None;
    }
    let first = page_count.div_ceil(2);
    Some((first, page_count - first))
}

fn load(bytes: &[u8]) -> Result<Document> {
    Document::load_mem(bytes).map_err(|e| ChunkError::Parse(e.to_string()))
}

/// Serialize a copy of `doc` that keeps only the pages at positions `keep`
fn extract_pages(doc: &Document, keep: Range<usize>) -> Result<Vec<u8>> {
    let mut fragment = doc.clone();

    let doomed: Vec<u32> = fragment
        .get_pages()
        .keys()
        .enumerate()
        .filter(|(idx, _)| !keep.contains(idx))
        .map(|(_, number)| *number)
        .collect();

    fragment.delete_pages(&doomed);
    fragment.prune_objects();

    let mut out = Vec::new();
    fragment
        .save_to(&mut out)
        .map_err(|e| ChunkError::Write(e.to_string()))?;
    Ok(out)
}
