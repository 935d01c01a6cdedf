//! pdflens Analyzer
//!
//! Answers a fixed list of questions about a PDF, including documents that
//! exceed the remote service's single-request limits.
//!
//! # Overview
//!
//! The whole document is tried first. When the service rejects it as too
//! large, the document is partitioned by page range and the partitions are
//! analyzed one at a time. Each partition's prompt carries the findings of
//! the one before it, so the answers from the last partition reflect the
//! entire document.
//!
//! # Architecture
//!
//! ```text
//! Request → classify → whole document ──ok──────────────────────────┐
//!                            │ size limit                             │
//!                            ▼                                        ▼
//!                  WorkQueue<Partition> → upload → infer → findings → reconcile
//!                      ▲                            │ size limit
//!                      └──── split, push front ─────┘
//! ```
//!
//! # Key Features
//!
//! - **Adaptive splitting**: partitions over the upload ceiling are split
//!   before upload; partitions the model rejects are split and retried
//! - **Rolling findings**: each partition sees a summary of what earlier
//!   partitions found
//! - **Handle reuse**: the response lists every uploaded handle; passing them
//!   back replays the analysis without re-uploading
//! - **Complete answers**: exactly one answer per query, in query order
//!
//! # Example Usage
//!
//! ```no_run
//! use pdflens_analyzer::{AnalyzerConfig, GeminiAnalyzer};
//! use pdflens_domain::AnalysisRequest;
//!
//! # async fn example() -> Result<(), pdflens_analyzer::AnalyzeError> {
//! let analyzer = GeminiAnalyzer::from_env(AnalyzerConfig::default())?;
//!
//! let request = AnalysisRequest::new(
//!     "/home/me/reports/annual.pdf",
//!     vec!["What was total revenue?".to_string()],
//! );
//!
//! let response = analyzer.analyze(request).await?;
//! for answer in &response.responses {
//!     println!("{}: {}", answer.query, answer.answer);
//! }
//! println!("Reuse with: {:?}", response.cached_handles);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod analyzer;
mod config;
mod error;
mod parser;
mod prompt;
mod queue;


pub use analyzer::{Analyzer, GeminiAnalyzer};
pub use config::{AnalyzerConfig, DEFAULT_MAX_UPLOAD_BYTES};
pub use error::{AnalyzeError, ErrorReport};
pub use parser::{parse_model_reply, ModelReply};
pub use prompt::{build_user_prompt, ChunkPromptBuilder, PageSpan, SYSTEM_INSTRUCTION};
pub use queue::WorkQueue;
