//! Source module - classifying where a document comes from
//!
//! Classification runs in a fixed priority order:
//! 1. a list of strings is a list of external handles
//! 2. a string with the remote service's file prefix is an external handle
//! 3. an absolute `http`/`https` address is a web URL
//! 4. anything else is a local path, validated before it is accepted

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

use crate::request::SourceInput;

/// Address prefix of files that already live in the remote service's namespace
pub const EXTERNAL_HANDLE_PREFIX: &str = "https://generativelanguage.googleapis.com/";

/// A classified document source
///
/// Every consumer matches all four cases; there is no fallback variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisSource {
    /// Validated absolute path to a local PDF file
    LocalPath(PathBuf),

    /// Absolute `http`/`https` address to fetch the document from
    WebUrl(Url),

    /// Handle to a file previously uploaded to the remote service
    ExternalHandle(String),

    /// Ordered handles produced by a previous partitioned run
    ExternalHandleList(Vec<String>),
}

impl AnalysisSource {
    /// Short label for logging
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisSource::LocalPath(_) => "local path",
            AnalysisSource::WebUrl(_) => "web url",
            AnalysisSource::ExternalHandle(_) => "external handle",
            AnalysisSource::ExternalHandleList(_) => "external handle list",
        }
    }
}

impl fmt::Display for AnalysisSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisSource::LocalPath(path) => write!(f, "{}", path.display()),
            AnalysisSource::WebUrl(url) => write!(f, "{}", url),
            AnalysisSource::ExternalHandle(handle) => write!(f, "{}", handle),
            AnalysisSource::ExternalHandleList(handles) => {
                write!(f, "[{} cached handles]", handles.len())
            }
        }
    }
}

/// Local path validation failures
///
/// Each variant carries the trimmed path so the caller can tell which
/// file failed which check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Path is relative (or empty after trimming)
    #[error("PDF path must be absolute: {}", .0.display())]
    NotAbsolute(PathBuf),

    /// Nothing exists at the path
    #[error("PDF file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Path points at a directory
    #[error("Path is a directory, not a file: {}", .0.display())]
    IsDirectory(PathBuf),

    /// File does not carry a `.pdf` extension
    #[error("File is not a PDF: {}", .0.display())]
    WrongExtension(PathBuf),
}

/// Check whether a string addresses a file in the remote service's namespace
///
/// # Examples
///
/// ```
/// use pdflens_domain::is_external_handle;
///
/// assert!(is_external_handle("https://generativelanguage.googleapis.com/v1beta/files/abc123"));
/// assert!(!is_external_handle("https://example.com/doc.pdf"));
/// ```
pub fn is_external_handle(source: &str) -> bool {
    source.starts_with(EXTERNAL_HANDLE_PREFIX)
}

/// Check whether a string is an absolute `http`/`https` address
///
/// External handles are excluded even though they are https addresses.
pub fn is_web_url(source: &str) -> bool {
    if is_external_handle(source) {
        return false;
    }
    parse_web_url(source).is_some()
}

fn parse_web_url(source: &str) -> Option<Url> {
    Url::parse(source)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

/// Validate a local PDF path and return it trimmed
///
/// Checks run in order: absolute, exists, not a directory, `.pdf` extension
/// (case-insensitive).
pub fn validate_local_path(raw: &str) -> Result<PathBuf, SourceError> {
    let trimmed = raw.trim();
    let path = PathBuf::from(trimmed);

    if trimmed.is_empty() || !path.is_absolute() {
        return Err(SourceError::NotAbsolute(path));
    }

    if !path.exists() {
        return Err(SourceError::NotFound(path));
    }

    if path.is_dir() {
        return Err(SourceError::IsDirectory(path));
    }

    if !has_pdf_extension(&path) {
        return Err(SourceError::WrongExtension(path));
    }

    Ok(path)
}

fn has_pdf_extension(path: &Path) -> bool {
    path.to_string_lossy().to_lowercase().ends_with(".pdf")
}

/// Classify a raw source into one of the four source kinds
///
/// Only the local-path case touches the filesystem.
pub fn classify(input: &SourceInput) -> Result<AnalysisSource, SourceError> {
    let raw = match input {
        SourceInput::Many(handles) => return Ok(AnalysisSource::ExternalHandleList(handles.clone())),
        SourceInput::Single(raw) => raw,
    };

    if is_external_handle(raw) {
        return Ok(AnalysisSource::ExternalHandle(raw.clone()));
    }

    if let Some(url) = parse_web_url(raw) {
        return Ok(AnalysisSource::WebUrl(url));
    }

    validate_local_path(raw).map(AnalysisSource::LocalPath)
}
