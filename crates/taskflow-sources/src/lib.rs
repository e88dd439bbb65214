//! Source-chunk panel behind an answer's "view sources" dialog.
//!
//! The answer text is split into keywords by the backend, the user can edit
//! the keyword set, and every change triggers a debounced lookup of matching
//! document chunks. Network access stays with the host through the
//! [`SplitWordsApi`] and [`SourceChunksApi`] traits.

pub mod chunks;
pub mod debounce;
pub mod keywords;
pub mod panel;
pub mod retry;

use std::fmt;

pub use chunks::{FileChunk, FileDownload, rewrite_storage_url};
pub use debounce::{ChunkFetchDebouncer, ChunkRequest};
pub use keywords::{KeywordSet, Segment, highlight_answer};
pub use panel::SourcePanel;
pub use retry::{RetryPolicy, load_split_words};

/// A failed backend call. `code` is the backend's status code, when it sent one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub code: Option<i64>,
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for FetchError {}

/// Splits an answer into highlightable keywords.
pub trait SplitWordsApi {
    fn split_words(&self, message: &str, message_id: &str) -> Result<Vec<String>, FetchError>;
}

/// Looks up document chunks matching a `;`-joined keyword list.
pub trait SourceChunksApi {
    fn source_chunks(
        &self,
        chat_id: &str,
        message_id: &str,
        keywords: &str,
    ) -> Result<Vec<FileChunk>, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_display_includes_code() {
        assert_eq!(
            FetchError::with_code(14001, "busy").to_string(),
            "busy (code 14001)"
        );
        assert_eq!(FetchError::new("offline").to_string(), "offline");
    }
}
