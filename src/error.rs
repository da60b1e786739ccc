//! Error types for the newswire application.

use newswire_search::SearchError;

/// Top-level error type for the application crate.
#[derive(Debug, thiserror::Error)]
pub enum NewswireError {
    /// Failure reported by the search core.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A search or load-more is already running on this session.
    #[error("a search is already in progress")]
    SessionBusy,

    /// `load_more` was called before any search.
    #[error("no active search to load more results for")]
    NoActiveSearch,
}

impl NewswireError {
    /// Stable code for display and scripting.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Search(e) => e.code(),
            Self::Config(_) => "CONFIG_INVALID",
            Self::Io(_) => "IO_ERROR",
            Self::SessionBusy => "SESSION_BUSY",
            Self::NoActiveSearch => "NO_ACTIVE_SEARCH",
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, NewswireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_errors_keep_their_code() {
        let err: NewswireError = SearchError::RateLimited("slow down".into()).into();
        assert_eq!(err.code(), "RATE_LIMITED");
        assert!(err.to_string().contains("slow down"));
    }

    #[test]
    fn session_errors_have_codes() {
        assert_eq!(NewswireError::SessionBusy.code(), "SESSION_BUSY");
        assert_eq!(NewswireError::NoActiveSearch.code(), "NO_ACTIVE_SEARCH");
    }
}
