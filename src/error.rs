use thiserror::Error;

/// Rejected before any I/O happens; state is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// A search that never produced a usable result page. Callers surface the
/// message and keep whatever results were already on screen.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search failed with status {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("malformed search response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Durable storage trouble. Load-side corruption degrades to "no saved
/// searches"; write-side failures propagate to the user.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("saved-search storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("saved-search list is corrupted: {0}")]
    Corrupted(#[from] serde_json::Error),
}
