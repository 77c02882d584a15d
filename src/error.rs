//! Error types shared across the crate.
//!
//! Validation problems (placeholders, word ranges) and lookups of unknown
//! names get their own variants so callers can match on them; I/O, JSON and
//! HTTP failures are wrapped from their source crates.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A prompt submitted for creation lacks one of the required
    /// placeholders. Carries the bare placeholder name.
    #[error("Prompt must contain the {{{{{0}}}}} placeholder")]
    MissingPlaceholder(String),

    /// A rendered prompt still contains a placeholder token no value was
    /// supplied for. Carries the full token, braces included.
    #[error("Prompt contains an unresolved placeholder: {0}")]
    UnresolvedPlaceholder(String),

    /// The word count range does not look like "min, max".
    #[error("Word count range must be two numbers such as \"150, 200\", got {0:?}")]
    MalformedWordRange(String),

    /// No prompt with this name exists in the store.
    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),

    /// The page reader produced no content for this link.
    #[error("No content could be read from {0}")]
    PageUnavailable(String),

    /// The model URL does not name a backend or a model.
    #[error("Invalid model URL: {0}")]
    InvalidModelUrl(String),

    /// Building the provider or getting a chat completion failed.
    #[error("LLM error: {0}")]
    Llm(String),

    /// The HTTP request for a page failed or returned a bad status.
    #[error("Failed to fetch page: {0}")]
    Fetch(#[from] reqwest::Error),

    /// Readability could not pull article text out of the HTML.
    #[error("Failed to extract article text: {0}")]
    Extraction(String),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Digest serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
