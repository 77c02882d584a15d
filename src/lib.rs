//! The pagedigest library reads web pages, summarizes them with an LLM and
//! files the results as research documents with a metadata digest.

pub mod constants;
pub mod error;
pub mod model;
pub mod prompts;
pub mod research;
pub mod summarize;
pub mod webpage;

pub use error::{Error, Result};
pub use model::{ChatBackend, ChatRequest, LlmChat, ModelClient, apply_placeholders};
pub use prompts::PromptStore;
pub use research::{ResearchRecord, ResearchStore, sanitize_file_name};
pub use summarize::{Summarizer, word_range_placeholders};
pub use webpage::{PageReader, Webpage, WebpageReader, extract_text};
