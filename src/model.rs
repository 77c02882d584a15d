//! The model module talks to the configured LLM backend. It renders the
//! system prompt from a template and placeholder values, hands the model a
//! link together with the page content behind it, and returns the reply
//! alongside a debug trace of the full provider response.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::{ChatMessage, ChatResponse};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::constants::{PAGE_CONTENT_FIELD, UNRESOLVED_PLACEHOLDER};
use crate::error::{Error, Result};
use crate::webpage::PageReader;

static UNRESOLVED_PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(UNRESOLVED_PLACEHOLDER).expect("Failed to compile UNRESOLVED_PLACEHOLDER regex")
});

/// A single chat exchange handed to the backend.
#[derive(Debug, Clone)]
pub struct ChatRequest<'a> {
    /// Instruction text sent as the system prompt.
    pub system_prompt: &'a str,
    /// The user message content.
    pub user_prompt: &'a str,
    /// Sampling temperature for this request.
    pub temperature: f32,
}

/// A chat completion backend.
///
/// The production implementation drives the configured LLM provider; tests
/// substitute a scripted one.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Sends one chat request and returns the provider response.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be built or rejects the
    /// request.
    async fn complete(&self, request: ChatRequest<'_>) -> Result<Box<dyn ChatResponse>>;
}

/// Chat backend configured from a model URL of the form
/// `<backend>://<model-name>`, e.g. `openai://gpt-4o-mini` or
/// `ollama://llama3`.
#[derive(Debug)]
pub struct LlmChat {
    backend: LLMBackend,
    model: String,
    api_key: Option<String>,
    resp_max_tokens: u32,
}

impl LlmChat {
    /// Parses a model URL into a chat backend.
    ///
    /// The URL scheme picks the provider and the host (plus the username
    /// part, for model names containing `:`) picks the model: a name such
    /// as `gemma3:12b` is written `ollama://12b@gemma3`.
    ///
    /// # Arguments
    ///
    /// * `model_url` - The model URL, e.g. `openai://gpt-4o-mini`
    /// * `api_key` - Optional API key passed through to the provider
    /// * `resp_max_tokens` - Response token limit for every request
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidModelUrl`] if the URL does not parse, names
    /// an unknown backend, or lacks a model name.
    pub fn from_model_url(
        model_url: &str,
        api_key: Option<String>,
        resp_max_tokens: u32,
    ) -> Result<Self> {
        let parsed =
            Url::parse(model_url).map_err(|err| Error::InvalidModelUrl(err.to_string()))?;
        let backend = LLMBackend::from_str(parsed.scheme())
            .map_err(|err| Error::InvalidModelUrl(err.to_string()))?;

        let model = [parsed.host_str().unwrap_or_default(), parsed.username()]
            .iter()
            .filter(|part| !part.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(":");
        if model.is_empty() {
            return Err(Error::InvalidModelUrl(
                "Specify model name as host URL".to_string(),
            ));
        }

        Ok(Self {
            backend,
            model,
            api_key,
            resp_max_tokens,
        })
    }
}

#[async_trait]
impl ChatBackend for LlmChat {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<Box<dyn ChatResponse>> {
        let builder = LLMBuilder::new()
            .backend(self.backend.clone())
            .model(self.model.clone())
            .max_tokens(self.resp_max_tokens)
            .temperature(request.temperature)
            .stream(false)
            .system(request.system_prompt);

        let builder = match &self.api_key {
            Some(key) => builder.api_key(key.clone()),
            None => builder,
        };

        let provider = builder.build().map_err(|err| Error::Llm(err.to_string()))?;
        let messages = [ChatMessage::user().content(request.user_prompt).build()];

        provider
            .chat(&messages)
            .await
            .map_err(|err| Error::Llm(err.to_string()))
    }
}

/// Client that pairs a chat backend with a page reader to get a model's
/// take on a web page.
pub struct ModelClient<'a> {
    chat: &'a dyn ChatBackend,
    pages: &'a dyn PageReader,
}

impl<'a> ModelClient<'a> {
    /// Creates a model client over the given chat backend and page reader.
    pub fn new(chat: &'a dyn ChatBackend, pages: &'a dyn PageReader) -> Self {
        Self { chat, pages }
    }

    /// Reads the page behind `url`, renders the system prompt template with
    /// the given placeholder values plus the page content, and asks the
    /// model about the link.
    ///
    /// The caller's placeholder map is left untouched; the page content is
    /// added to a copy.
    ///
    /// # Arguments
    ///
    /// * `url` - The link to read and ask about
    /// * `temperature` - Sampling temperature for the request
    /// * `system_prompt_template` - Template for the system prompt
    /// * `placeholder_values` - Placeholder names mapped to their values
    ///
    /// # Returns
    ///
    /// The model's reply text paired with a debug dump of the full provider
    /// response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PageUnavailable`] if no content can be read from the
    /// link, [`Error::UnresolvedPlaceholder`] if the rendered prompt still
    /// contains a placeholder token, or [`Error::Llm`] if the chat request
    /// fails.
    pub async fn get_response(
        &self,
        url: &str,
        temperature: f32,
        system_prompt_template: &str,
        placeholder_values: &HashMap<String, String>,
    ) -> Result<(String, String)> {
        info!("Getting model response for link: {url}");

        let webpage = self
            .pages
            .read(url)
            .await
            .ok_or_else(|| Error::PageUnavailable(url.to_string()))?;

        let mut values = placeholder_values.clone();
        values.insert(PAGE_CONTENT_FIELD.to_string(), webpage.content);

        let system_prompt = apply_placeholders(system_prompt_template, &values)?;
        let user_prompt = format!("Link: {url}");

        let response = self
            .chat
            .complete(ChatRequest {
                system_prompt: &system_prompt,
                user_prompt: &user_prompt,
                temperature,
            })
            .await?;
        let debug_trace = format!("{response:#?}");

        Ok((response.text().unwrap_or_default(), debug_trace))
    }
}

/// Substitutes `{{name}}` placeholder tokens in `template` with the values
/// from the map, then verifies nothing was left unresolved.
///
/// # Arguments
///
/// * `template` - The prompt template text
/// * `values` - Placeholder names mapped to their replacement values
///
/// # Errors
///
/// Returns [`Error::UnresolvedPlaceholder`] if the rendered text still
/// contains a `{{...}}` token.
pub fn apply_placeholders(template: &str, values: &HashMap<String, String>) -> Result<String> {
    let mut rendered = template.to_string();
    for (name, value) in values {
        rendered = rendered.replace(&format!("{{{{{name}}}}}"), value);
    }

    if let Some(token) = UNRESOLVED_PLACEHOLDER_REGEX.find(&rendered) {
        return Err(Error::UnresolvedPlaceholder(token.as_str().to_string()));
    }

    Ok(rendered)
}
