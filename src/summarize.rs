//! The summarize module orchestrates summarization runs: it resolves the
//! prompt template, derives placeholder values from the requested word count
//! range, and walks the given links one by one with a pause between model
//! requests.

use std::collections::HashMap;
use std::time::Duration;

use log::{error, info};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{MAX_WORD_COUNT_FIELD, MIN_WORD_COUNT_FIELD, PAGE_CONTENT_FIELD, WORD_RANGE};
use crate::error::{Error, Result};
use crate::model::ModelClient;
use crate::prompts::PromptStore;

static WORD_RANGE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(WORD_RANGE).expect("Failed to compile WORD_RANGE regex"));

/// Runs summarization requests against the model for one or more links.
pub struct Summarizer<'a> {
    /// Prompt catalog the template is resolved from.
    prompts: &'a PromptStore,
    /// Client used for the per-link model calls.
    model: &'a ModelClient<'a>,
    /// Pause inserted between consecutive model requests.
    request_delay: Duration,
}

impl<'a> Summarizer<'a> {
    /// Creates a summarizer over the given prompt store and model client.
    pub fn new(
        prompts: &'a PromptStore,
        model: &'a ModelClient<'a>,
        request_delay: Duration,
    ) -> Self {
        info!(
            "Seconds between model requests: {}",
            request_delay.as_secs_f64()
        );

        Self {
            prompts,
            model,
            request_delay,
        }
    }

    /// Summarizes a single link.
    ///
    /// # Arguments
    ///
    /// * `url` - The link to summarize
    /// * `temperature` - Sampling temperature for the model request
    /// * `prompt_name` - Name of the prompt template to use
    /// * `word_range` - Word count range for the reply, e.g. `"150, 200"`
    ///
    /// # Returns
    ///
    /// The summary text paired with a debug trace of the provider response.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt is unknown, the word range is
    /// malformed, the page cannot be read, or the model call fails.
    pub async fn summarize_link(
        &self,
        url: &str,
        temperature: f32,
        prompt_name: &str,
        word_range: &str,
    ) -> Result<(String, String)> {
        let template = self.prompts.get(prompt_name)?;
        let values = word_range_placeholders(word_range)?;

        self.model
            .get_response(url, temperature, template, &values)
            .await
    }

    /// Summarizes several links sequentially with a pause between requests.
    ///
    /// A link that fails does not stop the run: its summary slot carries an
    /// `ERROR[<link>]: <reason>` marker instead and the remaining links are
    /// still processed. Debug traces are collected for successful links
    /// only. No pause follows a failed request or the final link.
    ///
    /// # Arguments
    ///
    /// * `links` - The links to summarize, in order
    /// * `temperature` - Sampling temperature for the model requests
    /// * `prompt_name` - Name of the prompt template to use
    /// * `word_range` - Word count range for each reply
    ///
    /// # Returns
    ///
    /// The per-link summaries joined with blank lines, paired with the
    /// joined debug traces.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt is unknown or the word range is
    /// malformed. Per-link failures are reported inline, not returned.
    pub async fn summarize_links(
        &self,
        links: &[String],
        temperature: f32,
        prompt_name: &str,
        word_range: &str,
    ) -> Result<(String, String)> {
        let template = self.prompts.get(prompt_name)?;
        let values = word_range_placeholders(word_range)?;

        let mut responses = Vec::new();
        let mut debug_traces = Vec::new();
        for (index, link) in links.iter().enumerate() {
            match self
                .model
                .get_response(link, temperature, template, &values)
                .await
            {
                Ok((text, debug_trace)) => {
                    info!("Model response for {link}:\n{text}");
                    responses.push(text);
                    debug_traces.push(debug_trace);

                    if index + 1 < links.len() {
                        info!(
                            "Sleeping {} seconds before the next request",
                            self.request_delay.as_secs_f64()
                        );
                        tokio::time::sleep(self.request_delay).await;
                    }
                }
                Err(err) => {
                    error!("Failed to summarize {link}: {err}");
                    responses.push(format!("ERROR[{link}]: {err}"));
                }
            }
        }

        Ok((responses.join("\n\n"), debug_traces.join("\n\n")))
    }
}

/// Derives the placeholder values for a summarization request from a word
/// count range written as `"min, max"`.
///
/// The page content placeholder starts out empty; the model client fills it
/// in per link.
///
/// # Errors
///
/// Returns [`Error::MalformedWordRange`] if `word_range` is not two
/// comma-separated numbers.
pub fn word_range_placeholders(word_range: &str) -> Result<HashMap<String, String>> {
    let captures = WORD_RANGE_REGEX
        .captures(word_range)
        .ok_or_else(|| Error::MalformedWordRange(word_range.to_string()))?;
    let (_, [minimum, maximum]) = captures.extract();

    Ok(HashMap::from([
        (MIN_WORD_COUNT_FIELD.to_string(), minimum.to_string()),
        (MAX_WORD_COUNT_FIELD.to_string(), maximum.to_string()),
        (PAGE_CONTENT_FIELD.to_string(), String::new()),
    ]))
}
