use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use llm::chat::ChatResponse;

use pagedigest::{ChatBackend, ChatRequest, PageReader, Result, Webpage};

pub(crate) const TEST_PROMPT_TEMPLATE: &str = "Reply with {{min_llm_resp_word_count}} to \
     {{max_llm_resp_word_count}} words about:\n{{web_page_content}}";

#[macro_export]
macro_rules! assert_word_ranges {
    (
        $(
            $test_name:ident : range => $range:expr, minimum => $minimum:expr, maximum => $maximum:expr
        ),+ $(,)?
    ) => {
        $(
            #[test]
            fn $test_name() {
                let values = pagedigest::summarize::word_range_placeholders($range)
                    .expect("Expected a parsable word range.");

                let minimum = values
                    .get(pagedigest::constants::MIN_WORD_COUNT_FIELD)
                    .expect("Expected the minimum word count placeholder.");
                let maximum = values
                    .get(pagedigest::constants::MAX_WORD_COUNT_FIELD)
                    .expect("Expected the maximum word count placeholder.");
                assert_that(minimum).is_equal_to($minimum.to_string());
                assert_that(maximum).is_equal_to($maximum.to_string());
            }
        )+
    }
}

#[macro_export]
macro_rules! assert_word_ranges_rejected {
    (
        $(
            $test_name:ident : range => $range:expr
        ),+ $(,)?
    ) => {
        $(
            #[test]
            fn $test_name() {
                let error = pagedigest::summarize::word_range_placeholders($range)
                    .expect_err("Expected a malformed word range error.");

                assert_that(&matches!(error, pagedigest::Error::MalformedWordRange(_)))
                    .is_equal_to(true);
            }
        )+
    }
}

#[derive(Debug)]
pub(crate) struct StringResponse(String);

impl ChatResponse for StringResponse {
    fn text(&self) -> Option<String> {
        Some(self.0.clone())
    }

    fn tool_calls(&self) -> Option<Vec<llm::ToolCall>> {
        None
    }

    fn thinking(&self) -> Option<String> {
        None
    }

    fn usage(&self) -> Option<llm::chat::Usage> {
        None
    }
}

impl std::fmt::Display for StringResponse {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Chat backend that replays scripted outcomes and records every request
/// it sees.
pub(crate) struct StubChatBackend {
    outcomes: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<(String, String, f32, Instant)>>,
}

impl StubChatBackend {
    pub fn new(outcomes: Vec<Result<String>>) -> Self {
        StubChatBackend {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(content: &str) -> Self {
        Self::new(vec![Ok(content.to_string())])
    }

    /// Requests seen so far as (system prompt, user prompt, temperature,
    /// arrival time).
    pub fn requests(&self) -> Vec<(String, String, f32, Instant)> {
        self.requests
            .lock()
            .expect("Expected the requests mutex to be healthy.")
            .clone()
    }
}

#[async_trait]
impl ChatBackend for StubChatBackend {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<Box<dyn ChatResponse>> {
        self.requests
            .lock()
            .expect("Expected the requests mutex to be healthy.")
            .push((
                request.system_prompt.to_string(),
                request.user_prompt.to_string(),
                request.temperature,
                Instant::now(),
            ));

        let outcome = self
            .outcomes
            .lock()
            .expect("Expected the outcomes mutex to be healthy.")
            .pop_front()
            .expect("Expected another scripted outcome.");

        outcome.map(|content| Box::new(StringResponse(content)) as Box<dyn ChatResponse>)
    }
}

/// Page reader with canned content. Links containing "unreachable" read as
/// missing.
pub(crate) struct StubPageReader;

#[async_trait]
impl PageReader for StubPageReader {
    async fn read(&self, url: &str) -> Option<Webpage> {
        if url.contains("unreachable") {
            return None;
        }

        Some(Webpage {
            url: url.to_string(),
            content: format!("stub content for {url}"),
        })
    }
}
