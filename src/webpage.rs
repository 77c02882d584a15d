use crate::error::{Error, Result};

use async_trait::async_trait;
use dom_smoothie::{Article, CandidateSelectMode, Config, Readability, TextMode};
use log::{error, info};

/// A fetched web page reduced to its readable text.
#[derive(Debug, Clone)]
pub struct Webpage {
    /// The link the content was read from.
    pub url: String,
    /// The extracted article text.
    pub content: String,
}

/// Source of page content for the model client.
///
/// Implementations return `None` when a page cannot be read. Failure details
/// are logged, not surfaced, so one bad link never aborts the caller.
#[async_trait]
pub trait PageReader: Send + Sync {
    /// Reads the readable text content of the page at `url`.
    async fn read(&self, url: &str) -> Option<Webpage>;
}

/// Reads pages over HTTP and extracts their article text with a
/// readability pass.
#[derive(Debug)]
pub struct WebpageReader;

#[async_trait]
impl PageReader for WebpageReader {
    async fn read(&self, url: &str) -> Option<Webpage> {
        info!("Reading content for page: {url}");

        match fetch_and_extract(url).await {
            Ok(content) => Some(Webpage {
                url: url.to_string(),
                content,
            }),
            Err(err) => {
                error!("Failed to read page {url}: {err}");
                None
            }
        }
    }
}

async fn fetch_and_extract(url: &str) -> Result<String> {
    let client = reqwest::Client::new();
    let html = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    extract_text(&html, url)
}

/// Extracts the readable article text from the given HTML content.
///
/// Boilerplate such as navigation, ads and comment sections is dropped by
/// the readability pass; the result is the formatted text of the main
/// article body.
///
/// # Arguments
///
/// * `html` - A string slice that holds the HTML content of the webpage.
/// * `url` - The URL the HTML was fetched from, used to resolve relative links.
///
/// # Returns
///
/// A `Result` containing the extracted text if successful.
///
/// # Errors
///
/// This function will return an error if:
///
/// - The HTML content is invalid or cannot be parsed.
/// - No readable article can be identified in the HTML content.
pub fn extract_text(html: &str, url: &str) -> Result<String> {
    let config = Config {
        text_mode: TextMode::Formatted,
        candidate_select_mode: CandidateSelectMode::DomSmoothie,
        ..Default::default()
    };

    let mut readability = Readability::new(html, Some(url), Some(config))
        .map_err(|err| Error::Extraction(err.to_string()))?;
    let article: Article = readability
        .parse()
        .map_err(|err| Error::Extraction(err.to_string()))?;

    Ok(article.text_content.to_string())
}
