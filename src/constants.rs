pub const MODEL_API_KEY_ENV_NAME: &str = "PAGEDIGEST_MODEL_API_KEY";
pub const MODEL_ENV_NAME: &str = "PAGEDIGEST_MODEL";
pub const ASSETS_DIR_ENV_NAME: &str = "PAGEDIGEST_ASSETS_DIR";
pub const REQUEST_DELAY_ENV_NAME: &str = "PAGEDIGEST_SECONDS_BETWEEN_REQUESTS";

pub const MIN_WORD_COUNT_FIELD: &str = "min_llm_resp_word_count";
pub const MAX_WORD_COUNT_FIELD: &str = "max_llm_resp_word_count";
pub const PAGE_CONTENT_FIELD: &str = "web_page_content";
pub const REQUIRED_PLACEHOLDERS: [&str; 3] =
    [MIN_WORD_COUNT_FIELD, MAX_WORD_COUNT_FIELD, PAGE_CONTENT_FIELD];

pub const PROMPTS_FOLDER: &str = "prompts";
pub const PROMPT_FILE_EXT: &str = "txt";
pub const RESEARCH_FOLDER: &str = "research";
pub const RESEARCH_FILE_EXT: &str = "md";
pub const RESEARCH_DIGEST_FILE_NAME: &str = "research_digest.json";

pub const DEFAULT_ASSETS_DIR: &str = "assets";
pub const DEFAULT_PROMPT_NAME: &str = "summarize";
pub const DEFAULT_WORD_RANGE: &str = "150, 200";
pub const DEFAULT_RESP_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_SECONDS_BETWEEN_REQUESTS: f64 = 10.0;

pub(crate) const RESEARCH_ID_SUFFIX_LENGTH: usize = 4;
pub(crate) const DIGEST_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

pub(crate) const UNRESOLVED_PLACEHOLDER: &str = r"\{\{[a-zA-Z0-9\s_-]+\}\}";
pub(crate) const WORD_RANGE: &str = r"^\s*(\d+)\s*,\s*(\d+)\s*$";
pub(crate) const FILE_NAME_UNSAFE: &str = r"[^a-zA-Z0-9_.-]";
pub(crate) const REPEATED_UNDERSCORES: &str = r"_+";

pub const DEFAULT_PROMPT_TEMPLATE: &str = r"
You are a research assistant. You will receive the content of a web page.
Write a summary of it between {{min_llm_resp_word_count}} and
{{max_llm_resp_word_count}} words. Answer with the summary alone, without
preamble. Keep the original language of the page.
Web page content:
{{web_page_content}}";
