//! pagedigest is a CLI research assistant: it reads web pages, asks an LLM
//! for a summary within a requested word count range, and can file the
//! result as a research document.
//!
//! The tool has three main commands:
//! 1. `analyze` - Summarize one or more links using a stored prompt
//! 2. `prompt` - Manage the stored prompt templates
//! 3. `research` - Browse and maintain filed research documents

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Builder;
use log::{LevelFilter, debug, info, warn};

use pagedigest::constants::{
    ASSETS_DIR_ENV_NAME, DEFAULT_ASSETS_DIR, DEFAULT_PROMPT_NAME, DEFAULT_PROMPT_TEMPLATE,
    DEFAULT_RESP_MAX_TOKENS, DEFAULT_SECONDS_BETWEEN_REQUESTS, DEFAULT_WORD_RANGE,
    MODEL_API_KEY_ENV_NAME, MODEL_ENV_NAME, REQUEST_DELAY_ENV_NAME,
};
use pagedigest::{LlmChat, ModelClient, PromptStore, ResearchStore, Summarizer, WebpageReader};

/// A CLI research assistant that summarizes web pages with an LLM
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The command to execute
    #[command(subcommand)]
    command: Command,

    #[arg(long, short, action = clap::ArgAction::Count, help = "Output v(v...)erbosity: error (0), warn (1), info (2), debug (3), trace (4)", global = true, default_value_t = 2)]
    verbose: u8,

    /// Assets folder holding the prompts and research subfolders
    #[arg(long, short, global = true)]
    assets: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize one or more links and optionally file the result
    Analyze(AnalyzeArgs),
    /// Manage the stored prompt templates
    #[command(subcommand)]
    Prompt(PromptCommand),
    /// Browse and maintain filed research documents
    #[command(subcommand)]
    Research(ResearchCommand),
}

#[derive(Args)]
struct AnalyzeArgs {
    /// The links to summarize
    #[arg(required = true)]
    links: Vec<String>,
    /// URL of the LLM model to use, e.g. openai://gpt-4o-mini
    #[arg(long, short)]
    model: Option<String>,
    /// Name of the prompt template to use
    #[arg(long, short, default_value = DEFAULT_PROMPT_NAME)]
    prompt: String,
    /// Sampling temperature for the model requests
    #[arg(long, short, default_value_t = 0.0)]
    temperature: f32,
    /// Word count range for each summary
    #[arg(long, short, default_value = DEFAULT_WORD_RANGE)]
    word_range: String,
    /// Seconds to wait between model requests
    #[arg(long, short)]
    delay: Option<f64>,
    /// File the summary as a research document under this name
    #[arg(long, short)]
    save: Option<String>,
}

#[derive(Subcommand)]
enum PromptCommand {
    /// List the names of stored prompts
    List,
    /// Print the text of a prompt
    Show {
        /// The prompt name
        name: String,
    },
    /// Add a prompt from a file, validating its placeholders
    Add {
        /// The name to store the prompt under
        name: String,
        /// Path to the file with the prompt template
        #[arg(long, short)]
        file: String,
    },
    /// Overwrite a prompt from a file, skipping validation
    Update {
        /// The name of the prompt to update
        name: String,
        /// Path to the file with the prompt template
        #[arg(long, short)]
        file: String,
    },
}

#[derive(Subcommand)]
enum ResearchCommand {
    /// List the ids of filed research documents
    List {
        /// Include archived documents
        #[arg(long)]
        archived: bool,
    },
    /// Print the digest record and text of a research document
    Show {
        /// The research id
        id: String,
        /// Look the id up among archived documents too
        #[arg(long)]
        archived: bool,
    },
    /// Archive a research document, keeping its file
    Archive {
        /// The research id
        id: String,
    },
    /// Permanently delete a research document and its file
    Delete {
        /// The research id
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .init();

    let assets_dir = resolve_assets_dir(cli.assets);

    match cli.command {
        Command::Analyze(args) => handle_analyze(&assets_dir, args).await,
        Command::Prompt(command) => handle_prompt_command(&assets_dir, command),
        Command::Research(command) => handle_research_command(&assets_dir, command),
    }
}

fn resolve_assets_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var(ASSETS_DIR_ENV_NAME).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR))
}

async fn handle_analyze(assets_dir: &Path, args: AnalyzeArgs) -> Result<()> {
    let mut prompt_store = PromptStore::open(assets_dir)?;
    if prompt_store.is_empty() {
        info!("Prompt store is empty, seeding the default prompt");
        prompt_store.add(DEFAULT_PROMPT_NAME, DEFAULT_PROMPT_TEMPLATE.trim())?;
    }

    let model_url = args
        .model
        .or_else(|| std::env::var(MODEL_ENV_NAME).ok())
        .context(format!(
            "Specify a model with --model or the {MODEL_ENV_NAME} variable"
        ))?;

    let api_key = match std::env::var(MODEL_API_KEY_ENV_NAME) {
        Ok(key) => {
            info!("API KEY is provided");
            Some(key)
        }
        Err(err) => {
            info!("{err} while providing api key");
            None
        }
    };

    let chat = LlmChat::from_model_url(&model_url, api_key, DEFAULT_RESP_MAX_TOKENS)?;

    let delay_seconds = match args.delay {
        Some(seconds) => seconds,
        None => match std::env::var(REQUEST_DELAY_ENV_NAME) {
            Ok(value) => value
                .parse::<f64>()
                .context(format!("Invalid {REQUEST_DELAY_ENV_NAME} value: {value}"))?,
            Err(_) => DEFAULT_SECONDS_BETWEEN_REQUESTS,
        },
    };
    let request_delay = Duration::try_from_secs_f64(delay_seconds)
        .context(format!("Invalid delay: {delay_seconds}"))?;

    let pages = WebpageReader;
    let model = ModelClient::new(&chat, &pages);
    let summarizer = Summarizer::new(&prompt_store, &model, request_delay);

    let (text, debug_trace) = match args.links.as_slice() {
        [link] => {
            summarizer
                .summarize_link(link, args.temperature, &args.prompt, &args.word_range)
                .await?
        }
        links => {
            summarizer
                .summarize_links(links, args.temperature, &args.prompt, &args.word_range)
                .await?
        }
    };

    println!("{text}");
    debug!("Provider responses:\n{debug_trace}");

    if let Some(name) = args.save {
        let name = name.trim();
        if name.is_empty() {
            anyhow::bail!("Research name cannot be empty");
        }

        let mut research = ResearchStore::open(assets_dir)?;
        let id = research.persist(&text, name, &args.links, true)?;
        info!("Research saved with id: {id}");
    }

    Ok(())
}

fn handle_prompt_command(assets_dir: &Path, command: PromptCommand) -> Result<()> {
    let mut prompt_store = PromptStore::open(assets_dir)?;

    match command {
        PromptCommand::List => {
            for name in prompt_store.list_names() {
                println!("{name}");
            }
        }
        PromptCommand::Show { name } => {
            println!("{}", prompt_store.get(&name)?);
        }
        PromptCommand::Add { name, file } => {
            let text =
                fs::read_to_string(&file).context(format!("Failed to read prompt file: {file}"))?;
            prompt_store.add(&name, &text)?;
        }
        PromptCommand::Update { name, file } => {
            let text =
                fs::read_to_string(&file).context(format!("Failed to read prompt file: {file}"))?;
            prompt_store.update(&name, &text)?;
        }
    }

    Ok(())
}

fn handle_research_command(assets_dir: &Path, command: ResearchCommand) -> Result<()> {
    let mut research = ResearchStore::open(assets_dir)?;

    match command {
        ResearchCommand::List { archived } => {
            for id in research.list_ids(archived) {
                println!("{id}");
            }
        }
        ResearchCommand::Show { id, archived } => {
            if let Some((record, text)) = research.get_details(&id, archived) {
                println!("{}", serde_json::to_string_pretty(&record)?);
                println!("{text}");
            } else {
                warn!("Research not found: {id}");
            }
        }
        ResearchCommand::Archive { id } => research.delete(&id, false)?,
        ResearchCommand::Delete { id } => research.delete(&id, true)?,
    }

    Ok(())
}
