//! Command-line front end for the memdesk support agent.

use anyhow::{Context, bail};
use autoagents_llm::LLMProvider;
use autoagents_llm::backends::openai::OpenAI;
use autoagents_llm::builder::LLMBuilder;
use clap::{Parser, Subcommand};
use log::{debug, info};
use memdesk::config::{CompletionConfig, MemdeskConfig, StoreConfig, StoreProvider};
use memdesk::memory::{
    FileMemoryStore, HttpMemoryStore, HttpMemoryStoreOptions, MemoryStore, UserId,
};
use memdesk::{SupportAgent, SupportAgentBuilder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "memdesk", version, about = "Customer support agent with per-user memory")]
struct Cli {
    /// Optional path to a memdesk.json5 config file (skips layered discovery)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Answer one customer query and remember the exchange
    Ask {
        /// Customer id
        #[arg(long)]
        user: String,
        /// Query text
        query: String,
    },
    /// List everything remembered for a customer
    Memories {
        /// Customer id
        #[arg(long)]
        user: String,
    },
    /// Generate a synthetic profile and seed it into memory
    Seed {
        /// Customer id
        #[arg(long)]
        user: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();
    memdesk::init_logging();

    let cli = Cli::parse();
    info!("starting memdesk (config_set={})", cli.config.is_some());
    let config = load_config(cli.config.as_deref())?;
    let agent = build_agent(&config)?;

    match cli.command {
        Command::Ask { user, query } => {
            let user_id = parse_user(user)?;
            let report = agent.handle_query_report(&query, &user_id).await;
            debug!(
                "query finished (recall={:?}, fallback={})",
                report.recall, report.fallback
            );
            println!("{}", report.answer);
        }
        Command::Memories { user } => {
            let user_id = parse_user(user)?;
            let records = agent
                .get_memories(&user_id)
                .await
                .context("failed to retrieve memories")?;
            if records.is_empty() {
                println!("No memories found for {user_id}.");
            }
            for record in records {
                let role = record.role().map(|role| role.as_str()).unwrap_or("unknown");
                println!("- [{role}] {}", record.content);
            }
        }
        Command::Seed { user } => {
            let user_id = parse_user(user)?;
            let profile = agent
                .try_generate_synthetic_profile(&user_id)
                .await
                .context("failed to generate synthetic data")?;
            let rendered = serde_json::to_string_pretty(&profile.data)?;
            println!("{rendered}");
            info!("stored {} profile facts for {user_id}", profile.facts.len());
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<MemdeskConfig> {
    if let Some(path) = path {
        let mut config = MemdeskConfig::load_from_path(path).context("failed to load config")?;
        config.apply_process_env();
        config.validate().context("invalid config")?;
        return Ok(config);
    }
    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
    let layered = MemdeskConfig::load_layered(&cwd).context("failed to load layered config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    Ok(layered.config)
}

fn build_agent(config: &MemdeskConfig) -> anyhow::Result<SupportAgent> {
    let store = build_store(&config.store)?;
    let completion = &config.completion;
    let (answer_cap, profile_cap) = token_caps(completion);
    let llm = build_llm(completion, &completion.model, answer_cap)?;
    let profile_llm = build_llm(completion, &completion.profile_model, profile_cap)?;
    Ok(SupportAgentBuilder::from_config(config, store, llm)
        .profile_llm(profile_llm)
        .build())
}

/// Token caps for the answer and profile providers. Profiles stay uncapped
/// unless `profile_max_tokens` is set.
fn token_caps(config: &CompletionConfig) -> (Option<u32>, Option<u32>) {
    (Some(config.max_tokens), config.profile_max_tokens)
}

fn build_llm(
    config: &CompletionConfig,
    model: &str,
    max_tokens: Option<u32>,
) -> anyhow::Result<Arc<dyn LLMProvider>> {
    let Some(api_key) = config.api_key.clone() else {
        bail!("completion.api_key is required");
    };
    info!("building completion provider (model={model}, max_tokens={max_tokens:?})");
    let mut builder = LLMBuilder::<OpenAI>::new().api_key(api_key).model(model);
    if let Some(max_tokens) = max_tokens {
        builder = builder.max_tokens(max_tokens);
    }
    if let Some(base_url) = config.base_url.as_ref() {
        builder = builder.base_url(base_url.clone());
    }
    if let Some(timeout) = config.timeout_seconds {
        builder = builder.timeout_seconds(timeout);
    }
    let llm: Arc<dyn LLMProvider> = builder
        .build()
        .context("failed to build completion provider")?;
    Ok(llm)
}

fn build_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn MemoryStore>> {
    match config.provider {
        StoreProvider::Http => {
            let (Some(url), Some(api_key)) = (config.url.clone(), config.api_key.clone()) else {
                bail!("store.url and store.api_key are required for the http store");
            };
            let store = HttpMemoryStore::new(HttpMemoryStoreOptions {
                url,
                api_key,
                timeout: config.timeout_seconds.map(Duration::from_secs),
            })
            .context("failed to create http memory store")?;
            Ok(Arc::new(store))
        }
        StoreProvider::File => {
            let Some(path) = config.path.as_ref() else {
                bail!("store.path is required for the file store");
            };
            let store =
                FileMemoryStore::new(path).context("failed to create file memory store")?;
            Ok(Arc::new(store))
        }
    }
}

fn parse_user(user: String) -> anyhow::Result<UserId> {
    UserId::new(user).context("customer id must not be empty")
}
