use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;

use grounder_gateway::{AppState, GatewayServer};
use grounder_github::GithubClient;
use grounder_index::chunker::ChunkerConfig;
use grounder_index::indexer::{IndexerConfig, RepoIndexer};
use grounder_index::progress::ProgressTracker;
use grounder_index::qdrant::QdrantVectorStore;
use grounder_index::retriever::ContextRetriever;
use grounder_index::source::RepoSource;
use grounder_index::store::RepoVectorStore;
use grounder_index::vector::VectorStore;
use grounder_llm::any::AnyProvider;
use grounder_llm::openai::OpenAiProvider;

mod config;

use config::Config;

#[derive(Debug, Parser)]
#[command(
    name = "grounder",
    version,
    about = "Repo-grounded issue drafting service"
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(short, long, default_value = "grounder.toml")]
    config: PathBuf,

    /// Override the gateway bind address.
    #[arg(long)]
    bind: Option<String>,

    /// Override the gateway port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let mut config = Config::load(&cli.config)?;
    if let Some(bind) = cli.bind {
        config.gateway.bind = bind;
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }

    let api_key = config
        .llm
        .api_key
        .clone()
        .context("LLM API key missing: set GROUNDER_OPENAI_API_KEY or [llm] api_key")?;

    let provider = Arc::new(AnyProvider::OpenAi(OpenAiProvider::new(
        api_key,
        config.llm.base_url.clone(),
        config.llm.model.clone(),
        Some(config.llm.embedding_model.clone()),
    )));

    let vector_store: Arc<dyn VectorStore> = Arc::new(
        QdrantVectorStore::new(&config.vector.qdrant_url)
            .context("failed to create Qdrant client")?,
    );
    let store = RepoVectorStore::new(vector_store, Arc::clone(&provider));
    let progress = ProgressTracker::new();
    let github = Arc::new(GithubClient::new());

    let indexer = Arc::new(RepoIndexer::new(
        Arc::clone(&github) as Arc<dyn RepoSource>,
        store.clone(),
        progress.clone(),
        IndexerConfig {
            concurrency: config.index.concurrency,
            chunker: ChunkerConfig {
                size: config.index.chunk_size,
                overlap: config.index.chunk_overlap,
            },
        },
    ));
    let retriever = Arc::new(ContextRetriever::new(store));

    let state = AppState {
        indexer,
        retriever,
        progress,
        github,
        provider,
        github_token: config.github.token.clone(),
        started_at: Instant::now(),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    GatewayServer::new(&config.gateway.bind, config.gateway.port, state, shutdown_rx)
        .with_auth(config.gateway.auth_token.clone())
        .serve()
        .await?;

    Ok(())
}
