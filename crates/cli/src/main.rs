use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use qa_corpus::{fingerprint, CorpusStore};
use qa_embedder::EmbeddingClient;
use qa_indexer::ledger;
use qa_search::{QaSearch, ServiceConfig};
use qa_vector_store::VectorStore;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "qa-finder")]
#[command(about = "Retrieval index over a question/answer corpus", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Corpus file (JSON array of QA records)
    #[arg(long, global = true, default_value = "qa-corpus.json")]
    corpus: PathBuf,

    /// Directory holding the vector cache and fingerprint ledger
    #[arg(long, global = true, default_value = ".qa-finder")]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Bring the vector index in sync with the corpus
    Reconcile,

    /// Query the index
    Search {
        /// Search query
        query: String,

        /// Maximum results to return
        #[arg(short = 'k', long = "limit", default_value_t = qa_search::DEFAULT_K)]
        limit: usize,
    },

    /// Show corpus, cache, and ledger state
    Status,
}

#[derive(Serialize)]
struct StatusReport {
    corpus_path: String,
    corpus_records: usize,
    cache_present: bool,
    cached_chunks: usize,
    ledger_entries: usize,
    /// True when the persisted corpus digest no longer matches the file.
    stale: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    let config = ServiceConfig::for_data_dir(&cli.data_dir, &cli.corpus);

    match cli.command {
        Commands::Reconcile => {
            let service = build_service(config)?;
            let stats = service.refresh().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Search { query, limit } => {
            let service = build_service(config)?;
            let hits = service.search(&query, limit).await?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Commands::Status => {
            let report = status(&config).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn build_service(config: ServiceConfig) -> Result<QaSearch> {
    let embedder = EmbeddingClient::from_env().context("failed to configure embedding client")?;
    Ok(QaSearch::new(config, embedder)?)
}

async fn status(config: &ServiceConfig) -> Result<StatusReport> {
    let corpus = CorpusStore::new(&config.corpus_path);
    let snapshot = corpus
        .snapshot()
        .await
        .with_context(|| format!("failed to read corpus at {}", config.corpus_path.display()))?;
    let current_digest = fingerprint::corpus_fingerprint(&snapshot.bytes);

    let mut store = VectorStore::new();
    let (cache_present, cached_chunks) = match store.load_from_file(&config.cache_path).await {
        Ok(true) => (true, store.count()),
        Ok(false) => (false, 0),
        Err(err) => {
            log::warn!("Vector cache is unreadable: {err}");
            (true, 0)
        }
    };

    let ledger_entries = ledger::read_ledger(&config.ledger_path)
        .await?
        .map_or(0, |entries| entries.len());
    let persisted_digest = ledger::read_corpus_hash(&config.corpus_hash_path).await?;
    let stale = persisted_digest.as_deref() != Some(current_digest.as_str());

    Ok(StatusReport {
        corpus_path: config.corpus_path.display().to_string(),
        corpus_records: snapshot.records.len(),
        cache_present,
        cached_chunks,
        ledger_entries,
        stale,
    })
}
