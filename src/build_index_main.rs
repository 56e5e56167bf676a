use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use travel_rag::core::config::{AppPaths, ConfigService};
use travel_rag::core::logging::{self, LogTarget};
use travel_rag::rag::{build_embedder, CorpusIndexer, RecursiveSplitter, SplitterConfig};

/// Embeds a text corpus into the vector index served by `travel-rag`.
#[derive(Debug, Parser)]
#[command(name = "build_index", version)]
struct Args {
    /// Corpus text file; defaults to `rag.corpus_path`.
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Index output path; defaults to `rag.index_path`.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Configuration file to use instead of the discovered `config.yml`.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let paths = Arc::new(AppPaths::new());
    logging::init(&paths, LogTarget::Indexer);

    let mut config_service = ConfigService::new(paths.clone());
    if let Some(path) = args.config {
        config_service = config_service.with_config_path(paths.resolve(&path));
    }
    let config = config_service
        .load()
        .with_context(|| format!("Failed to load {}", config_service.config_path().display()))?;

    let corpus = args
        .corpus
        .map(|p| paths.resolve(&p))
        .unwrap_or_else(|| config.rag.corpus_path.clone());
    let output = args
        .output
        .map(|p| paths.resolve(&p))
        .unwrap_or_else(|| config.rag.index_path.clone());

    let embedder = build_embedder(&config.embedding).context("Failed to build embedding backend")?;
    let splitter = RecursiveSplitter::new(SplitterConfig::from(&config.rag));
    let indexer = CorpusIndexer::new(splitter, embedder);

    match indexer.run(&corpus, &output).await {
        Ok(report) => {
            tracing::info!(
                "Indexed {} chunks ({} dims, model '{}') into {}",
                report.chunk_count,
                report.dimensions,
                report.embedding_model,
                report.output_path.display()
            );
            Ok(())
        }
        Err(err) => {
            tracing::error!("Indexing {} failed: {}", corpus.display(), err);
            Err(err).with_context(|| format!("Failed to index {}", corpus.display()))
        }
    }
}
