use anyhow::{Context, Result};
use clap::Parser;
use engine::{DispatchStats, EngineConfig, OutputFormat, RebuildStats, SearchEngine};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader, BufWriter};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};

#[derive(Parser, Debug, Clone)]
#[command(name = "hitsearch")]
#[command(about = "Answer keyword queries against an in-memory document base", long_about = None)]
pub struct Args {
    /// Document file, one document per line
    #[arg(long)]
    pub docs: PathBuf,
    /// Query file, one query per line ("-" reads stdin)
    #[arg(long, default_value = "-")]
    pub queries: String,
    /// Result file ("-" writes stdout)
    #[arg(long, default_value = "-")]
    pub output: String,
    /// JSON engine config; the flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Hits reported per query
    #[arg(long)]
    pub top_k: Option<usize>,
    /// Queries per batch
    #[arg(long)]
    pub batch_size: Option<usize>,
    /// Batches evaluated concurrently
    #[arg(long)]
    pub max_in_flight: Option<usize>,
    /// Write one JSON object per query instead of text lines
    #[arg(long, default_value_t = false)]
    pub json: bool,
    /// Re-read the document file every N seconds while queries are served
    #[arg(long)]
    pub reload_interval_secs: Option<u64>,
}

impl Args {
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        if let Some(k) = self.top_k {
            config.top_k = k;
        }
        if let Some(n) = self.batch_size {
            config.batch_size = n;
        }
        if let Some(n) = self.max_in_flight {
            config.max_in_flight = n;
        }
        if self.json {
            config.format = OutputFormat::Json;
        }
        Ok(config.normalized())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub initial: RebuildStats,
    pub reloads: usize,
    pub dispatch: DispatchStats,
}

pub async fn run(args: Args) -> Result<RunSummary> {
    let engine = Arc::new(SearchEngine::new(args.engine_config()?));
    let initial = load_docs(&engine, &args.docs).await?;

    let reloads = Arc::new(AtomicUsize::new(0));
    let reloader = args
        .reload_interval_secs
        .filter(|secs| *secs > 0)
        .map(|secs| spawn_reloader(Arc::clone(&engine), args.docs.clone(), Duration::from_secs(secs), Arc::clone(&reloads)));

    let input: Box<dyn AsyncBufRead + Unpin + Send> = if args.queries == "-" {
        Box::new(BufReader::new(tokio::io::stdin()))
    } else {
        let f = File::open(&args.queries).await.with_context(|| format!("opening queries {}", args.queries))?;
        Box::new(BufReader::new(f))
    };
    let output: Box<dyn AsyncWrite + Unpin + Send> = if args.output == "-" {
        Box::new(BufWriter::new(tokio::io::stdout()))
    } else {
        let f = File::create(&args.output).await.with_context(|| format!("creating output {}", args.output))?;
        Box::new(BufWriter::new(f))
    };
    let served = engine.add_queries_stream(input, output).await;

    if let Some(handle) = reloader {
        handle.abort();
    }
    Ok(RunSummary { initial, reloads: reloads.load(Ordering::Relaxed), dispatch: served? })
}

pub async fn load_docs(engine: &SearchEngine, path: &Path) -> Result<RebuildStats> {
    let f = File::open(path).await.with_context(|| format!("opening documents {}", path.display()))?;
    engine
        .update_document_base(BufReader::new(f))
        .await
        .with_context(|| format!("reading documents {}", path.display()))
}

/// Rebuild from `path` every `every` until the handle is aborted. A failed
/// reload keeps the index that is already serving.
pub fn spawn_reloader(
    engine: Arc<SearchEngine>,
    path: PathBuf,
    every: Duration,
    reloads: Arc<AtomicUsize>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = reload_ticker(every);
        ticker.tick().await; // completes immediately
        loop {
            ticker.tick().await;
            match load_docs(&engine, &path).await {
                Ok(stats) => {
                    reloads.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(generation = stats.generation, "periodic reload");
                }
                Err(err) => tracing::warn!(error = %format!("{err:#}"), "reload failed, keeping current index"),
            }
        }
    })
}

/// A reload that overruns the interval pushes the next one back instead of
/// firing the missed ticks back to back.
fn reload_ticker(every: Duration) -> Interval {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
