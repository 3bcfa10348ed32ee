use anyhow::Result;
use clap::Parser;
use cli::{run, Args};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries results, logs go to stderr
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let args = Args::parse();
    let summary = run(args).await?;
    tracing::info!(
        docs = summary.initial.num_docs,
        words = summary.initial.num_words,
        reloads = summary.reloads,
        queries = summary.dispatch.queries,
        took_s = summary.dispatch.elapsed.as_secs_f64(),
        "done"
    );
    Ok(())
}
