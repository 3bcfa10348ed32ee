use crate::config::EngineConfig;
use crate::dispatch::{BatchDispatcher, DispatchStats};
use crate::holder::IndexHolder;
use crate::index::InvertedIndex;
use crate::query::{evaluate, SearchResult};
use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildStats {
    pub num_docs: usize,
    pub num_words: usize,
    pub generation: u64,
    pub elapsed: Duration,
}

/// Serves queries from the current document base while new ones are loaded.
pub struct SearchEngine {
    holder: Arc<IndexHolder>,
    dispatcher: BatchDispatcher,
    config: EngineConfig,
    // one document stream is scanned at a time
    rebuild_lock: Mutex<()>,
}

impl SearchEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_index(config, InvertedIndex::new())
    }

    pub fn with_index(config: EngineConfig, index: InvertedIndex) -> Self {
        let config = config.normalized();
        let holder = Arc::new(IndexHolder::new(index));
        let dispatcher = BatchDispatcher::new(Arc::clone(&holder), &config);
        Self { holder, dispatcher, config, rebuild_lock: Mutex::new(()) }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn holder(&self) -> &Arc<IndexHolder> {
        &self.holder
    }

    /// Read a whole document stream, index it off to the side and swap it in.
    ///
    /// Queries keep running against the previous index until the swap. A
    /// failed read leaves the current index untouched.
    pub async fn update_document_base<R>(&self, input: R) -> Result<RebuildStats>
    where
        R: AsyncBufRead + Unpin,
    {
        let _guard = self.rebuild_lock.lock().await;
        let start = Instant::now();
        let mut lines = input.lines();
        let mut docs = Vec::new();
        while let Some(line) = lines.next_line().await? {
            docs.push(line);
        }
        let index = tokio::task::spawn_blocking(move || InvertedIndex::build(docs)).await?;
        Ok(self.install_since(index, start))
    }

    /// Swap in an index that was built elsewhere.
    pub fn install(&self, index: InvertedIndex) -> RebuildStats {
        self.install_since(index, Instant::now())
    }

    fn install_since(&self, index: InvertedIndex, start: Instant) -> RebuildStats {
        let num_docs = index.num_docs();
        let num_words = index.num_words();
        let generation = self.holder.swap(index).generation;
        let stats = RebuildStats { num_docs, num_words, generation, elapsed: start.elapsed() };
        tracing::info!(
            num_docs,
            num_words,
            generation = stats.generation,
            took_ms = stats.elapsed.as_millis() as u64,
            "document base updated"
        );
        stats
    }

    pub fn search(&self, query: &str) -> SearchResult {
        evaluate(&self.holder.acquire(), query, self.config.top_k)
    }

    pub async fn add_queries_stream<R, W>(&self, input: R, output: W) -> Result<DispatchStats>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.dispatcher.run(input, output).await
    }
}
