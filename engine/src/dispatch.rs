use crate::config::EngineConfig;
use crate::holder::IndexHolder;
use crate::index::InvertedIndex;
use crate::output::OutputFormat;
use crate::query::QueryEvaluator;
use crate::tokenizer::is_blank;
use anyhow::Result;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub queries: usize,
    pub batches: usize,
    pub elapsed: Duration,
}

/// Runs a query stream in batches on the blocking pool and writes results
/// back in input order.
///
/// Each batch acquires the current index once when it is dispatched and
/// keeps that snapshot for all of its queries, so a rebuild landing mid-batch
/// is only seen by later batches. Completed batches wait in a queue of join
/// handles until every earlier batch has been written.
pub struct BatchDispatcher {
    holder: Arc<IndexHolder>,
    top_k: usize,
    batch_size: usize,
    max_in_flight: usize,
    format: OutputFormat,
}

impl BatchDispatcher {
    pub fn new(holder: Arc<IndexHolder>, config: &EngineConfig) -> Self {
        let config = config.clone().normalized();
        Self {
            holder,
            top_k: config.top_k,
            batch_size: config.batch_size,
            max_in_flight: config.max_in_flight,
            format: config.format,
        }
    }

    /// Answer every non-blank line of `input`, one result line each.
    ///
    /// A read error or invalid UTF-8 stops the stream; results of batches
    /// not yet written are discarded.
    pub async fn run<R, W>(&self, input: R, output: W) -> Result<DispatchStats>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let (top_k, format) = (self.top_k, self.format);
        self.run_with(input, output, move |index, queries| evaluate_batch(index, queries, top_k, format)).await
    }

    pub(crate) async fn run_with<R, W, F>(&self, input: R, mut output: W, work: F) -> Result<DispatchStats>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        F: Fn(&InvertedIndex, &[String]) -> Vec<String> + Send + Sync + 'static,
    {
        let start = Instant::now();
        let work = Arc::new(work);
        let mut lines = input.lines();
        let mut pending: VecDeque<JoinHandle<Vec<String>>> = VecDeque::with_capacity(self.max_in_flight);
        let mut batch: Vec<String> = Vec::with_capacity(self.batch_size);
        let mut stats = DispatchStats::default();

        while let Some(line) = lines.next_line().await? {
            if is_blank(&line) {
                continue;
            }
            stats.queries += 1;
            batch.push(line);
            if batch.len() < self.batch_size {
                continue;
            }

            make_room(&mut pending, &mut output, self.max_in_flight).await?;
            let full = std::mem::replace(&mut batch, Vec::with_capacity(self.batch_size));
            pending.push_back(self.dispatch(full, &work, stats.batches));
            stats.batches += 1;
        }

        if !batch.is_empty() {
            make_room(&mut pending, &mut output, self.max_in_flight).await?;
            pending.push_back(self.dispatch(batch, &work, stats.batches));
            stats.batches += 1;
        }
        while let Some(handle) = pending.pop_front() {
            emit(&mut output, handle).await?;
        }
        output.flush().await?;

        stats.elapsed = start.elapsed();
        tracing::info!(
            queries = stats.queries,
            batches = stats.batches,
            took_ms = stats.elapsed.as_millis() as u64,
            "query stream complete"
        );
        Ok(stats)
    }

    fn dispatch<F>(&self, batch: Vec<String>, work: &Arc<F>, seq: usize) -> JoinHandle<Vec<String>>
    where
        F: Fn(&InvertedIndex, &[String]) -> Vec<String> + Send + Sync + 'static,
    {
        let index = self.holder.acquire();
        let work = Arc::clone(work);
        tracing::debug!(batch = seq, queries = batch.len(), docs = index.num_docs(), "dispatching batch");
        tokio::task::spawn_blocking(move || work(&index, &batch))
    }
}

/// Write every finished batch at the head of the queue, then wait for the
/// oldest one if the queue is still at capacity.
async fn make_room<W: AsyncWrite + Unpin>(
    pending: &mut VecDeque<JoinHandle<Vec<String>>>,
    output: &mut W,
    max_in_flight: usize,
) -> Result<()> {
    while pending.front().is_some_and(|h| h.is_finished()) {
        if let Some(handle) = pending.pop_front() {
            emit(output, handle).await?;
        }
    }
    if pending.len() >= max_in_flight {
        if let Some(handle) = pending.pop_front() {
            emit(output, handle).await?;
        }
    }
    Ok(())
}

async fn emit<W: AsyncWrite + Unpin>(output: &mut W, handle: JoinHandle<Vec<String>>) -> Result<()> {
    let lines = handle.await?;
    for line in lines {
        output.write_all(line.as_bytes()).await?;
        output.write_all(b"\n").await?;
    }
    Ok(())
}

/// Evaluate `queries` in order against one snapshot, formatted as output
/// lines.
pub fn evaluate_batch(index: &InvertedIndex, queries: &[String], top_k: usize, format: OutputFormat) -> Vec<String> {
    let mut evaluator = QueryEvaluator::new(index, top_k);
    queries.iter().map(|query| format.render(query, &evaluator.evaluate(query))).collect()
}
