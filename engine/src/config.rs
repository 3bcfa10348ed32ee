use crate::output::OutputFormat;
use crate::query::DEFAULT_TOP_K;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const DEFAULT_BATCH_SIZE: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Hits reported per query.
    pub top_k: usize,
    /// Queries evaluated by one worker against one index snapshot.
    pub batch_size: usize,
    /// Batches allowed to run at once before the reader waits.
    pub max_in_flight: usize,
    pub format: OutputFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            batch_size: DEFAULT_BATCH_SIZE,
            max_in_flight: default_parallelism(),
            format: OutputFormat::Text,
        }
    }
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
}

impl EngineConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut f = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
        let mut buf = String::new();
        f.read_to_string(&mut buf)?;
        let config: EngineConfig =
            serde_json::from_str(&buf).with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config.normalized())
    }

    /// Clamp knobs that must be positive; a zero `top_k` is allowed and
    /// simply yields empty results.
    pub fn normalized(mut self) -> Self {
        self.batch_size = self.batch_size.max(1);
        self.max_in_flight = self.max_in_flight.max(1);
        self
    }
}
