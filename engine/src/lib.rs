//! In-memory keyword search over short text documents.
//!
//! Documents are indexed into an immutable [`InvertedIndex`], published to
//! readers through an [`IndexHolder`] and queried in batches by the
//! [`BatchDispatcher`]. [`SearchEngine`] ties them together.

pub mod config;
pub mod dispatch;
pub mod holder;
pub mod index;
pub mod output;
pub mod query;
pub mod search;
pub mod tokenizer;

pub use config::EngineConfig;
pub use dispatch::{BatchDispatcher, DispatchStats};
pub use holder::{IndexHolder, Swapped};
pub use index::{DocId, Document, InvertedIndex, Posting};
pub use output::OutputFormat;
pub use query::{evaluate, Hit, QueryEvaluator, SearchResult, TopK, DEFAULT_TOP_K};
pub use search::{RebuildStats, SearchEngine};
