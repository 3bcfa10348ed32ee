use crate::query::SearchResult;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `query: {docid: 0, hitcount: 3} {docid: 1, hitcount: 1}`
    #[default]
    Text,
    /// `{"query":"...","hits":[{"doc_id":0,"hit_count":3}]}`
    Json,
}

impl OutputFormat {
    /// Render one result as a single line, without the trailing newline.
    pub fn render(self, query: &str, result: &SearchResult) -> String {
        match self {
            OutputFormat::Text => ResultLine { query, result }.to_string(),
            OutputFormat::Json => serde_json::json!({ "query": query, "hits": result.hits() }).to_string(),
        }
    }
}

/// Text form of one result. A query with no matches renders as the query
/// followed by a bare colon.
pub struct ResultLine<'a> {
    pub query: &'a str,
    pub result: &'a SearchResult,
}

impl fmt::Display for ResultLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.query)?;
        for hit in self.result {
            write!(f, " {{docid: {}, hitcount: {}}}", hit.doc_id, hit.hit_count)?;
        }
        Ok(())
    }
}
