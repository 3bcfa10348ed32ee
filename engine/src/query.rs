use crate::index::{DocId, InvertedIndex};
use crate::tokenizer::tokenize;
use serde::Serialize;
use std::cmp::Reverse;

pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hit {
    pub doc_id: DocId,
    pub hit_count: u32, // summed over every query word
}

impl Hit {
    /// Ranking order: more hits first, lower doc id on ties.
    pub fn outranks(&self, other: &Hit) -> bool {
        (self.hit_count, Reverse(self.doc_id)) > (other.hit_count, Reverse(other.doc_id))
    }
}

/// Ranked hits of one query, best first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    hits: Vec<Hit>,
}

impl SearchResult {
    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Hit> {
        self.hits.iter()
    }
}

impl<'a> IntoIterator for &'a SearchResult {
    type Item = &'a Hit;
    type IntoIter = std::slice::Iter<'a, Hit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}

/// Keeps the best `k` hits seen so far in ranking order.
///
/// Candidates that do not beat the current last place are dropped without
/// touching the buffer, so feeding `n` candidates costs O(n * k) at worst and
/// close to O(n) when most of them lose.
#[derive(Debug, Clone)]
pub struct TopK {
    k: usize,
    hits: Vec<Hit>,
}

impl TopK {
    pub fn new(k: usize) -> Self {
        Self { k, hits: Vec::with_capacity(k) }
    }

    pub fn push(&mut self, hit: Hit) {
        if self.k == 0 {
            return;
        }
        let full = self.hits.len() == self.k;
        if full {
            match self.hits.last() {
                Some(last) if !hit.outranks(last) => return,
                _ => {}
            }
        }
        let pos = self.hits.partition_point(|h| h.outranks(&hit));
        if full {
            self.hits.pop();
        }
        self.hits.insert(pos, hit);
    }

    pub fn into_result(self) -> SearchResult {
        SearchResult { hits: self.hits }
    }
}

/// Evaluates queries against one index snapshot.
///
/// The accumulator is a dense score slot per document plus the list of slots
/// a query touched, so it is reset in time proportional to the matches rather
/// than the corpus. Reuse one evaluator for a whole batch of queries.
pub struct QueryEvaluator<'a> {
    index: &'a InvertedIndex,
    top_k: usize,
    scores: Vec<u32>,
    touched: Vec<DocId>,
}

impl<'a> QueryEvaluator<'a> {
    pub fn new(index: &'a InvertedIndex, top_k: usize) -> Self {
        Self { index, top_k, scores: vec![0; index.num_docs()], touched: Vec::new() }
    }

    pub fn evaluate(&mut self, query: &str) -> SearchResult {
        // a word repeated in the query counts once per occurrence
        for word in tokenize(query) {
            for posting in self.index.lookup(word) {
                let Some(slot) = self.scores.get_mut(posting.doc_id as usize) else {
                    unreachable!("posting for doc {} outside the corpus", posting.doc_id);
                };
                if *slot == 0 {
                    self.touched.push(posting.doc_id);
                }
                *slot = slot.saturating_add(posting.hits);
            }
        }

        let mut top = TopK::new(self.top_k);
        for doc_id in self.touched.drain(..) {
            let hit_count = std::mem::take(&mut self.scores[doc_id as usize]);
            if hit_count > 0 {
                top.push(Hit { doc_id, hit_count });
            }
        }
        top.into_result()
    }
}

/// One-off evaluation; prefer [`QueryEvaluator`] when running many queries.
pub fn evaluate(index: &InvertedIndex, query: &str, top_k: usize) -> SearchResult {
    QueryEvaluator::new(index, top_k).evaluate(query)
}
