use crate::tokenizer::{is_blank, tokenize};
use std::collections::HashMap;

pub type DocId = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocId,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: DocId,
    pub hits: u32, // occurrences of the word in this document, always >= 1
}

/// Word to posting-list mapping over an ordered corpus.
///
/// An index is never modified after [`InvertedIndex::build`] returns; a new
/// document base means a new index.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    words: HashMap<String, Vec<Posting>>, // postings sorted by doc_id
    docs: Vec<Document>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every non-blank line as one document, numbering them from 0 in
    /// input order. Blank lines do not consume an id.
    pub fn build<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = Self::new();
        let mut tf_counts: HashMap<String, u32> = HashMap::new();
        for line in lines {
            let text: String = line.into();
            if is_blank(&text) {
                continue;
            }
            let doc_id = index.docs.len() as DocId;

            for word in tokenize(&text) {
                match tf_counts.get_mut(word) {
                    Some(count) => *count += 1,
                    None => {
                        tf_counts.insert(word.to_string(), 1);
                    }
                }
            }
            // doc ids only grow, so pushing keeps every posting list sorted
            for (word, hits) in tf_counts.drain() {
                index.words.entry(word).or_default().push(Posting { doc_id, hits });
            }

            index.docs.push(Document { id: doc_id, text });
        }
        index
    }

    /// Postings for `word`, empty when the word was never indexed.
    pub fn lookup(&self, word: &str) -> &[Posting] {
        self.words.get(word).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn document(&self, id: DocId) -> Option<&Document> {
        self.docs.get(id as usize)
    }

    pub fn num_docs(&self) -> usize {
        self.docs.len()
    }

    /// Number of distinct words.
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}
