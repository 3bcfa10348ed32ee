use engine::{EngineConfig, InvertedIndex, OutputFormat, SearchEngine};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn corpus(seed: u64, docs: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut lines = Vec::with_capacity(docs);
    for i in 0..docs {
        if i % 9 == 4 {
            lines.push(String::new());
            continue;
        }
        let words: Vec<String> = (0..rng.random_range(0..10)).map(|_| format!("t{}", rng.random_range(0..15))).collect();
        lines.push(words.join(" "));
    }
    lines
}

fn lines(out: &[u8]) -> Vec<String> {
    String::from_utf8(out.to_vec()).unwrap().lines().map(str::to_string).collect()
}

#[test]
fn lookup_matches_word_counts() {
    let docs = corpus(7, 200);
    let index = InvertedIndex::build(docs.clone());
    let kept: Vec<&String> = docs.iter().filter(|d| !d.trim().is_empty()).collect();
    assert_eq!(index.num_docs(), kept.len());

    let mut expected: HashMap<&str, Vec<(u32, u32)>> = HashMap::new();
    for (id, doc) in kept.iter().enumerate() {
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for w in doc.split_whitespace() {
            *counts.entry(w).or_insert(0) += 1;
        }
        for (w, c) in counts {
            expected.entry(w).or_default().push((id as u32, c));
        }
    }
    assert_eq!(index.num_words(), expected.len());
    for (word, mut postings) in expected {
        postings.sort();
        let got: Vec<(u32, u32)> = index.lookup(word).iter().map(|p| (p.doc_id, p.hits)).collect();
        assert_eq!(got, postings, "word {word}");
    }
}

#[tokio::test]
async fn update_then_stream_queries() {
    let config = EngineConfig { batch_size: 3, max_in_flight: 2, ..EngineConfig::default() };
    let engine = SearchEngine::new(config);
    engine.update_document_base("a b a\nb c\n\n".as_bytes()).await.unwrap();

    let mut out = Vec::new();
    let stats = engine.add_queries_stream("a b\n\nmissing\nc c\n".as_bytes(), &mut out).await.unwrap();
    assert_eq!(stats.queries, 3);
    assert_eq!(
        lines(&out),
        vec![
            "a b: {docid: 0, hitcount: 3} {docid: 1, hitcount: 1}",
            "missing:",
            "c c: {docid: 1, hitcount: 2}",
        ]
    );
}

#[tokio::test]
async fn json_output_stream() {
    let config = EngineConfig { format: OutputFormat::Json, ..EngineConfig::default() };
    let engine = SearchEngine::with_index(config, InvertedIndex::build(["x y", "y"]));
    let mut out = Vec::new();
    engine.add_queries_stream("y\n".as_bytes(), &mut out).await.unwrap();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["query"], "y");
    assert_eq!(v["hits"].as_array().unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rebuilds_during_stream_never_mix_snapshots() {
    let config = EngineConfig { top_k: 10, batch_size: 25, max_in_flight: 4, ..EngineConfig::default() };
    let engine = Arc::new(SearchEngine::new(config));
    let small = "w\nw\nw\n";
    let large = "w\nw\nw\nw\nw\nw\nw\n";
    engine.update_document_base(small.as_bytes()).await.unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let rebuilder = {
        let engine = Arc::clone(&engine);
        let done = Arc::clone(&done);
        tokio::spawn(async move {
            let mut flip = false;
            while !done.load(Ordering::Relaxed) {
                let docs = if flip { small } else { large };
                engine.update_document_base(docs.as_bytes()).await.unwrap();
                flip = !flip;
                tokio::task::yield_now().await;
            }
        })
    };

    let queries = "w\n".repeat(5_000);
    let mut out = Vec::new();
    let stats = engine.add_queries_stream(queries.as_bytes(), &mut out).await.unwrap();
    done.store(true, Ordering::Relaxed);
    rebuilder.await.unwrap();

    let hits = |n: u32| -> String {
        let mut s = "w:".to_string();
        for id in 0..n {
            s.push_str(&format!(" {{docid: {id}, hitcount: 1}}"));
        }
        s
    };
    let (from_small, from_large) = (hits(3), hits(7));
    let out = lines(&out);
    assert_eq!(stats.queries, 5_000);
    assert_eq!(out.len(), 5_000);
    assert!(out.iter().all(|l| *l == from_small || *l == from_large));
}
