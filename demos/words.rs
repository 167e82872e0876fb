//! Build a trie over a word list and compare it against BTreeMap.
//!
//! Usage:
//!   cargo run --release --example words -- <path_to_word_list>
//!
//! Any newline-delimited list works, e.g. /usr/share/dict/words.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::time::Instant;
use symtrie::Trie;

fn main() {
    let path = std::env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: words <path_to_word_list>");
        eprintln!("  e.g. cargo run --release --example words -- /usr/share/dict/words");
        std::process::exit(1);
    });

    println!("Loading words from: {path}");

    let file = File::open(&path).expect("Failed to open file");
    let reader = BufReader::new(file);
    let words: Vec<String> = reader
        .lines()
        .filter_map(|l| l.ok())
        .filter(|l| !l.is_empty())
        .collect();

    let n = words.len();
    println!("Loaded {n} words");

    if n == 0 {
        println!("No words to process");
        return;
    }

    let total_bytes: usize = words.iter().map(|w| w.len()).sum();
    println!("Raw key bytes: {total_bytes}");

    // BTreeMap baseline
    println!("\n=== BTreeMap<String, u64> ===");
    let start = Instant::now();
    let mut btree: BTreeMap<String, u64> = BTreeMap::new();
    for (i, word) in words.iter().enumerate() {
        btree.insert(word.clone(), i as u64);
    }
    println!("  Insert time: {:?}", start.elapsed());

    let start = Instant::now();
    let mut found = 0usize;
    for word in words.iter().take(10_000) {
        if btree.get(word).is_some() {
            found += 1;
        }
    }
    let lookup_time = start.elapsed();
    println!(
        "  Lookup: {found} in {lookup_time:?} ({:.0} ops/sec)",
        10_000.0 / lookup_time.as_secs_f64()
    );

    // Trie, built through the slot API
    println!("\n=== Trie<String, u64> ===");
    let start = Instant::now();
    let mut trie: Trie<String, u64> = Trie::with_capacity(total_bytes / 2);
    for (i, word) in words.iter().enumerate() {
        *trie.slot(word.clone()) = Some(i as u64);
    }
    println!("  Insert time: {:?}", start.elapsed());

    let stats = trie.stats();
    println!("  Arena stats:");
    println!("    Nodes: {}", stats.nodes);
    println!("    Entries: {}", stats.entries);
    println!("    Keyed nodes: {}", stats.keyed);
    println!("    Leaves: {}", stats.leaves);
    println!("    Max depth: {}", stats.max_depth);
    println!(
        "    Nodes per entry: {:.2}",
        stats.nodes as f64 / stats.entries as f64
    );

    let start = Instant::now();
    let mut found = 0usize;
    for word in words.iter().take(10_000) {
        if trie.get(word).is_some() {
            found += 1;
        }
    }
    let lookup_time = start.elapsed();
    println!(
        "  Lookup: {found} in {lookup_time:?} ({:.0} ops/sec)",
        10_000.0 / lookup_time.as_secs_f64()
    );

    // A short key, the longest key, garbage, and one symbol past a real
    // word, so the probes cover both failure modes.
    let longest = words.iter().max_by_key(|w| w.len()).unwrap();
    let probes = vec![
        "a".to_string(),
        longest.clone(),
        "kadfjjsdiof".to_string(),
        format!("{longest}x"),
    ];
    println!("\nPoint probes:");
    for probe in &probes {
        let verdict = if trie.contains_key(probe) { "hit" } else { "miss" };
        println!("  {probe:?}: {verdict}");
    }

    // Full walk
    let start = Instant::now();
    let mut key_bytes = 0usize;
    let mut value_sum = 0u64;
    for (key, value) in trie.iter() {
        key_bytes += key.len();
        value_sum += value;
    }
    let walk_time = start.elapsed();
    println!("\nFull walk: {key_bytes} key bytes, value sum {value_sum}, in {walk_time:?}");

    // Prefix scan vs BTreeMap range
    let prefix: String = longest.chars().take(3).collect();
    let start = Instant::now();
    let trie_count = trie.prefix_scan(&prefix).count();
    let trie_time = start.elapsed();
    let start = Instant::now();
    let btree_count = btree
        .range(prefix.clone()..)
        .take_while(|(k, _)| k.starts_with(&prefix))
        .count();
    let btree_time = start.elapsed();
    println!("\nPrefix scan {prefix:?}:");
    println!("  Trie: {trie_count} matches in {trie_time:?}");
    println!("  BTreeMap range: {btree_count} matches in {btree_time:?}");

    // Verify against the model
    println!("\nVerifying correctness...");
    let mut correct = 0usize;
    for (word, i) in btree.iter() {
        if trie.get(word) == Some(i) {
            correct += 1;
        }
    }
    println!("  Correct: {correct}/{}", btree.len());
}
