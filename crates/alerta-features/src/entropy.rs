//! Shannon entropy over a character frequency distribution.
//!
//! Algorithm grounded on the workspace's own perplexity-analysis module:
//! build a frequency map, then accumulate `-p * log2(p)` per symbol. The
//! detection threshold here (3.5 bits, §4.5 `HIGH_ENTROPY`) is the
//! scoring engine's own calibrated value, not the 4.5-bit default used
//! by that unrelated subsystem.

use std::collections::HashMap;

/// Shannon entropy of `text` in bits. Returns `0.0` for empty input.
pub fn shannon_entropy(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in text.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }
    let len = text.chars().count() as f64;
    freq.values().fold(0.0, |acc, &count| {
        let p = count as f64 / len;
        acc - p * p.log2()
    })
}
