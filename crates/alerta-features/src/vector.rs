//! The fixed-cardinality, fixed-order feature record (§3, §4.2 table).
//!
//! Field order and names are load-bearing: the ML predictor's artifact
//! carries its own feature-name list and refuses to load if it disagrees
//! with [`FEATURE_NAMES`] (§4.4).

use serde::Serialize;

/// Order is the contract — do not reorder without bumping the model
/// artifact's format version.
pub const FEATURE_NAMES: [&str; 24] = [
    "url_length",
    "domain_length",
    "path_length",
    "num_digits",
    "num_hyphens",
    "num_dots",
    "num_subdomains",
    "entropy",
    "has_https",
    "has_port",
    "has_at_symbol",
    "contains_ip",
    "has_punycode",
    "shortener_detected",
    "paste_service_detected",
    "has_suspicious_words",
    "tld_risk",
    "excessive_subdomains",
    "digit_ratio",
    "num_params",
    "special_chars",
    "in_tranco",
    "tranco_rank",
    "brand_impersonation",
];

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeatureVector {
    pub url_length: i64,
    pub domain_length: i64,
    pub path_length: i64,
    pub num_digits: i64,
    pub num_hyphens: i64,
    pub num_dots: i64,
    pub num_subdomains: i64,
    pub entropy: f64,
    pub has_https: bool,
    pub has_port: bool,
    pub has_at_symbol: bool,
    pub contains_ip: bool,
    pub has_punycode: bool,
    pub shortener_detected: bool,
    pub paste_service_detected: bool,
    pub has_suspicious_words: i64,
    pub tld_risk: bool,
    pub excessive_subdomains: bool,
    pub digit_ratio: f64,
    pub num_params: i64,
    pub special_chars: i64,
    /// Placeholder until a Tranco lookup actually runs (§3).
    pub in_tranco: bool,
    /// Normalized rank in `[0,1]`; `0.0` until a Tranco lookup runs.
    pub tranco_rank: f64,
    pub brand_impersonation: bool,
}

impl FeatureVector {
    /// Record the Tranco outcome once C6 has run. `rank` is 1-based;
    /// `threshold` is the configured top-k cutoff (§6.4).
    pub fn apply_tranco(&mut self, rank: Option<u32>, threshold: u32) {
        match rank {
            Some(r) if r <= threshold => {
                self.in_tranco = true;
                self.tranco_rank = 1.0 - (r as f64 / threshold as f64);
            }
            _ => {
                self.in_tranco = false;
                self.tranco_rank = 0.0;
            }
        }
    }

    /// Values in [`FEATURE_NAMES`] order, for the ML predictor.
    pub fn to_ordered_values(&self) -> [f64; 24] {
        [
            self.url_length as f64,
            self.domain_length as f64,
            self.path_length as f64,
            self.num_digits as f64,
            self.num_hyphens as f64,
            self.num_dots as f64,
            self.num_subdomains as f64,
            self.entropy,
            bool_f64(self.has_https),
            bool_f64(self.has_port),
            bool_f64(self.has_at_symbol),
            bool_f64(self.contains_ip),
            bool_f64(self.has_punycode),
            bool_f64(self.shortener_detected),
            bool_f64(self.paste_service_detected),
            self.has_suspicious_words as f64,
            bool_f64(self.tld_risk),
            bool_f64(self.excessive_subdomains),
            self.digit_ratio,
            self.num_params as f64,
            self.special_chars as f64,
            bool_f64(self.in_tranco),
            self.tranco_rank,
            bool_f64(self.brand_impersonation),
        ]
    }
}

fn bool_f64(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}
