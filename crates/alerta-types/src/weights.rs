//! The weights table (§3): `{signal_id -> integer weight}`, loaded once
//! from a versioned artifact. The constants here are the defaults §4.5
//! and §4.7 document; a loaded artifact overrides them signal-by-signal,
//! missing keys falling back to these values (§6.3).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default weight for every signal id the heuristic predictor or
/// crawler may emit (§4.5 table, §4.7 extension signals).
pub fn default_weights() -> HashMap<String, i64> {
    [
        ("IP_AS_HOST", 39),
        ("NO_HTTPS", 34),
        ("BRAND_IMPERSONATION", 31),
        ("SUSPICIOUS_WORDS", 18),
        ("PUNYCODE_DETECTED", 17),
        ("PASTE_SERVICE", 16),
        ("DOMAIN_NOT_IN_TRANCO", 12),
        ("HIGH_DIGIT_RATIO", 8),
        ("HIGH_ENTROPY", 8),
        ("URL_SHORTENER", 6),
        ("AT_SYMBOL", 5),
        ("RISKY_TLD", 15),
        ("EXCESSIVE_SUBDOMAINS", 10),
        ("LONG_URL", 1),
        ("DOMAIN_IN_TRANCO", -35),
        ("VIRUSTOTAL_CLEAN", -25),
        ("TRUSTED_DOMAIN", -15),
        ("DOMAIN_TOO_NEW", 35),
        ("DOMAIN_ESTABLISHED", -15),
        ("VIRUSTOTAL_MALICIOUS_LOW", 25),
        ("VIRUSTOTAL_MALICIOUS_MED", 40),
        ("VIRUSTOTAL_MALICIOUS_HIGH", 60),
        ("VIRUSTOTAL_MALICIOUS_CRITICAL", 80),
        // Crawler extension signals (§4.7).
        ("LOGIN_FORM_DETECTED", 15),
        ("PASSWORD_FIELD_DETECTED", 10),
        ("CREDIT_CARD_FORM", 25),
        ("SUSPICIOUS_INPUT_FIELDS", 20),
        ("BRAND_CONTENT_DETECTED", 40),
        ("PHISHING_PHRASES_DETECTED", 20),
        ("FORM_SUBMITS_EXTERNALLY", 35),
        ("EXCESSIVE_IFRAMES", 10),
        ("HIDDEN_INPUTS_DETECTED", 10),
        ("SSL_CERTIFICATE_ERROR", 35),
        ("REDIRECT_CROSSED_DOMAIN", 30),
    ]
    .into_iter()
    .map(|(id, w)| (id.to_string(), w))
    .collect()
}

/// The on-disk weights artifact (§6.3): `{version, calibration_date,
/// dataset_size, metrics, weights}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightsArtifact {
    pub version: String,
    pub calibration_date: String,
    pub dataset_size: u64,
    pub metrics: serde_json::Value,
    pub weights: HashMap<String, i64>,
}

/// Resolved, in-memory weights table. Every id the heuristic predictor
/// may emit is guaranteed to have an entry (§3 invariant).
#[derive(Debug, Clone)]
pub struct WeightsTable {
    weights: HashMap<String, i64>,
}

impl Default for WeightsTable {
    fn default() -> Self {
        Self {
            weights: default_weights(),
        }
    }
}

impl WeightsTable {
    /// Build a table from a loaded artifact, falling back to defaults
    /// for any id the artifact's `weights` map omits.
    pub fn from_artifact(artifact: &WeightsArtifact) -> Self {
        let mut weights = default_weights();
        for (id, value) in &artifact.weights {
            weights.insert(id.clone(), *value);
        }
        Self { weights }
    }

    /// The weight for `id`. Every signal id the heuristic predictor may
    /// emit is present by construction; panics only indicate a typo in
    /// our own rule table, not bad input.
    pub fn get(&self, id: &str) -> i64 {
        *self
            .weights
            .get(id)
            .unwrap_or_else(|| panic!("unknown signal id `{id}` has no weights-table entry"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_covers_every_base_rule_id() {
        let table = WeightsTable::default();
        for id in [
            "IP_AS_HOST",
            "NO_HTTPS",
            "BRAND_IMPERSONATION",
            "DOMAIN_IN_TRANCO",
            "VIRUSTOTAL_MALICIOUS_CRITICAL",
        ] {
            assert_ne!(table.get(id), 0, "{id} should have a nonzero default");
        }
    }

    #[test]
    fn artifact_override_wins_missing_keys_fall_back() {
        let mut overrides = HashMap::new();
        overrides.insert("IP_AS_HOST".to_string(), 50);
        let artifact = WeightsArtifact {
            version: "test".to_string(),
            calibration_date: "2026-01-01".to_string(),
            dataset_size: 100,
            metrics: serde_json::json!({}),
            weights: overrides,
        };
        let table = WeightsTable::from_artifact(&artifact);
        assert_eq!(table.get("IP_AS_HOST"), 50);
        assert_eq!(table.get("NO_HTTPS"), 34);
    }
}
