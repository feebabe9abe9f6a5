//! C4: ML Predictor.
//!
//! Loads a verified supervised model (a standardizer + logistic
//! classifier, serialized as plain JSON rather than a pickled/`joblib`
//! blob, precisely so the "unsafe deserialization" hazard §9 warns about
//! does not exist in this implementation: JSON carries no executable
//! payload, and the hash check in [`crate::integrity`] still runs first
//! regardless).

use crate::integrity::{self, VerifyResult};
use alerta_features::{FeatureVector, FEATURE_NAMES};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standardizer {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classifier {
    pub weights: Vec<f64>,
    pub intercept: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: String,
    pub feature_names: Vec<String>,
    pub standardizer: Standardizer,
    pub classifier: Classifier,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PredictOutcome {
    Available { probability: f64 },
    Unavailable,
}

/// `p -> score_ml = round(100 * p)` (§4.4).
pub fn score_from_probability(p: f64) -> i64 {
    (100.0 * p).round() as i64
}

/// C4: holds at most one verified, parsed artifact. `None` means the
/// predictor is `Unavailable`; the system keeps serving under the
/// heuristic model (§9, §7).
#[derive(Clone)]
pub struct MLPredictor {
    artifact: Option<ModelArtifact>,
}

impl MLPredictor {
    /// Construct an unconditionally-unavailable predictor (used when no
    /// `MODEL_PATH` is configured).
    pub fn unavailable() -> Self {
        Self { artifact: None }
    }

    /// Load sequence (§4.4): hash-verify, then parse, then validate the
    /// feature-name list against C2's fixed order. Never panics or
    /// returns `Err` — any failure degrades to `Unavailable`.
    pub fn load(bytes: &[u8], authorized_sha256_hex: &str) -> Self {
        match integrity::verify(bytes, authorized_sha256_hex) {
            Ok(VerifyResult::Valid) => {}
            Ok(VerifyResult::Invalid { .. }) => {
                warn!("model artifact hash mismatch; ML predictor unavailable");
                return Self::unavailable();
            }
            Err(reason) => {
                warn!(reason, "model integrity check could not run; ML predictor unavailable");
                return Self::unavailable();
            }
        }

        let artifact: ModelArtifact = match serde_json::from_slice(bytes) {
            Ok(a) => a,
            Err(e) => {
                warn!(error = %e, "model artifact failed to parse; ML predictor unavailable");
                return Self::unavailable();
            }
        };

        if artifact.feature_names != FEATURE_NAMES {
            warn!("model artifact feature-name list disagrees with the extractor; ML predictor unavailable");
            return Self::unavailable();
        }
        if artifact.standardizer.mean.len() != FEATURE_NAMES.len()
            || artifact.standardizer.std.len() != FEATURE_NAMES.len()
            || artifact.classifier.weights.len() != FEATURE_NAMES.len()
        {
            warn!("model artifact parameter vectors have the wrong length; ML predictor unavailable");
            return Self::unavailable();
        }

        Self { artifact: Some(artifact) }
    }

    pub fn is_available(&self) -> bool {
        self.artifact.is_some()
    }

    pub fn predict(&self, features: &FeatureVector) -> PredictOutcome {
        let Some(artifact) = &self.artifact else {
            return PredictOutcome::Unavailable;
        };
        let values = features.to_ordered_values();
        let logit: f64 = values
            .iter()
            .zip(artifact.standardizer.mean.iter())
            .zip(artifact.standardizer.std.iter())
            .zip(artifact.classifier.weights.iter())
            .map(|(((x, mean), std), weight)| {
                let denom = if *std == 0.0 { 1.0 } else { *std };
                ((x - mean) / denom) * weight
            })
            .sum::<f64>()
            + artifact.classifier.intercept;

        let probability = 1.0 / (1.0 + (-logit).exp());
        PredictOutcome::Available { probability }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrity::sha256;
    use alerta_catalog::Catalog;

    fn sample_artifact_bytes(intercept: f64) -> Vec<u8> {
        let artifact = ModelArtifact {
            version: "test-1".to_string(),
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            standardizer: Standardizer {
                mean: vec![0.0; FEATURE_NAMES.len()],
                std: vec![1.0; FEATURE_NAMES.len()],
            },
            classifier: Classifier {
                weights: vec![0.0; FEATURE_NAMES.len()],
                intercept,
            },
        };
        serde_json::to_vec(&artifact).unwrap()
    }

    fn hex_of(bytes: &[u8]) -> String {
        sha256(bytes).iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn hash_mismatch_yields_unavailable() {
        let bytes = sample_artifact_bytes(0.0);
        let predictor = MLPredictor::load(&bytes, &hex_of(b"not-the-right-bytes"));
        assert!(!predictor.is_available());
    }

    #[test]
    fn valid_artifact_loads_and_predicts() {
        let bytes = sample_artifact_bytes(10.0);
        let hex = hex_of(&bytes);
        let predictor = MLPredictor::load(&bytes, &hex);
        assert!(predictor.is_available());

        let catalog = Catalog::default();
        let ctx = alerta_normalize::normalize("https://example.com/").unwrap();
        let features = alerta_features::extract(&ctx, &catalog);
        match predictor.predict(&features) {
            PredictOutcome::Available { probability } => {
                // All weights are zero; logit == intercept == 10 -> p close to 1.
                assert!(probability > 0.99);
            }
            PredictOutcome::Unavailable => panic!("expected Available"),
        }
    }

    #[test]
    fn feature_name_mismatch_yields_unavailable() {
        let mut artifact_json: serde_json::Value =
            serde_json::from_slice(&sample_artifact_bytes(0.0)).unwrap();
        artifact_json["feature_names"] = serde_json::json!(["wrong"]);
        let bytes = serde_json::to_vec(&artifact_json).unwrap();
        let hex = hex_of(&bytes);
        let predictor = MLPredictor::load(&bytes, &hex);
        assert!(!predictor.is_available());
    }

    #[test]
    fn score_from_probability_rounds() {
        assert_eq!(score_from_probability(0.5), 50);
        assert_eq!(score_from_probability(0.994), 99);
        assert_eq!(score_from_probability(0.0), 0);
        assert_eq!(score_from_probability(1.0), 100);
    }
}
