//! C4 (ML Predictor), C5 (Heuristic Predictor), and C12 (Model Integrity
//! Verifier).
//!
//! Represents spec.md §9's "dynamic dispatch / duck typing" note as a
//! capability rather than a trait object: the orchestrator (`alerta-core`)
//! holds one [`model::MLPredictor`] and calls [`heuristic`]'s free
//! functions directly, since the two predictors' contracts genuinely
//! differ in shape (one returns a probability, the other a score plus a
//! signal list) and forcing them behind one trait would only hide that.

pub mod heuristic;
pub mod integrity;
pub mod model;

pub use heuristic::{tranco_signal, virustotal_signal, whois_signal, VirusTotalOutcome};
pub use model::{score_from_probability, MLPredictor, PredictOutcome};
