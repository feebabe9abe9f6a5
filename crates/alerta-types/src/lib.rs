//! Core domain types shared across ALERTA-LINK's components — no I/O, no
//! async, mirroring the pack's convention of a dependency-free `*-types`
//! crate sitting beneath everything else.

mod risk_level;
mod signal;
mod weights;

pub use risk_level::RiskLevel;
pub use signal::{order_signals, Severity, Signal};
pub use weights::{default_weights, WeightsArtifact, WeightsTable};
