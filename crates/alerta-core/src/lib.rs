//! C10: Orchestrator and fusion engine.
//!
//! Drives every other component (C1-C9) and assembles the final
//! [`Verdict`]. Grounded on the teacher's `sentinel-core` crate: the same
//! module split (`config`, `error`, a facade type owning every
//! collaborator) generalized from a tool-call gate to a URL-risk fusion
//! pipeline.

mod config;
mod engine;
mod error;
mod recommendations;
mod verdict;

pub use config::{CrawlerConfig, EngineConfig, GlobalConfig, ModelConfig, TrancoConfig, VirusTotalConfig, WeightsConfig};
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use verdict::{AnalyzeOptions, ApisConsulted, CrawlSection, ModelChoice, Mode, Timestamps, Verdict};
