//! C10 error taxonomy (§7 "Error Handling Design").
//!
//! Grounded on the teacher's `SentinelError`: plain string variants for
//! this crate's own failures, `#[from]`-composed passthrough variants
//! for collaborators whose errors are allowed to surface. Per §7's
//! propagation policy, only C1 (normalize/safety) and boot-time
//! configuration failures reach this type — C6-C9's failures are caught
//! inside the orchestrator and converted to `Unavailable` before they
//! ever get here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// C1 malformed/out-of-budget input (§4.1, §7 "Input errors" -> 400).
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// C1 SSRF gate rejection (§4.1, §7 "Input errors" -> 400).
    #[error("blocked target: {0}")]
    BlockedTarget(String),

    /// Boot-time persistence configuration failure (§7 "Fatal").
    #[error("storage error: {0}")]
    Storage(#[from] alerta_storage::StorageError),
}

impl From<alerta_normalize::NormalizeError> for EngineError {
    fn from(e: alerta_normalize::NormalizeError) -> Self {
        match e {
            alerta_normalize::NormalizeError::InvalidUrl(msg) => EngineError::InvalidUrl(msg),
            alerta_normalize::NormalizeError::BlockedTarget(msg) => EngineError::BlockedTarget(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
