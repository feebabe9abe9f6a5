use thiserror::Error;

/// Failures from C1: either the input was not a well-formed, in-budget
/// URL, or it was well-formed but targets an SSRF-hazardous endpoint.
///
/// Both surface as HTTP 400 per spec §4.1/§7; callers should not attempt
/// to distinguish them beyond the message for audit logging.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("blocked target: {0}")]
    BlockedTarget(String),
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
