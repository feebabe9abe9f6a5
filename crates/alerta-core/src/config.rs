//! Per-subsystem configuration structs (§6.4 "Configuration (env)").
//!
//! Grounded on the teacher's `SentinelConfig`/`RegistryConfig`/
//! `MonitorConfig` shape: one top-level struct composed of
//! independently `Default`-able sub-configs, each owned by the
//! collaborator it configures. Values here are plain data — reading
//! them from environment variables is the binary crate's job
//! (`alerta-cli`), not this one's.

use std::path::PathBuf;

/// C4/C12: model artifact location and the hash it must verify against.
/// Both `None` means the ML predictor boots `Unavailable` and the
/// system serves under the heuristic model only (§7 "Internal
/// degradation").
#[derive(Debug, Clone, Default)]
pub struct ModelConfig {
    pub path: Option<PathBuf>,
    pub authorized_sha256: Option<String>,
}

/// Weights-table artifact location (§6.3 "Weights artifact"). Missing
/// keys in a loaded artifact fall back to §4.5's defaults; no path
/// configured means the defaults are used outright.
#[derive(Debug, Clone, Default)]
pub struct WeightsConfig {
    pub path: Option<PathBuf>,
}

/// C6: Tranco client configuration (§6.4 `TRANCO_*`).
#[derive(Debug, Clone)]
pub struct TrancoConfig {
    pub rank_threshold: u32,
    pub api_key: Option<String>,
    pub api_email: Option<String>,
}

impl Default for TrancoConfig {
    fn default() -> Self {
        Self {
            rank_threshold: 100_000,
            api_key: None,
            api_email: None,
        }
    }
}

/// C7: VirusTotal client configuration (§6.4 `VIRUSTOTAL_*`).
#[derive(Debug, Clone)]
pub struct VirusTotalConfig {
    pub api_key: Option<String>,
    pub quota_per_minute: u32,
    /// §4.8 step 7 "uncertainty window" bounds.
    pub uncertainty_min: i64,
    pub uncertainty_max: i64,
    /// `VIRUSTOTAL_THRESHOLD` (§6.4, default 3): retained for operators
    /// who want a single malicious-engine cutoff to alert or filter on
    /// outside this service. The scoring pipeline itself never consults
    /// it — §4.5's four-bucket table (`VIRUSTOTAL_MALICIOUS_LOW/MED/
    /// HIGH/CRITICAL`) already grades every `malicious` count, so no
    /// single pass/fail cutoff has a role to play in `heuristic::
    /// virustotal_signal`.
    pub malicious_threshold: i64,
}

impl Default for VirusTotalConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            quota_per_minute: 4,
            uncertainty_min: 30,
            uncertainty_max: 70,
            malicious_threshold: 3,
        }
    }
}

/// C9: crawler pool sizing and default deadlines (§4.7, §5).
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub max_concurrent: usize,
    pub default_timeout_secs: u64,
    pub default_max_redirects: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            default_timeout_secs: 20,
            default_max_redirects: 10,
        }
    }
}

/// Engine-wide settings with no natural home in a single collaborator
/// (§4.8, §5 "Cancellation", §6.3 persistence selection).
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    /// Request deadline when the crawler is not enabled (§5, default 10s).
    pub default_timeout_secs: u64,
    /// Request deadline when the crawler is enabled (§5, default 30s).
    pub crawler_enabled_timeout_secs: u64,
    /// `DATABASE_URL` (§6.3/§6.4): `Some` selects `SqliteStore`, `None`
    /// falls back to `JsonFileStore` rooted at `json_store_dir`.
    pub database_url: Option<String>,
    pub json_store_dir: PathBuf,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: 10,
            crawler_enabled_timeout_secs: 30,
            database_url: None,
            json_store_dir: PathBuf::from("./data"),
        }
    }
}

/// Top-level engine configuration: one `Default`-backed sub-config per
/// collaborator, composed the way `SentinelConfig` composes
/// `RegistryConfig`/`MonitorConfig`/`CouncilConfig`/`GlobalConfig`.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub model: ModelConfig,
    pub weights: WeightsConfig,
    pub tranco: TrancoConfig,
    pub virustotal: VirusTotalConfig,
    pub crawler: CrawlerConfig,
    pub limiter: alerta_limiter::LimiterConfig,
    pub global: GlobalConfig,
}
