//! Reads §6.4's environment variables into an [`alerta_core::EngineConfig`]
//! plus this crate's own server-level settings (bind address, CORS, the
//! boot-time `SECRET_KEY` fatal check).
//!
//! `alerta-core::config` documents itself as plain data with no env
//! parsing of its own — that job belongs here, in the binary crate.

use alerta_core::{CrawlerConfig, EngineConfig, GlobalConfig, ModelConfig, TrancoConfig, VirusTotalConfig, WeightsConfig};
use std::env;
use std::path::PathBuf;

/// Server-level settings with no home inside `EngineConfig` (§6.1, §6.4).
pub struct ServerConfig {
    pub bind_addr: String,
    pub cors_origins: Vec<String>,
}

/// §7 "Fatal: configuration missing at boot" — `SECRET_KEY` has no
/// default and its absence must stop the process before it ever binds a
/// socket.
pub fn require_secret_key() -> String {
    env::var("SECRET_KEY").unwrap_or_else(|_| {
        eprintln!("FATAL: SECRET_KEY is not set; refusing to start");
        std::process::exit(1);
    })
}

pub fn server_config_from_env() -> ServerConfig {
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let cors_origins = env::var("CORS_ORIGINS")
        .map(|raw| raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    ServerConfig {
        bind_addr: format!("{host}:{port}"),
        cors_origins,
    }
}

pub fn engine_config_from_env() -> EngineConfig {
    let model = ModelConfig {
        path: env::var("MODEL_PATH").ok().map(PathBuf::from),
        authorized_sha256: env::var("MODEL_SHA256").ok(),
    };

    let weights = WeightsConfig {
        path: env::var("WEIGHTS_PATH").ok().map(PathBuf::from),
    };

    let tranco = TrancoConfig {
        rank_threshold: env_parsed("TRANCO_RANK_THRESHOLD").unwrap_or(100_000),
        api_key: env::var("TRANCO_API_KEY").ok(),
        api_email: env::var("TRANCO_API_EMAIL").ok(),
    };

    let virustotal = VirusTotalConfig {
        api_key: env::var("VIRUSTOTAL_API_KEY").ok(),
        quota_per_minute: env_parsed("VIRUSTOTAL_QUOTA_PER_MINUTE").unwrap_or(4),
        uncertainty_min: env_parsed("VIRUSTOTAL_UNCERTAINTY_MIN").unwrap_or(30),
        uncertainty_max: env_parsed("VIRUSTOTAL_UNCERTAINTY_MAX").unwrap_or(70),
        malicious_threshold: env_parsed("VIRUSTOTAL_THRESHOLD").unwrap_or(3),
    };

    let crawler = CrawlerConfig {
        max_concurrent: env_parsed("CRAWLER_MAX_CONCURRENT").unwrap_or(4),
        default_timeout_secs: env_parsed("CRAWLER_DEFAULT_TIMEOUT_SECS").unwrap_or(20),
        default_max_redirects: env_parsed("CRAWLER_DEFAULT_MAX_REDIRECTS").unwrap_or(10),
    };

    let limiter = alerta_limiter_config_from_env();

    let global = GlobalConfig {
        default_timeout_secs: env_parsed("DEFAULT_TIMEOUT_SECS").unwrap_or(10),
        crawler_enabled_timeout_secs: env_parsed("CRAWLER_ENABLED_TIMEOUT_SECS").unwrap_or(30),
        database_url: env::var("DATABASE_URL").ok(),
        json_store_dir: env::var("JSON_STORE_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("./data")),
    };

    EngineConfig {
        model,
        weights,
        tranco,
        virustotal,
        crawler,
        limiter,
        global,
    }
}

fn alerta_limiter_config_from_env() -> alerta_limiter::LimiterConfig {
    alerta_limiter::LimiterConfig {
        capacity: env_parsed("RATE_LIMIT_CAPACITY").unwrap_or(30),
        refill_per_minute: env_parsed("RATE_LIMIT_REFILL_PER_MINUTE").unwrap_or(30),
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|raw| raw.parse().ok())
}
