//! `alerta` CLI — `serve` starts the HTTP surface, `analyze` runs a
//! single URL through the engine and prints its verdict.
//!
//! Grounded on `sentinel-cli/src/main.rs`'s `clap` derive + subcommand +
//! `tracing_subscriber::fmt::init()` shape, extended so both subcommands
//! drive a real `Engine` instead of printing placeholders.

use alerta_core::{AnalyzeOptions, Engine, Mode, ModelChoice};
use alerta_server::config::{engine_config_from_env, require_secret_key, server_config_from_env};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "alerta")]
#[command(about = "ALERTA-LINK: URL risk classification")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP surface (§6.1), reading configuration from the
    /// environment (§6.4).
    Serve,
    /// Analyze a single URL and print its verdict as JSON.
    Analyze {
        url: String,
        #[arg(long, value_enum, default_value_t = CliModel::Ml)]
        model: CliModel,
        #[arg(long, value_enum, default_value_t = CliMode::Auto)]
        mode: CliMode,
        #[arg(long)]
        enable_crawler: bool,
        #[arg(long)]
        timeout_seconds: Option<u64>,
        #[arg(long)]
        max_redirects: Option<u32>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CliModel {
    Ml,
    Heuristic,
}

impl From<CliModel> for ModelChoice {
    fn from(m: CliModel) -> Self {
        match m {
            CliModel::Ml => ModelChoice::Ml,
            CliModel::Heuristic => ModelChoice::Heuristic,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CliMode {
    Auto,
    Online,
    Offline,
}

impl From<CliMode> for Mode {
    fn from(m: CliMode) -> Self {
        match m {
            CliMode::Auto => Mode::Auto,
            CliMode::Online => Mode::Online,
            CliMode::Offline => Mode::Offline,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => serve().await,
        Commands::Analyze { url, model, mode, enable_crawler, timeout_seconds, max_redirects } => {
            analyze_one(url, model.into(), mode.into(), enable_crawler, timeout_seconds, max_redirects).await
        }
    }
}

async fn serve() -> anyhow::Result<()> {
    let _secret_key = require_secret_key();
    let server_config = server_config_from_env();
    let engine_config = engine_config_from_env();

    let engine = std::sync::Arc::new(Engine::new(engine_config).await?);
    spawn_reload_on_sighup(engine.clone());

    let state = alerta_server::AppState::new_shared(engine);
    let app = alerta_server::build_router(state, &server_config.cors_origins);
    alerta_server::serve(app, &server_config.bind_addr).await;
    Ok(())
}

/// §3 "reloadable on a SIGHUP-equivalent signal": each `SIGHUP` re-reads
/// the model and weights artifacts from the paths fixed at boot and
/// swaps them into the running engine, with no restart and no dropped
/// connections.
fn spawn_reload_on_sighup(engine: std::sync::Arc<Engine>) {
    tokio::spawn(async move {
        let mut sighup = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::hangup()) {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGHUP handler; artifact reload disabled");
                return;
            }
        };
        loop {
            sighup.recv().await;
            tracing::info!("SIGHUP received, reloading model and weights artifacts");
            match engine.reload_artifacts().await {
                Ok(()) => tracing::info!("artifact reload complete"),
                Err(e) => tracing::warn!(error = %e, "artifact reload failed"),
            }
        }
    });
}

async fn analyze_one(
    url: String,
    model: ModelChoice,
    mode: Mode,
    enable_crawler: bool,
    timeout_seconds: Option<u64>,
    max_redirects: Option<u32>,
) -> anyhow::Result<()> {
    let engine_config = engine_config_from_env();
    let engine = Engine::new(engine_config).await?;

    let options = AnalyzeOptions {
        model,
        mode,
        enable_crawler,
        timeout_seconds,
        max_redirects,
    };

    let verdict = engine.analyze(&url, &options).await?;
    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(())
}
