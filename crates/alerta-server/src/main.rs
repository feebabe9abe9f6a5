//! Binary entry point: boots the engine and serves the HTTP surface
//! (§6.1, §6.4, §7 "Fatal" errors).

use alerta_server::config::{engine_config_from_env, require_secret_key, server_config_from_env};
use alerta_server::{build_router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "alerta_server=info,tower_http=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // §7 "Fatal": a deployment with no SECRET_KEY must never serve traffic.
    let _secret_key = require_secret_key();

    let server_config = server_config_from_env();
    let engine_config = engine_config_from_env();

    let engine = match alerta_core::Engine::new(engine_config).await {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("FATAL: engine failed to boot: {e}");
            std::process::exit(1);
        }
    };

    let state = AppState::new(engine);
    let app = build_router(state, &server_config.cors_origins);
    alerta_server::serve(app, &server_config.bind_addr).await;
}
