//! Shared application state handed to every handler (§6.1).

use alerta_core::{Engine, Mode};
use std::sync::{Arc, RwLock};

/// One `Engine` per process, plus the server-wide default `mode` that
/// `GET /settings` reports and `POST /settings/mode` updates. A request
/// that names its own `mode` overrides this default for that one call;
/// it never mutates it.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub default_mode: Arc<RwLock<Mode>>,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        Self::new_shared(Arc::new(engine))
    }

    /// Used by callers that already hold the engine behind an `Arc` of
    /// their own, e.g. `alerta-cli`'s `serve`, which also hands a clone of
    /// that `Arc` to its SIGHUP reload task.
    pub fn new_shared(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            default_mode: Arc::new(RwLock::new(Mode::default())),
        }
    }
}
