use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::store::StateStore;
use crate::upstream::JobSource;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Upstream listings. Default: `RemoteOkClient`.
    pub source: Arc<dyn JobSource>,
    /// Saved/applied persistence. Default: `FileStateStore`.
    pub store: Arc<dyn StateStore>,
    /// Held across load-modify-save so concurrent requests in this process don't drop
    /// each other's writes. Does nothing for other processes sharing the file.
    pub state_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: Config, source: Arc<dyn JobSource>, store: Arc<dyn StateStore>) -> Self {
        Self {
            config,
            source,
            store,
            state_lock: Arc::new(Mutex::new(())),
        }
    }
}
