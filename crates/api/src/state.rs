use std::sync::Arc;

use learnspace_events::ChangeBus;
use learnspace_genai::TextGenerator;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is a pool handle or an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: learnspace_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Realtime WebSocket connections.
    pub ws_manager: Arc<WsManager>,
    /// Change notifications published by mutation handlers.
    pub change_bus: Arc<ChangeBus>,
    /// Generative model behind the edge functions.
    pub generator: Arc<dyn TextGenerator>,
}
