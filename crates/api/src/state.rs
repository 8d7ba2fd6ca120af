use std::sync::Arc;

use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub pool: airwatch_db::DbPool,
    /// Connected `/ws/alerts` clients.
    pub ws_manager: Arc<WsManager>,
}
