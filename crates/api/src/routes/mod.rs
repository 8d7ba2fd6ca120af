pub mod devices;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /devices                              list
/// /devices/{name}/alerts                recent alert records (?limit)
/// /devices/{name}/summary               VOC summary (?hours)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/devices", devices::router())
}

/// `GET /ws/alerts`, mounted at root level next to `/health`.
pub fn alerts_socket() -> Router<AppState> {
    Router::new().route("/ws/alerts", get(ws::ws_handler))
}
