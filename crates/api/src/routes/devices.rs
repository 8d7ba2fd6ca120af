//! Route definitions for the `/devices` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::devices;
use crate::state::AppState;

/// Routes mounted at `/devices`.
///
/// ```text
/// GET    /                      -> list
/// GET    /{name}/alerts         -> list_alerts
/// GET    /{name}/summary        -> summary
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(devices::list))
        .route("/{name}/alerts", get(devices::list_alerts))
        .route("/{name}/summary", get(devices::summary))
}
