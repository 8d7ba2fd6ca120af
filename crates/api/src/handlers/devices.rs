//! Read-only device history handlers.
//!
//! Devices are registered outside the service; these endpoints only expose
//! what the monitor has recorded for them.

use airwatch_core::device::validate_device_name;
use airwatch_core::error::CoreError;
use airwatch_db::models::alert_record::AlertRecordRow;
use airwatch_db::models::device::Device;
use airwatch_db::models::sample::{SensorSample, VocRange};
use airwatch_db::repositories::{AlertRecordRepo, DeviceRepo, SampleRepo};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Default and maximum page size for `/alerts`.
const DEFAULT_ALERT_LIMIT: i64 = 50;
const MAX_ALERT_LIMIT: i64 = 500;

/// Default summary period and its upper bound (30 days).
const DEFAULT_SUMMARY_HOURS: i64 = 24;
const MAX_SUMMARY_HOURS: i64 = 720;

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub hours: Option<i64>,
}

/// VOC summary for one device over a recent period.
#[derive(Debug, Serialize)]
pub struct DeviceSummary {
    pub device_name: String,
    pub hours: i64,
    pub latest: Option<SensorSample>,
    pub average_voc: Option<f64>,
    pub voc_range: Option<VocRange>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/devices
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Device>>>> {
    let devices = DeviceRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: devices }))
}

/// GET /api/v1/devices/{name}/alerts
///
/// Newest first. `limit` is clamped to `1..=500`.
pub async fn list_alerts(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<AlertsQuery>,
) -> AppResult<Json<DataResponse<Vec<AlertRecordRow>>>> {
    validate_device_name(&name)?;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_ALERT_LIMIT)
        .clamp(1, MAX_ALERT_LIMIT);

    ensure_registered(&state, &name).await?;
    let records = AlertRecordRepo::list_recent(&state.pool, &name, limit).await?;
    Ok(Json(DataResponse { data: records }))
}

/// GET /api/v1/devices/{name}/summary
pub async fn summary(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<SummaryQuery>,
) -> AppResult<Json<DataResponse<DeviceSummary>>> {
    validate_device_name(&name)?;
    let hours = params.hours.unwrap_or(DEFAULT_SUMMARY_HOURS);
    if !(1..=MAX_SUMMARY_HOURS).contains(&hours) {
        return Err(AppError::BadRequest(format!(
            "hours must be between 1 and {MAX_SUMMARY_HOURS}"
        )));
    }

    ensure_registered(&state, &name).await?;
    let since = chrono::Utc::now() - chrono::Duration::hours(hours);

    let latest = SampleRepo::latest(&state.pool, &name).await?;
    let average_voc = SampleRepo::average_voc_since(&state.pool, &name, since).await?;
    let voc_range = SampleRepo::min_max_voc_since(&state.pool, &name, since).await?;

    Ok(Json(DataResponse {
        data: DeviceSummary {
            device_name: name,
            hours,
            latest,
            average_voc,
            voc_range,
        },
    }))
}

async fn ensure_registered(state: &AppState, name: &str) -> AppResult<()> {
    DeviceRepo::find_by_name(&state.pool, name)
        .await?
        .map(|_| ())
        .ok_or_else(|| CoreError::UnknownDevice(name.to_string()).into())
}
