use crate::errors::{Error, Result};
use crate::metrics;
use crate::model::{
    Ack, DeviceStatus, Family, GenericInput, Listing, Overview, Reading,
    ReadingFilter, StatusResponse, StatusUpdate, TemperatureInput,
};
use crate::store::TelemetryStore;
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, warn};

#[derive(Clone)]
struct AppState {
    store: Arc<TelemetryStore>,
}

/// Query string shared by the reading list endpoints. Values stay strings so
/// a malformed `limit` becomes a validation error instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    device_id: Option<String>,
    device_type: Option<String>,
    limit: Option<String>,
    group_by_device: Option<String>,
}

impl ListParams {
    fn filter(&self) -> Result<ReadingFilter> {
        let limit = match present(&self.limit) {
            None => None,
            Some(raw) => Some(raw.trim().parse::<i64>().map_err(|_| {
                Error::Validation(format!("limit must be an integer, got {:?}", raw))
            })?),
        };

        Ok(ReadingFilter {
            device_id: present(&self.device_id).map(str::to_string),
            device_type: present(&self.device_type).map(str::to_string),
            limit,
        })
    }

    fn group_by_device(&self) -> bool {
        self.group_by_device.as_deref() == Some("true")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusParams {
    device_id: Option<String>,
}

pub fn create_router(store: Arc<TelemetryStore>) -> Router {
    let state = AppState { store };

    Router::new()
        .route(
            "/api/sensors/temperature",
            get(list_temperature).post(record_temperature),
        )
        .route("/api/sensors", get(list_generic).post(record_generic))
        .route(
            "/api/devices/status",
            get(get_device_status).put(put_device_status),
        )
        .route("/api/devices/overview", get(device_overview))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn record_temperature(
    State(state): State<AppState>,
    body: Bytes,
) -> std::result::Result<Json<Ack<Reading>>, AppError> {
    let input: TemperatureInput = parse_body(&body)?;
    let reading = state.store.record_temperature(input)?;
    Ok(Json(Ack::new("Temperature reading received", reading)))
}

async fn list_temperature(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListParams>, QueryRejection>,
) -> std::result::Result<Json<Listing<Reading>>, AppError> {
    let params = query_params(query)?;
    let readings = if params.group_by_device() {
        state.store.latest_per_device(Family::Temperature)?
    } else {
        state.store.query(Family::Temperature, &params.filter()?)?
    };
    Ok(Json(Listing::new(readings)))
}

async fn record_generic(
    State(state): State<AppState>,
    body: Bytes,
) -> std::result::Result<Json<Ack<Reading>>, AppError> {
    let input: GenericInput = parse_body(&body)?;
    let reading = state.store.record_generic(input)?;
    Ok(Json(Ack::new("Device reading received", reading)))
}

async fn list_generic(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListParams>, QueryRejection>,
) -> std::result::Result<Json<Listing<Reading>>, AppError> {
    let params = query_params(query)?;
    let readings = state.store.query(Family::Generic, &params.filter()?)?;
    Ok(Json(Listing::new(readings)))
}

async fn get_device_status(
    State(state): State<AppState>,
    query: std::result::Result<Query<StatusParams>, QueryRejection>,
) -> std::result::Result<Json<StatusResponse>, AppError> {
    let params = query_params(query)?;
    let response = match present(&params.device_id) {
        Some(device_id) => StatusResponse::Single {
            success: true,
            data: state.store.device_status(device_id)?,
        },
        None => StatusResponse::Report {
            success: true,
            report: state.store.device_statuses()?,
        },
    };
    Ok(Json(response))
}

async fn put_device_status(
    State(state): State<AppState>,
    body: Bytes,
) -> std::result::Result<Json<Ack<DeviceStatus>>, AppError> {
    let update: StatusUpdate = parse_body(&body)?;
    let status = state.store.upsert_device_status(update)?;
    Ok(Json(Ack::new("Device status updated", status)))
}

#[derive(serde::Serialize)]
struct OverviewResponse {
    success: bool,
    #[serde(flatten)]
    overview: Overview,
}

async fn device_overview(
    State(state): State<AppState>,
) -> std::result::Result<Json<OverviewResponse>, AppError> {
    let overview = state.store.device_overview()?;
    Ok(Json(OverviewResponse {
        success: true,
        overview,
    }))
}

async fn healthz(
    State(state): State<AppState>,
) -> std::result::Result<Json<Value>, AppError> {
    Ok(Json(json!({
        "status": "ok",
        "retained": {
            "temperature": state.store.retained(Family::Temperature)?,
            "generic": state.store.retained(Family::Generic)?,
        }
    })))
}

async fn metrics_handler() -> std::result::Result<String, AppError> {
    Ok(metrics::gather_metrics()?)
}

/// Query strings axum cannot deserialize (repeated keys, bad encoding) are
/// client errors rendered like every other failure.
fn query_params<T>(query: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| Error::Validation(rejection.body_text()))
}

/// Unparsable JSON is an internal error. Well-formed JSON with the wrong
/// shape is a validation error.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let value: Value = serde_json::from_slice(body)?;
    serde_json::from_value(value)
        .map_err(|e| Error::Validation(format!("Invalid request body: {}", e)))
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

pub struct AppError(Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status.is_server_error() {
            error!("API error: {}", self.0);
        } else {
            warn!("API request rejected ({}): {}", status.as_u16(), self.0);
        }
        (status, Json(json!({ "error": self.0.client_message() }))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
