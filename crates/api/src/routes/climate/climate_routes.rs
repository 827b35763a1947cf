use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};
use utoipa::ToSchema;

use crate::{
    db::{self, year_before, TemperatureObservation, TemperatureStats},
    AppState,
};

/// JSON body returned for failed requests
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub struct ApiError(db::Error);

impl From<db::Error> for ApiError {
    fn from(err: db::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("error answering climate query: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

#[utoipa::path(
    get,
    path = "/api/v1.0/precipitation",
    responses(
        (status = OK, description = "Precipitation by date over the last year of data", body = BTreeMap<String, Option<f64>>),
        (status = INTERNAL_SERVER_ERROR, description = "No measurement data on record or the query failed", body = ErrorResponse)
    ))]
pub async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, Option<f64>>>, ApiError> {
    let latest = state.climate_db.latest_date().await?;
    let year_ago = year_before(latest);
    let readings = state.climate_db.precipitation(year_ago, latest).await?;

    // Duplicate dates across stations collapse to whichever row came last
    let by_date: BTreeMap<String, Option<f64>> = readings
        .into_iter()
        .map(|reading| (reading.date, reading.prcp))
        .collect();

    Ok(Json(by_date))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/stations",
    responses(
        (status = OK, description = "Every station id, duplicate rows included", body = Vec<String>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query stations", body = ErrorResponse)
    ))]
pub async fn stations(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    let stations = state.climate_db.stations().await?;

    Ok(Json(stations))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/tobs",
    responses(
        (status = OK, description = "Last year of temperature readings for the most active station", body = Vec<TemperatureObservation>),
        (status = INTERNAL_SERVER_ERROR, description = "No measurement data on record or the query failed", body = ErrorResponse)
    ))]
pub async fn tobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TemperatureObservation>>, ApiError> {
    let station = state.climate_db.most_active_station().await?;
    let latest = state.climate_db.latest_date().await?;
    let year_ago = year_before(latest);
    let observations = state
        .climate_db
        .temperature_observations(&station, year_ago)
        .await?;

    Ok(Json(observations))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}",
    params(
        ("start" = String, Path, description = "Earliest date to include, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Temperature stats from the start date onward", body = TemperatureStats),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query temperature stats", body = ErrorResponse)
    ))]
pub async fn temperature_stats_start(
    State(state): State<Arc<AppState>>,
    Path(start): Path<String>,
) -> Result<Json<TemperatureStats>, ApiError> {
    let stats = state.climate_db.temperature_stats_from(&start).await?;

    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}/{end}",
    params(
        ("start" = String, Path, description = "Earliest date to include, YYYY-MM-DD"),
        ("end" = String, Path, description = "Latest date to include, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Temperature stats between the start and end dates", body = TemperatureStats),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query temperature stats", body = ErrorResponse)
    ))]
pub async fn temperature_stats_range(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<TemperatureStats>, ApiError> {
    let stats = state
        .climate_db
        .temperature_stats_between(&start, &end)
        .await?;

    Ok(Json(stats))
}
