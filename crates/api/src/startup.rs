use crate::{
    db::{self, ClimateAccess, ClimateData, Database},
    index_handler, precipitation, routes, stations, temperature_stats_range,
    temperature_stats_start, tobs,
};
use anyhow::anyhow;
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use hyper::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

#[derive(Clone)]
pub struct AppState {
    pub climate_db: Arc<dyn ClimateData>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::climate::climate_routes::precipitation,
        routes::climate::climate_routes::stations,
        routes::climate::climate_routes::tobs,
        routes::climate::climate_routes::temperature_stats_start,
        routes::climate::climate_routes::temperature_stats_range,
    ),
    components(
        schemas(
                db::TemperatureObservation,
                db::TemperatureStats,
                routes::climate::climate_routes::ErrorResponse
            )
    ),
    tags(
        (name = "climate api", description = "a RESTful api serving aggregate views of station precipitation and temperature records")
    )
)]
struct ApiDoc;

pub async fn build_app_state(database: String) -> Result<AppState, anyhow::Error> {
    let db = Database::open(&database)
        .await
        .map_err(|e| anyhow!("error opening SQLite database: {}", e))?;

    db.health_check()
        .await
        .map_err(|e| anyhow!("database failed startup checks: {}", e))?;

    let climate_db = Arc::new(ClimateAccess::new(db.pool().clone()));

    Ok(AppState { climate_db })
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        // UI routes
        .route("/", get(index_handler))
        // API routes
        .route("/api/v1.0/precipitation", get(precipitation))
        .route("/api/v1.0/stations", get(stations))
        .route("/api/v1.0/tobs", get(tobs))
        .route("/api/v1.0/{start}", get(temperature_stats_start))
        .route("/api/v1.0/{start}/{end}", get(temperature_stats_range))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default();
    info!(target: "http_request","new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}
