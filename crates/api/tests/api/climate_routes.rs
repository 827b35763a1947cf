use crate::helpers::{spawn_app, MockClimateAccess};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use climate_api::{
    Error, ErrorResponse, PrecipitationReading, TemperatureObservation, TemperatureStats,
};
use hyper::{header, Method};
use serde_json::{from_slice, json, Value};
use std::sync::Arc;
use time::macros::date;
use tower::ServiceExt;

#[tokio::test]
async fn precipitation_maps_dates_over_the_last_year_of_data() {
    let mut climate_data = MockClimateAccess::new();
    climate_data
        .expect_latest_date()
        .times(1)
        .returning(|| Ok(date!(2017 - 08 - 23)));
    climate_data
        .expect_precipitation()
        .withf(|start, end| *start == date!(2016 - 08 - 23) && *end == date!(2017 - 08 - 23))
        .times(1)
        .returning(|_, _| Ok(mock_precipitation_readings()));

    let test_app = spawn_app(Arc::new(climate_data)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/precipitation")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("application/json"));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = from_slice(&body).unwrap();

    // The later duplicate for 2017-08-23 wins and the keys come back sorted
    assert_eq!(
        payload,
        json!({
            "2017-08-22": 0.15,
            "2017-08-23": null,
        })
    );
}

#[tokio::test]
async fn precipitation_reports_an_empty_dataset_as_a_json_error() {
    let mut climate_data = MockClimateAccess::new();
    climate_data
        .expect_latest_date()
        .times(1)
        .returning(|| Err(Error::NoData));

    let test_app = spawn_app(Arc::new(climate_data)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/precipitation")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let error: ErrorResponse = from_slice(&body).unwrap();
    assert_eq!(error.error, "no measurement data on record");
}

#[tokio::test]
async fn stations_lists_every_row_with_duplicates() {
    let mut climate_data = MockClimateAccess::new();
    climate_data.expect_stations().times(1).returning(|| {
        Ok(vec![
            String::from("USC00519281"),
            String::from("USC00513117"),
            String::from("USC00519281"),
        ])
    });

    let test_app = spawn_app(Arc::new(climate_data)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/stations")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let stations: Vec<String> = from_slice(&body).unwrap();
    assert_eq!(stations, vec!["USC00519281", "USC00513117", "USC00519281"]);
}

#[tokio::test]
async fn tobs_returns_the_last_year_for_the_most_active_station() {
    let mut climate_data = MockClimateAccess::new();
    climate_data
        .expect_most_active_station()
        .times(1)
        .returning(|| Ok(String::from("USC00519281")));
    climate_data
        .expect_latest_date()
        .times(1)
        .returning(|| Ok(date!(2017 - 08 - 23)));
    climate_data
        .expect_temperature_observations()
        .withf(|station, start| station == "USC00519281" && *start == date!(2016 - 08 - 23))
        .times(1)
        .returning(|_, _| Ok(mock_temperature_observations()));

    let test_app = spawn_app(Arc::new(climate_data)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/tobs")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = from_slice(&body).unwrap();
    assert_eq!(
        payload,
        json!([
            { "date": "2017-08-22", "temperature": 78.0 },
            { "date": "2017-08-23", "temperature": 80.0 },
        ])
    );
}

#[tokio::test]
async fn tobs_reports_an_empty_dataset_as_a_json_error() {
    let mut climate_data = MockClimateAccess::new();
    // The station lookup fails first, so the latest date is never queried
    climate_data
        .expect_most_active_station()
        .times(1)
        .returning(|| Err(Error::NoData));

    let test_app = spawn_app(Arc::new(climate_data)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/tobs")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let error: ErrorResponse = from_slice(&body).unwrap();
    assert_eq!(error.error, "no measurement data on record");
}

#[tokio::test]
async fn temperature_stats_pass_the_raw_start_parameter_through() {
    let mut climate_data = MockClimateAccess::new();
    climate_data
        .expect_temperature_stats_from()
        .withf(|start| start == "2017-08-23")
        .times(1)
        .returning(|_| {
            Ok(TemperatureStats {
                tmin: Some(58.0),
                tavg: Some(74.59),
                tmax: Some(87.0),
            })
        });

    let test_app = spawn_app(Arc::new(climate_data)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/2017-08-23")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = from_slice(&body).unwrap();
    assert_eq!(
        payload,
        json!({ "TMIN": 58.0, "TAVG": 74.59, "TMAX": 87.0 })
    );
}

#[tokio::test]
async fn temperature_stats_for_an_inverted_range_are_null() {
    let mut climate_data = MockClimateAccess::new();
    climate_data
        .expect_temperature_stats_between()
        .withf(|start, end| start == "2017-08-23" && end == "2017-01-01")
        .times(1)
        .returning(|_, _| {
            Ok(TemperatureStats {
                tmin: None,
                tavg: None,
                tmax: None,
            })
        });

    let test_app = spawn_app(Arc::new(climate_data)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/2017-08-23/2017-01-01")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = from_slice(&body).unwrap();
    assert_eq!(payload, json!({ "TMIN": null, "TAVG": null, "TMAX": null }));
}

#[tokio::test]
async fn malformed_start_dates_are_not_rejected() {
    let mut climate_data = MockClimateAccess::new();
    climate_data
        .expect_temperature_stats_from()
        .withf(|start| start == "not-a-date")
        .times(1)
        .returning(|_| {
            Ok(TemperatureStats {
                tmin: None,
                tavg: None,
                tmax: None,
            })
        });

    let test_app = spawn_app(Arc::new(climate_data)).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1.0/not-a-date")
        .body(Body::empty())
        .unwrap();

    let response = test_app
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = from_slice(&body).unwrap();
    assert_eq!(payload, json!({ "TMIN": null, "TAVG": null, "TMAX": null }));
}

fn mock_precipitation_readings() -> Vec<PrecipitationReading> {
    vec![
        PrecipitationReading {
            date: String::from("2017-08-22"),
            prcp: Some(0.15),
        },
        PrecipitationReading {
            date: String::from("2017-08-23"),
            prcp: Some(0.05),
        },
        // A second station reporting the same date, the later row wins
        PrecipitationReading {
            date: String::from("2017-08-23"),
            prcp: None,
        },
    ]
}

fn mock_temperature_observations() -> Vec<TemperatureObservation> {
    vec![
        TemperatureObservation {
            date: String::from("2017-08-22"),
            temperature: 78.0,
        },
        TemperatureObservation {
            date: String::from("2017-08-23"),
            temperature: 80.0,
        },
    ]
}
