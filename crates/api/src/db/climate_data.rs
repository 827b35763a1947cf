use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::{macros::format_description, Date, Duration};
use utoipa::ToSchema;

pub struct ClimateAccess {
    pool: SqlitePool,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no measurement data on record")]
    NoData,
    #[error("Failed to query sqlite: {0}")]
    Query(#[from] sqlx::Error),
    #[error("Failed to format time string: {0}")]
    TimeFormat(#[from] time::error::Format),
    #[error("Failed to parse time string: {0}")]
    TimeParse(#[from] time::error::Parse),
}

#[async_trait]
pub trait ClimateData: Sync + Send {
    /// Date of the most recent measurement row
    async fn latest_date(&self) -> Result<Date, Error>;
    /// Station with the most measurement rows; ties go to the
    /// lexicographically smallest station id
    async fn most_active_station(&self) -> Result<String, Error>;
    async fn precipitation(
        &self,
        start: Date,
        end: Date,
    ) -> Result<Vec<PrecipitationReading>, Error>;
    async fn stations(&self) -> Result<Vec<String>, Error>;
    /// All temperature readings for a station from `start` onward, no upper bound
    async fn temperature_observations(
        &self,
        station: &str,
        start: Date,
    ) -> Result<Vec<TemperatureObservation>, Error>;
    async fn temperature_stats_from(&self, start: &str) -> Result<TemperatureStats, Error>;
    async fn temperature_stats_between(
        &self,
        start: &str,
        end: &str,
    ) -> Result<TemperatureStats, Error>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrecipitationReading {
    pub date: String,
    pub prcp: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct TemperatureObservation {
    pub date: String,
    pub temperature: f64,
}

/// Aggregate min/avg/max of observed temperatures; all null when no rows match
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub struct TemperatureStats {
    pub tmin: Option<f64>,
    pub tavg: Option<f64>,
    pub tmax: Option<f64>,
}

impl ClimateAccess {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClimateData for ClimateAccess {
    async fn latest_date(&self) -> Result<Date, Error> {
        let row: (Option<String>,) = sqlx::query_as("SELECT MAX(date) FROM measurement")
            .fetch_one(&self.pool)
            .await?;
        let date = row.0.ok_or(Error::NoData)?;
        parse_date(&date)
    }

    async fn most_active_station(&self) -> Result<String, Error> {
        // DESC count with station ASC keeps the winner stable when counts tie
        let row: Option<(String, i64)> = sqlx::query_as(
            "SELECT station, COUNT(station) AS observations FROM measurement
             GROUP BY station ORDER BY observations DESC, station ASC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        row.map(|(station, _)| station).ok_or(Error::NoData)
    }

    async fn precipitation(
        &self,
        start: Date,
        end: Date,
    ) -> Result<Vec<PrecipitationReading>, Error> {
        let rows: Vec<(String, Option<f64>)> =
            sqlx::query_as("SELECT date, prcp FROM measurement WHERE date >= ? AND date <= ?")
                .bind(format_date(start)?)
                .bind(format_date(end)?)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(date, prcp)| PrecipitationReading { date, prcp })
            .collect())
    }

    async fn stations(&self) -> Result<Vec<String>, Error> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT station FROM station")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(station,)| station).collect())
    }

    async fn temperature_observations(
        &self,
        station: &str,
        start: Date,
    ) -> Result<Vec<TemperatureObservation>, Error> {
        // No upper date bound here, the window only clips on the low end
        let rows: Vec<(String, f64)> =
            sqlx::query_as("SELECT date, tobs FROM measurement WHERE station = ? AND date >= ?")
                .bind(station)
                .bind(format_date(start)?)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(date, temperature)| TemperatureObservation { date, temperature })
            .collect())
    }

    async fn temperature_stats_from(&self, start: &str) -> Result<TemperatureStats, Error> {
        let (tmin, tavg, tmax): (Option<f64>, Option<f64>, Option<f64>) = sqlx::query_as(
            "SELECT MIN(tobs), AVG(tobs), MAX(tobs) FROM measurement WHERE date >= ?",
        )
        .bind(start)
        .fetch_one(&self.pool)
        .await?;
        Ok(TemperatureStats { tmin, tavg, tmax })
    }

    async fn temperature_stats_between(
        &self,
        start: &str,
        end: &str,
    ) -> Result<TemperatureStats, Error> {
        let (tmin, tavg, tmax): (Option<f64>, Option<f64>, Option<f64>) = sqlx::query_as(
            "SELECT MIN(tobs), AVG(tobs), MAX(tobs) FROM measurement WHERE date >= ? AND date <= ?",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(TemperatureStats { tmin, tavg, tmax })
    }
}

pub fn parse_date(date: &str) -> Result<Date, Error> {
    let format = format_description!("[year]-[month]-[day]");
    Ok(Date::parse(date, &format)?)
}

pub fn format_date(date: Date) -> Result<String, Error> {
    let format = format_description!("[year]-[month]-[day]");
    Ok(date.format(&format)?)
}

/// Calendar date 365 days earlier
pub fn year_before(date: Date) -> Date {
    date - Duration::days(365)
}
