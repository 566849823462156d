use std::env;
use std::error::Error;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;

use crate::models::context::{DayWeather, TemperatureRange};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const MAX_RETRIES: usize = 2;
const BACKOFF_BASE_MS: u64 = 400;
const BACKOFF_JITTER_MS: u64 = 200;

#[derive(Debug)]
pub enum WeatherError {
    EnvironmentError(String),
    HttpError(reqwest::Error),
    ResponseError(String),
    Timeout(u64),
}

impl fmt::Display for WeatherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeatherError::EnvironmentError(msg) => write!(f, "Environment error: {}", msg),
            WeatherError::HttpError(err) => write!(f, "HTTP error: {}", err),
            WeatherError::ResponseError(msg) => write!(f, "Response error: {}", msg),
            WeatherError::Timeout(secs) => write!(f, "Request timed out after {}s", secs),
        }
    }
}

impl Error for WeatherError {}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::HttpError(err)
    }
}

/// Boundary to the external weather service. Returns one record per date the
/// provider can cover; the context agent falls back to climate normals when
/// coverage is incomplete or the call fails.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn forecast(
        &self,
        location: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DayWeather>, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct GeocodeEntry {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastSlot>,
}

#[derive(Debug, Deserialize)]
struct ForecastSlot {
    dt: i64,
    main: SlotMain,
    weather: Vec<SlotWeather>,
}

#[derive(Debug, Deserialize)]
struct SlotMain {
    temp: f32,
}

#[derive(Debug, Deserialize)]
struct SlotWeather {
    main: String,
}

#[derive(Clone)]
pub struct OpenWeatherService {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
    max_retries: usize,
}

impl OpenWeatherService {
    pub fn from_env() -> Self {
        let api_key = env::var("OPENWEATHER_API_KEY").ok();
        if api_key.is_none() {
            eprintln!("OPENWEATHER_API_KEY not set; weather context will use climate normals");
        }

        Self {
            client: Client::new(),
            api_key,
            base_url: env::var("OPENWEATHER_BASE_URL")
                .unwrap_or_else(|_| "https://api.openweathermap.org".to_string()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: MAX_RETRIES,
        }
    }

    fn api_key(&self) -> Result<&str, WeatherError> {
        self.api_key.as_deref().ok_or_else(|| {
            WeatherError::EnvironmentError("OPENWEATHER_API_KEY not set".to_string())
        })
    }

    async fn geocode(&self, location: &str) -> Result<(f64, f64), WeatherError> {
        let api_key = self.api_key()?;
        let url = format!("{}/geo/1.0/direct", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", location), ("limit", "1"), ("appid", api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::ResponseError(format!(
                "Geocode request failed with status {}",
                status
            )));
        }

        let entries: Vec<GeocodeEntry> = response.json().await.map_err(|e| {
            WeatherError::ResponseError(format!("Failed to parse geocode response: {}", e))
        })?;

        entries
            .first()
            .map(|entry| (entry.lat, entry.lon))
            .ok_or_else(|| {
                WeatherError::ResponseError(format!("No geocode match for '{}'", location))
            })
    }

    async fn try_forecast(
        &self,
        location: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DayWeather>, WeatherError> {
        let (lat, lon) = self.geocode(location).await?;
        let api_key = self.api_key()?;
        let url = format!("{}/data/2.5/forecast", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("units", "metric".to_string()),
                ("appid", api_key.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::ResponseError(format!(
                "Forecast request failed with status {}",
                status
            )));
        }

        let parsed: ForecastResponse = response.json().await.map_err(|e| {
            WeatherError::ResponseError(format!("Failed to parse forecast response: {}", e))
        })?;

        Ok(aggregate_daily(&parsed.list, start, end))
    }
}

/// Collapse 3-hourly forecast slots into one record per date in the range.
/// Dates without any slot are omitted; the caller decides how to backfill.
fn aggregate_daily(slots: &[ForecastSlot], start: NaiveDate, end: NaiveDate) -> Vec<DayWeather> {
    let mut days = Vec::new();
    let mut date = start;

    while date < end {
        let day_slots: Vec<&ForecastSlot> = slots
            .iter()
            .filter(|slot| {
                DateTime::from_timestamp(slot.dt, 0)
                    .map(|ts| ts.date_naive() == date)
                    .unwrap_or(false)
            })
            .collect();

        if !day_slots.is_empty() {
            let temps: Vec<f32> = day_slots.iter().map(|slot| slot.main.temp).collect();
            let min = temps.iter().cloned().fold(f32::INFINITY, f32::min);
            let max = temps.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            let average = temps.iter().sum::<f32>() / temps.len() as f32;
            let condition = day_slots[0]
                .weather
                .first()
                .map(|w| w.main.to_lowercase())
                .unwrap_or_else(|| "clear".to_string());

            days.push(DayWeather {
                date,
                condition,
                temperature: TemperatureRange { min_c: min, max_c: max, average_c: average },
            });
        }

        date = date.succ_opt().expect("date overflow");
    }

    days
}

#[async_trait]
impl ForecastProvider for OpenWeatherService {
    async fn forecast(
        &self,
        location: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DayWeather>, WeatherError> {
        let mut attempt = 0;
        loop {
            let err = match tokio::time::timeout(
                self.timeout,
                self.try_forecast(location, start, end),
            )
            .await
            {
                Ok(Ok(days)) => return Ok(days),
                Ok(Err(err @ WeatherError::EnvironmentError(_))) => return Err(err),
                Ok(Err(err)) => err,
                Err(_) => WeatherError::Timeout(self.timeout.as_secs()),
            };

            if attempt >= self.max_retries {
                return Err(err);
            }

            let backoff = BACKOFF_BASE_MS * 2u64.pow(attempt as u32)
                + rand::thread_rng().gen_range(0..BACKOFF_JITTER_MS);
            eprintln!(
                "forecast attempt {} failed: {}. Retrying in {}ms",
                attempt + 1,
                err,
                backoff
            );
            tokio::time::sleep(Duration::from_millis(backoff)).await;
            attempt += 1;
        }
    }
}
