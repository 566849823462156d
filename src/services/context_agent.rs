use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};

use crate::models::context::{
    ContextInfo, ContextSource, DayWeather, TemperatureRange, WeatherSummary, CONTEXT_DISCLAIMER,
};
use crate::models::trip::TripRequest;
use crate::services::weather_service::ForecastProvider;

/// Live forecasts only cover the next few days; anything further out uses
/// climate normals.
pub const FORECAST_HORIZON_DAYS: i64 = 5;

const COLD_THRESHOLD_C: f32 = 10.0;
const HOT_THRESHOLD_C: f32 = 25.0;

/// Attaches weather and seasonal context to a trip. Never fails: forecast
/// errors degrade to climate normals, and the disclaimer-only form covers
/// anything the tables cannot.
pub struct ContextAgent {
    forecast: Arc<dyn ForecastProvider>,
}

impl ContextAgent {
    pub fn new(forecast: Arc<dyn ForecastProvider>) -> Self {
        Self { forecast }
    }

    pub async fn travel_context(&self, trip: &TripRequest) -> ContextInfo {
        let today = Utc::now().date_naive();
        let within_horizon = trip.start_date <= today + chrono::Duration::days(FORECAST_HORIZON_DAYS);

        let (daily, source) = if within_horizon {
            match self
                .forecast
                .forecast(&trip.destination, trip.start_date, trip.end_date)
                .await
            {
                Ok(days) if covers_range(&days, trip.start_date, trip.end_date) => {
                    (days, ContextSource::Forecast)
                }
                Ok(_) => (
                    climate_normals(&trip.destination, trip.start_date, trip.end_date),
                    ContextSource::ClimateNormal,
                ),
                Err(err) => {
                    eprintln!("Weather forecast failed: {}. Using climate normals", err);
                    (
                        climate_normals(&trip.destination, trip.start_date, trip.end_date),
                        ContextSource::ClimateNormal,
                    )
                }
            }
        } else {
            (
                climate_normals(&trip.destination, trip.start_date, trip.end_date),
                ContextSource::ClimateNormal,
            )
        };

        if daily.is_empty() {
            return ContextInfo::unavailable();
        }

        let summary = summarize(&daily);
        let packing_suggestions = packing_suggestions(&summary);
        let seasonal_tips = seasonal_tips(&trip.destination, trip.start_date.month());

        ContextInfo {
            source,
            daily,
            summary: Some(summary),
            seasonal_tips,
            packing_suggestions,
            disclaimer: CONTEXT_DISCLAIMER.to_string(),
        }
    }
}

fn covers_range(days: &[DayWeather], start: NaiveDate, end: NaiveDate) -> bool {
    let mut date = start;
    while date < end {
        if !days.iter().any(|day| day.date == date) {
            return false;
        }
        date = date.succ_opt().expect("date overflow");
    }
    true
}

pub fn season_for(month: u32) -> &'static str {
    match month {
        12 | 1 | 2 => "winter",
        3..=5 => "spring",
        6..=8 => "summer",
        _ => "autumn",
    }
}

fn is_peak_season(destination: &str, month: u32) -> bool {
    let destination = destination.to_lowercase();
    if destination.contains("paris") {
        (5..=9).contains(&month)
    } else if destination.contains("tokyo") {
        matches!(month, 3 | 4 | 10 | 11)
    } else if destination.contains("london") {
        matches!(month, 6 | 7 | 8)
    } else {
        matches!(month, 6 | 7 | 8)
    }
}

/// Historical average temperature by destination and season, used whenever a
/// live forecast is out of reach.
fn seasonal_base_temp(destination: &str, month: u32) -> f32 {
    let destination = destination.to_lowercase();
    let season = season_for(month);
    let by_season = |winter: f32, spring: f32, summer: f32, autumn: f32| match season {
        "winter" => winter,
        "spring" => spring,
        "summer" => summer,
        _ => autumn,
    };

    if destination.contains("tokyo") {
        by_season(5.0, 15.0, 25.0, 18.0)
    } else if destination.contains("paris") {
        by_season(3.0, 12.0, 22.0, 14.0)
    } else if destination.contains("new york") {
        by_season(0.0, 12.0, 24.0, 15.0)
    } else if destination.contains("london") {
        by_season(5.0, 10.0, 18.0, 12.0)
    } else {
        by_season(10.0, 15.0, 20.0, 15.0)
    }
}

fn typical_condition(destination: &str, month: u32) -> &'static str {
    let destination = destination.to_lowercase();
    if destination.contains("paris") {
        if matches!(month, 3 | 4 | 9 | 10) {
            "partly cloudy"
        } else {
            "sunny"
        }
    } else if destination.contains("tokyo") {
        if matches!(month, 6 | 7) {
            "rainy"
        } else {
            "sunny"
        }
    } else if destination.contains("london") {
        if matches!(month, 10 | 11 | 12) {
            "rainy"
        } else {
            "cloudy"
        }
    } else {
        "sunny"
    }
}

fn climate_normals(destination: &str, start: NaiveDate, end: NaiveDate) -> Vec<DayWeather> {
    let mut days = Vec::new();
    let mut date = start;
    while date < end {
        let base = seasonal_base_temp(destination, date.month());
        days.push(DayWeather {
            date,
            condition: typical_condition(destination, date.month()).to_string(),
            temperature: TemperatureRange {
                min_c: base - 5.0,
                max_c: base + 5.0,
                average_c: base,
            },
        });
        date = date.succ_opt().expect("date overflow");
    }
    days
}

fn summarize(daily: &[DayWeather]) -> WeatherSummary {
    let average_temperature_c =
        daily.iter().map(|d| d.temperature.average_c).sum::<f32>() / daily.len() as f32;
    let rainy_days = daily.iter().filter(|d| d.is_rain_prone()).count() as u32;

    // Most frequent condition; earliest day wins ties so the result does not
    // depend on map ordering.
    let mut dominant = daily[0].condition.clone();
    let mut dominant_count = 0;
    for day in daily {
        let count = daily.iter().filter(|d| d.condition == day.condition).count();
        if count > dominant_count {
            dominant = day.condition.clone();
            dominant_count = count;
        }
    }

    WeatherSummary {
        average_temperature_c,
        dominant_condition: dominant,
        rainy_days,
    }
}

fn packing_suggestions(summary: &WeatherSummary) -> Vec<String> {
    let mut suggestions = Vec::new();

    if summary.average_temperature_c < COLD_THRESHOLD_C {
        suggestions.push("Pack layers and a warm jacket".to_string());
    } else if summary.average_temperature_c > HOT_THRESHOLD_C {
        suggestions.push("Pack light clothing and sun protection".to_string());
    }
    if summary.rainy_days > 0 {
        suggestions.push("Pack waterproofs and an umbrella".to_string());
    }
    suggestions.push("Comfortable walking shoes".to_string());

    suggestions
}

fn seasonal_tips(destination: &str, month: u32) -> Vec<String> {
    let mut tips = vec![format!(
        "Expect {} conditions in {} during {}",
        season_for(month),
        destination,
        month_name(month),
    )];
    if is_peak_season(destination, month) {
        tips.push("Peak season: expect higher prices and larger crowds".to_string());
    } else {
        tips.push("Off-peak travel: enjoy shorter lines and better deals".to_string());
    }
    tips
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}
