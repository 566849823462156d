use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const CONTEXT_DISCLAIMER: &str =
    "Weather and seasonal guidance are estimates derived from forecasts or \
     historical climate patterns and may differ from actual conditions.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min_c: f32,
    pub max_c: f32,
    pub average_c: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayWeather {
    pub date: NaiveDate,
    pub condition: String,
    pub temperature: TemperatureRange,
}

impl DayWeather {
    pub fn is_rain_prone(&self) -> bool {
        let condition = self.condition.to_lowercase();
        condition.contains("rain") || condition.contains("drizzle") || condition.contains("storm")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSummary {
    pub average_temperature_c: f32,
    pub dominant_condition: String,
    pub rainy_days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextSource {
    Forecast,
    ClimateNormal,
    Unavailable,
}

/// Seasonal and weather context for a trip, derived per request. The
/// degenerate `unavailable` form carries only the disclaimer and is a valid,
/// non-error outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextInfo {
    pub source: ContextSource,
    pub daily: Vec<DayWeather>,
    pub summary: Option<WeatherSummary>,
    pub seasonal_tips: Vec<String>,
    pub packing_suggestions: Vec<String>,
    pub disclaimer: String,
}

impl ContextInfo {
    pub fn unavailable() -> Self {
        Self {
            source: ContextSource::Unavailable,
            daily: Vec::new(),
            summary: None,
            seasonal_tips: Vec::new(),
            packing_suggestions: Vec::new(),
            disclaimer: CONTEXT_DISCLAIMER.to_string(),
        }
    }

    pub fn snapshot_for(&self, date: NaiveDate) -> Option<&DayWeather> {
        self.daily.iter().find(|day| day.date == date)
    }
}
