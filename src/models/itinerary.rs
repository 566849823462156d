use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::models::catalog::RankedCandidate;
use crate::models::context::DayWeather;

pub const PLAN_DISCLAIMER: &str =
    "Wayfarer is a travel planner, not a booking system. All prices and \
     availability are estimates based on current market conditions. Actual \
     costs may vary. Please verify all information and book directly with \
     service providers.";

/// One scheduled entry in a day plan. `cost_cents` is the cost for the whole
/// group, not per person.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledItem {
    pub time_slot: NaiveTime,
    pub candidate: RankedCandidate,
    pub cost_cents: i64,
    pub repeated: bool,
    pub placeholder: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccommodationSelection {
    pub candidate: Option<RankedCandidate>,
    pub nightly_cost_cents: i64,
    pub total_cost_cents: i64,
    pub over_budget: bool,
    pub unavailable: bool,
}

impl AccommodationSelection {
    pub fn unavailable() -> Self {
        Self {
            candidate: None,
            nightly_cost_cents: 0,
            total_cost_cents: 0,
            over_budget: false,
            unavailable: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DayPlan {
    pub day: u32,
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
    pub items: Vec<ScheduledItem>,
    pub estimated_cost_cents: i64,
    pub weather: Option<DayWeather>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CostBreakdown {
    pub flights_cents: i64,
    pub accommodation_cents: i64,
    pub activities_cents: i64,
    pub food_cents: i64,
    pub transportation_cents: i64,
    pub total_cents: i64,
}

/// Machine-readable record of every fallback or placeholder that went into
/// an itinerary, so callers can surface "some recommendations are estimates"
/// instead of a hard failure.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DegradationFlags {
    pub budget_fallback: bool,
    pub retrieval_degraded: bool,
    pub cost_filter_relaxed: Vec<String>,
    pub location_filter_relaxed: Vec<String>,
    pub weather_fallback: bool,
    pub weather_unavailable: bool,
    pub narrative_fallback: bool,
    pub accommodation_over_budget: bool,
    pub accommodation_unavailable: bool,
    pub placeholder_days: u32,
    pub repeated_candidates: u32,
}

impl DegradationFlags {
    pub fn any(&self) -> bool {
        self.budget_fallback
            || self.retrieval_degraded
            || !self.cost_filter_relaxed.is_empty()
            || !self.location_filter_relaxed.is_empty()
            || self.weather_fallback
            || self.weather_unavailable
            || self.narrative_fallback
            || self.accommodation_over_budget
            || self.accommodation_unavailable
            || self.placeholder_days > 0
            || self.repeated_candidates > 0
    }
}

/// The root output object. Owned by the requesting call and discarded after
/// the response is sent; contains no timestamps so identical inputs produce
/// identical output.
#[derive(Debug, Clone, Serialize)]
pub struct Itinerary {
    pub destination: String,
    pub duration_days: u32,
    pub days: Vec<DayPlan>,
    pub accommodation: AccommodationSelection,
    pub total_estimated_cost: CostBreakdown,
    pub degraded: bool,
    pub degradation: DegradationFlags,
    pub disclaimer: String,
}
