use std::error::Error;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Plane,
    Train,
    Car,
    Bus,
}

impl TravelMode {
    pub fn label(&self) -> &'static str {
        match self {
            TravelMode::Plane => "plane",
            TravelMode::Train => "train",
            TravelMode::Car => "car",
            TravelMode::Bus => "bus",
        }
    }

    /// Parse a form value, defaulting to plane for unrecognized modes.
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "train" => TravelMode::Train,
            "car" => TravelMode::Car,
            "bus" => TravelMode::Bus,
            _ => TravelMode::Plane,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HotelTier {
    Budget,
    MidRange,
    Luxury,
}

impl HotelTier {
    pub fn label(&self) -> &'static str {
        match self {
            HotelTier::Budget => "budget",
            HotelTier::MidRange => "mid-range",
            HotelTier::Luxury => "luxury",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "budget" => HotelTier::Budget,
            "luxury" => HotelTier::Luxury,
            _ => HotelTier::MidRange,
        }
    }

    /// Whether a hotel carrying the given tier tag is acceptable for this
    /// preference. A luxury traveler accepts anything; a budget traveler
    /// only accepts budget properties.
    pub fn accepts(&self, tier_tag: &str) -> bool {
        let tag = tier_tag.to_lowercase();
        match self {
            HotelTier::Budget => tag == "budget",
            HotelTier::MidRange => tag == "budget" || tag == "mid-range",
            HotelTier::Luxury => tag == "budget" || tag == "mid-range" || tag == "luxury",
        }
    }

    /// Multiplier applied to the nominal daily spend when scoring
    /// feasibility.
    pub fn spend_multiplier(&self) -> f64 {
        match self {
            HotelTier::Budget => 0.8,
            HotelTier::MidRange => 1.0,
            HotelTier::Luxury => 1.5,
        }
    }
}

/// A validated trip request. Construct through `TripRequest::validated` so
/// structurally invalid requests never reach the planning pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct TripRequest {
    pub origin: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub strict_dates: bool,
    pub budget_cents: i64,
    pub travelers: u32,
    pub travel_mode: TravelMode,
    pub activities: Vec<String>,
    pub hotel_tier: HotelTier,
    pub visited_before: bool,
}

impl TripRequest {
    pub fn validated(self) -> Result<Self, TripValidationError> {
        if self.origin.trim().is_empty() {
            return Err(TripValidationError::EmptyField("origin"));
        }
        if self.destination.trim().is_empty() {
            return Err(TripValidationError::EmptyField("destination"));
        }
        if self.end_date <= self.start_date {
            return Err(TripValidationError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if self.budget_cents <= 0 {
            return Err(TripValidationError::NonPositiveBudget(self.budget_cents));
        }
        if self.travelers == 0 {
            return Err(TripValidationError::NoTravelers);
        }
        if self.activities.iter().all(|a| a.trim().is_empty()) {
            return Err(TripValidationError::NoActivities);
        }
        Ok(self)
    }

    /// Trip length in days; a one-night stay is one day.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    pub fn budget_per_person_cents(&self) -> i64 {
        self.budget_cents / self.travelers as i64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TripValidationError {
    EmptyField(&'static str),
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    NonPositiveBudget(i64),
    NoTravelers,
    NoActivities,
}

impl fmt::Display for TripValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripValidationError::EmptyField(field) => {
                write!(f, "Invalid request: {} must not be empty", field)
            }
            TripValidationError::InvalidDateRange { start, end } => {
                write!(f, "Invalid request: end date {} must be after start date {}", end, start)
            }
            TripValidationError::NonPositiveBudget(cents) => {
                write!(f, "Invalid request: budget must be positive (got {} cents)", cents)
            }
            TripValidationError::NoTravelers => {
                write!(f, "Invalid request: traveler count must be at least 1")
            }
            TripValidationError::NoActivities => {
                write!(f, "Invalid request: at least one activity preference is required")
            }
        }
    }
}

impl Error for TripValidationError {}
