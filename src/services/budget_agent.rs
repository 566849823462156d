use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;

use crate::models::budget::{BudgetAllocation, BudgetCategory, FALLBACK_SAVINGS_TIPS};
use crate::models::trip::TripRequest;
use crate::services::cohere_service::InferenceBackend;

const PERCENT_SUM_TOLERANCE: f32 = 2.0;
const MAX_SAVINGS_TIPS: usize = 5;
/// Nominal comfortable spend per person per day at a mid-range tier,
/// the baseline for the feasibility score.
const NOMINAL_DAILY_SPEND_CENTS: i64 = 15_000;

const FLEXIBLE_DATES_TIP: &str =
    "Your dates are flexible: shifting the trip a few days can unlock cheaper fares";

/// Result of parsing an upstream completion. Untyped data never flows past
/// this point; anything that fails strict validation is carried as
/// `SchemaInvalid` and resolved into the fallback policy.
#[derive(Debug)]
enum ParsedBudget {
    ValidParsed(RawBudgetResponse),
    SchemaInvalid(String),
}

#[derive(Debug, Deserialize)]
struct RawBudgetResponse {
    allocation: RawAllocation,
    #[serde(default)]
    money_saving_tips: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAllocation {
    flights: RawShare,
    accommodation: RawShare,
    activities: RawShare,
    food: RawShare,
    transportation: RawShare,
}

#[derive(Debug, Deserialize)]
struct RawShare {
    percentage: f32,
    #[serde(default)]
    #[allow(dead_code)]
    amount: f64,
    #[serde(default)]
    #[allow(dead_code)]
    notes: String,
}

/// Converts a trip request into a budget split across the five fixed
/// categories. Never fails: schema-invalid or unreachable upstream responses
/// resolve to the default allocation policy with `fallback_used` set.
pub struct BudgetAgent {
    inference: Arc<dyn InferenceBackend>,
}

impl BudgetAgent {
    pub fn new(inference: Arc<dyn InferenceBackend>) -> Self {
        Self { inference }
    }

    pub async fn analyze(&self, trip: &TripRequest) -> BudgetAllocation {
        let mut allocation = match self.inference.complete(&self.build_prompt(trip)).await {
            Ok(text) => match parse_budget_response(&text) {
                ParsedBudget::ValidParsed(raw) => {
                    let shares = [
                        (BudgetCategory::Flights, raw.allocation.flights.percentage),
                        (BudgetCategory::Accommodation, raw.allocation.accommodation.percentage),
                        (BudgetCategory::Activities, raw.allocation.activities.percentage),
                        (BudgetCategory::Food, raw.allocation.food.percentage),
                        (BudgetCategory::Transportation, raw.allocation.transportation.percentage),
                    ];
                    let mut allocation = BudgetAllocation::from_shares(trip.budget_cents, &shares);
                    allocation.savings_tips = raw
                        .money_saving_tips
                        .into_iter()
                        .take(MAX_SAVINGS_TIPS)
                        .collect();
                    if allocation.savings_tips.is_empty() {
                        allocation.savings_tips =
                            FALLBACK_SAVINGS_TIPS.iter().map(|tip| tip.to_string()).collect();
                    }
                    allocation
                }
                ParsedBudget::SchemaInvalid(reason) => {
                    eprintln!("Budget response rejected: {}. Using default policy", reason);
                    fallback_allocation(trip)
                }
            },
            Err(err) => {
                eprintln!("Budget analysis failed: {}. Using default policy", err);
                fallback_allocation(trip)
            }
        };

        if !trip.strict_dates {
            allocation.savings_tips.push(FLEXIBLE_DATES_TIP.to_string());
        }
        allocation.feasibility_score = feasibility_score(trip);
        allocation
    }

    fn build_prompt(&self, trip: &TripRequest) -> String {
        format!(
            "You are an expert travel budget planner. Analyze the following trip and \
             respond with a single JSON object.\n\
             \n\
             Travel details:\n\
             - Total budget: ${:.2}\n\
             - Destination: {}\n\
             - Number of people: {}\n\
             - Trip length: {} days\n\
             - Activities: {}\n\
             - Hotel preference: {}\n\
             - Travel mode: {}\n\
             \n\
             Respond with JSON of this exact shape:\n\
             {{\n\
               \"allocation\": {{\n\
                 \"flights\": {{\"percentage\": 30, \"amount\": 0, \"notes\": \"\"}},\n\
                 \"accommodation\": {{\"percentage\": 35, \"amount\": 0, \"notes\": \"\"}},\n\
                 \"activities\": {{\"percentage\": 15, \"amount\": 0, \"notes\": \"\"}},\n\
                 \"food\": {{\"percentage\": 15, \"amount\": 0, \"notes\": \"\"}},\n\
                 \"transportation\": {{\"percentage\": 5, \"amount\": 0, \"notes\": \"\"}}\n\
               }},\n\
               \"money_saving_tips\": [\"...\"]\n\
             }}\n\
             \n\
             Use exactly those five categories and make the percentages sum to 100.",
            trip.budget_cents as f64 / 100.0,
            trip.destination,
            trip.travelers,
            trip.duration_days(),
            trip.activities.join(", "),
            trip.hotel_tier.label(),
            trip.travel_mode.label(),
        )
    }
}

fn fallback_allocation(trip: &TripRequest) -> BudgetAllocation {
    let mut allocation = BudgetAllocation::fallback(trip.budget_cents);
    allocation.savings_tips = FALLBACK_SAVINGS_TIPS.iter().map(|tip| tip.to_string()).collect();
    allocation
}

/// Extract and strictly validate the JSON object embedded in a completion.
fn parse_budget_response(text: &str) -> ParsedBudget {
    let json_block = Regex::new(r"(?s)\{.*\}")
        .expect("valid regex")
        .find(text)
        .map(|m| m.as_str().to_string());

    let json_block = match json_block {
        Some(block) => block,
        None => return ParsedBudget::SchemaInvalid("no JSON object in response".to_string()),
    };

    let raw: RawBudgetResponse = match serde_json::from_str(&json_block) {
        Ok(raw) => raw,
        Err(err) => return ParsedBudget::SchemaInvalid(format!("schema mismatch: {}", err)),
    };

    let sum = raw.allocation.flights.percentage
        + raw.allocation.accommodation.percentage
        + raw.allocation.activities.percentage
        + raw.allocation.food.percentage
        + raw.allocation.transportation.percentage;
    if (sum - 100.0).abs() > PERCENT_SUM_TOLERANCE {
        return ParsedBudget::SchemaInvalid(format!("percentages sum to {}, expected 100", sum));
    }

    ParsedBudget::ValidParsed(raw)
}

/// 0-1 measure of how comfortably the budget covers the trip, computed from
/// the request alone so a hallucinated upstream score can never leak out.
fn feasibility_score(trip: &TripRequest) -> f32 {
    let duration = trip.duration_days().max(1);
    let per_person_day = trip.budget_cents as f64 / trip.travelers as f64 / duration as f64;
    let target = NOMINAL_DAILY_SPEND_CENTS as f64 * trip.hotel_tier.spend_multiplier();
    let score = (per_person_day / target).clamp(0.0, 1.0);
    (score * 100.0).round() as f32 / 100.0
}
