use std::sync::Arc;

use serde::Serialize;

use crate::models::budget::BudgetAllocation;
use crate::models::catalog::{CatalogCategory, RankedCandidate};
use crate::models::trip::{HotelTier, TripRequest};
use crate::services::cohere_service::InferenceBackend;
use crate::services::embedding_index::EmbeddingIndex;

pub const TOP_K_CANDIDATES: usize = 10;
pub const MIN_CANDIDATES: usize = 3;
/// Cost filter slack, as a percentage (115 = a 1.15 factor). Integer cents
/// throughout keeps the caps exact.
pub const COST_SLACK_PERCENT: i64 = 115;

/// Which hard filter had to be dropped to reach a usable pool. Cost is
/// relaxed before location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolRelaxation {
    None,
    CostRelaxed,
    LocationRelaxed,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryMatches {
    pub candidates: Vec<RankedCandidate>,
    pub relaxation: PoolRelaxation,
}

impl CategoryMatches {
    fn empty() -> Self {
        Self { candidates: Vec::new(), relaxation: PoolRelaxation::None }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub flights: CategoryMatches,
    pub hotels: CategoryMatches,
    pub activities: CategoryMatches,
    pub degraded: bool,
}

impl SearchResults {
    /// The flagged outcome for a request the embedding backend could not
    /// serve at all. Consumed by the synthesizer's degraded-day logic; never
    /// an error.
    pub fn empty_degraded() -> Self {
        Self {
            flights: CategoryMatches::empty(),
            hotels: CategoryMatches::empty(),
            activities: CategoryMatches::empty(),
            degraded: true,
        }
    }
}

/// Turns trip preferences into per-category candidate lists via semantic
/// ranking plus hard location/cost filters. "No results" is a valid, flagged
/// outcome, not an error.
pub struct SearchAgent {
    inference: Arc<dyn InferenceBackend>,
    index: Arc<EmbeddingIndex>,
}

impl SearchAgent {
    pub fn new(inference: Arc<dyn InferenceBackend>, index: Arc<EmbeddingIndex>) -> Self {
        Self { inference, index }
    }

    pub async fn search(&self, trip: &TripRequest, allocation: &BudgetAllocation) -> SearchResults {
        let queries = vec![
            self.flight_query(trip),
            self.hotel_query(trip),
            self.activity_query(trip),
        ];

        let vectors = match self.inference.embed(&queries).await {
            Ok(vectors) if vectors.len() == queries.len() => vectors,
            Ok(vectors) => {
                eprintln!(
                    "Expected {} query embeddings, got {}. Returning empty candidate lists",
                    queries.len(),
                    vectors.len()
                );
                return SearchResults::empty_degraded();
            }
            Err(err) => {
                eprintln!("Query embedding failed: {}. Returning empty candidate lists", err);
                return SearchResults::empty_degraded();
            }
        };

        let nights = trip.duration_days().max(1);
        let travelers = trip.travelers as i64;

        let flights = self.filter_category(
            self.index.rank(&vectors[0], CatalogCategory::Flight),
            &trip.destination,
            per_candidate_cap(allocation.flights.amount_cents, travelers),
            None,
        );
        let hotels = self.filter_category(
            self.index.rank(&vectors[1], CatalogCategory::Hotel),
            &trip.destination,
            per_candidate_cap(allocation.accommodation.amount_cents, nights),
            Some(trip.hotel_tier),
        );
        let activities = self.filter_category(
            self.index.rank(&vectors[2], CatalogCategory::Activity),
            &trip.destination,
            per_candidate_cap(allocation.activities.amount_cents, travelers),
            None,
        );

        SearchResults { flights, hotels, activities, degraded: false }
    }

    fn flight_query(&self, trip: &TripRequest) -> String {
        format!(
            "{} flights from {} to {} in {}",
            trip.travel_mode.label(),
            trip.origin,
            trip.destination,
            trip.start_date.format("%B"),
        )
    }

    fn hotel_query(&self, trip: &TripRequest) -> String {
        format!("{} hotels in {}", trip.hotel_tier.label(), trip.destination)
    }

    fn activity_query(&self, trip: &TripRequest) -> String {
        let angle = if trip.visited_before {
            "off the beaten path"
        } else {
            "classic highlights"
        };
        format!(
            "activities in {} for {}, {}",
            trip.destination,
            trip.activities.join(", "),
            angle,
        )
    }

    /// Apply the hard filters, then relax them in order (cost first, then
    /// location) if fewer than the minimum survive. The applied relaxation
    /// is recorded so callers can audit degraded pools. The hotel tier
    /// preference holds through the cost relaxation and is only dropped
    /// together with the location filter.
    fn filter_category(
        &self,
        ranked: Vec<RankedCandidate>,
        destination: &str,
        cost_cap_cents: i64,
        tier: Option<HotelTier>,
    ) -> CategoryMatches {
        let location_ok =
            |candidate: &RankedCandidate| candidate.entry.location.eq_ignore_ascii_case(destination);
        let cost_ok = |candidate: &RankedCandidate| candidate.entry.cost_cents <= cost_cap_cents;
        let tier_ok = |candidate: &RankedCandidate| match tier {
            Some(tier) => {
                let tier_tags: Vec<&String> = candidate
                    .entry
                    .tags
                    .iter()
                    .filter(|tag| {
                        ["budget", "mid-range", "luxury"].contains(&tag.to_lowercase().as_str())
                    })
                    .collect();
                tier_tags.is_empty() || tier_tags.iter().any(|tag| tier.accepts(tag.as_str()))
            }
            None => true,
        };

        let strict: Vec<RankedCandidate> = ranked
            .iter()
            .filter(|c| location_ok(c) && cost_ok(c) && tier_ok(c))
            .take(TOP_K_CANDIDATES)
            .cloned()
            .collect();
        if strict.len() >= MIN_CANDIDATES {
            return CategoryMatches { candidates: strict, relaxation: PoolRelaxation::None };
        }

        let cost_relaxed: Vec<RankedCandidate> = ranked
            .iter()
            .filter(|c| location_ok(c) && tier_ok(c))
            .take(TOP_K_CANDIDATES)
            .cloned()
            .map(|mut candidate| {
                candidate.within_budget = cost_ok(&candidate);
                candidate
            })
            .collect();
        if cost_relaxed.len() >= MIN_CANDIDATES {
            return CategoryMatches {
                candidates: cost_relaxed,
                relaxation: PoolRelaxation::CostRelaxed,
            };
        }

        let location_relaxed: Vec<RankedCandidate> = ranked
            .into_iter()
            .take(TOP_K_CANDIDATES)
            .map(|mut candidate| {
                candidate.within_budget = cost_ok(&candidate);
                candidate
            })
            .collect();
        CategoryMatches {
            candidates: location_relaxed,
            relaxation: PoolRelaxation::LocationRelaxed,
        }
    }
}

/// Budget cap applied to a single candidate: the category amount with slack,
/// split across the relevant divisor (travelers for per-person costs,
/// nights for per-night costs).
fn per_candidate_cap(amount_cents: i64, divisor: i64) -> i64 {
    amount_cents * COST_SLACK_PERCENT / 100 / divisor.max(1)
}
