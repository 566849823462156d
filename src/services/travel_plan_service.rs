use std::sync::Arc;

use serde::Serialize;

use crate::models::budget::BudgetAllocation;
use crate::models::context::ContextInfo;
use crate::models::itinerary::Itinerary;
use crate::models::trip::{TripRequest, TripValidationError};
use crate::services::budget_agent::BudgetAgent;
use crate::services::cohere_service::InferenceBackend;
use crate::services::context_agent::ContextAgent;
use crate::services::embedding_index::EmbeddingIndex;
use crate::services::itinerary_synthesis_service::ItinerarySynthesizer;
use crate::services::search_agent::{SearchAgent, SearchResults};
use crate::services::weather_service::ForecastProvider;

/// Everything produced for one trip request. Owned by the caller and
/// discarded once the response is sent.
#[derive(Debug, Serialize)]
pub struct TravelPlan {
    pub trip: TripRequest,
    pub budget: BudgetAllocation,
    pub search: SearchResults,
    pub context: ContextInfo,
    pub itinerary: Itinerary,
}

/// The pipeline entry point. Validation is the only failure mode; every
/// downstream agent resolves its own failures into flagged fallbacks.
pub struct TravelPlanService {
    budget_agent: BudgetAgent,
    search_agent: SearchAgent,
    context_agent: ContextAgent,
    synthesizer: ItinerarySynthesizer,
}

impl TravelPlanService {
    pub fn new(
        inference: Arc<dyn InferenceBackend>,
        forecast: Arc<dyn ForecastProvider>,
        index: Arc<EmbeddingIndex>,
    ) -> Self {
        Self {
            budget_agent: BudgetAgent::new(inference.clone()),
            search_agent: SearchAgent::new(inference.clone(), index),
            context_agent: ContextAgent::new(forecast),
            synthesizer: ItinerarySynthesizer::new(inference),
        }
    }

    pub async fn synthesize(&self, trip: TripRequest) -> Result<TravelPlan, TripValidationError> {
        let trip = trip.validated()?;

        // The three agents are data-independent: retrieval filters against a
        // provisional default-policy allocation rather than waiting for the
        // allocator. The join below is the pipeline's only synchronization
        // point, and because the agent futures are owned here (joined, not
        // spawned), dropping this future cancels all in-flight work.
        let provisional = BudgetAllocation::fallback(trip.budget_cents);

        let (budget, search, context) = tokio::join!(
            self.budget_agent.analyze(&trip),
            self.search_agent.search(&trip, &provisional),
            self.context_agent.travel_context(&trip),
        );

        let itinerary = self.synthesizer.synthesize(&trip, &budget, &search, &context).await;

        Ok(TravelPlan { trip, budget, search, context, itinerary })
    }
}
