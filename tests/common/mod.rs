use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App};
use async_trait::async_trait;
use chrono::NaiveDate;

use wayfarer_api::db::catalog::CatalogStore;
use wayfarer_api::models::catalog::{CatalogCategory, CatalogEntry};
use wayfarer_api::models::context::{DayWeather, TemperatureRange};
use wayfarer_api::routes;
use wayfarer_api::services::cohere_service::{InferenceBackend, InferenceError};
use wayfarer_api::services::embedding_index::EmbeddingIndex;
use wayfarer_api::services::rate_limit_service::RateLimitService;
use wayfarer_api::services::travel_plan_service::TravelPlanService;
use wayfarer_api::services::weather_service::{ForecastProvider, WeatherError};

const EMBEDDING_DIMS: usize = 16;

const CANNED_BUDGET_RESPONSE: &str = r#"{
  "allocation": {
    "flights": {"percentage": 40, "amount": 0, "notes": "round trip fares"},
    "accommodation": {"percentage": 30, "amount": 0, "notes": "nightly rates"},
    "activities": {"percentage": 20, "amount": 0, "notes": "tours and tickets"},
    "food": {"percentage": 8, "amount": 0, "notes": "meals"},
    "transportation": {"percentage": 2, "amount": 0, "notes": "metro passes"}
  },
  "money_saving_tips": ["Travel midweek", "Buy museum passes in advance"]
}"#;

fn fnv1a(word: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in word.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Deterministic bag-of-words embedding: texts sharing words land in the
/// same buckets and score higher cosine similarity, which is all the
/// retrieval tests need.
pub fn stub_embedding(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; EMBEDDING_DIMS];
    for word in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        vector[(fnv1a(word) % EMBEDDING_DIMS as u64) as usize] += 1.0;
    }
    vector
}

pub struct StubInference {
    pub fail: bool,
}

#[async_trait]
impl InferenceBackend for StubInference {
    async fn complete(&self, prompt: &str) -> Result<String, InferenceError> {
        if self.fail {
            return Err(InferenceError::ResponseError("stub inference down".to_string()));
        }
        if prompt.contains("budget planner") {
            Ok(CANNED_BUDGET_RESPONSE.to_string())
        } else {
            Ok("Title: A Day Well Spent\nMorning culture, afternoon flavors, and an easy evening stroll.".to_string())
        }
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, InferenceError> {
        if self.fail {
            return Err(InferenceError::ResponseError("stub inference down".to_string()));
        }
        Ok(texts.iter().map(|text| stub_embedding(text)).collect())
    }
}

pub struct StubForecast {
    pub fail: bool,
}

#[async_trait]
impl ForecastProvider for StubForecast {
    async fn forecast(
        &self,
        _location: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DayWeather>, WeatherError> {
        if self.fail {
            return Err(WeatherError::ResponseError("stub forecast down".to_string()));
        }
        let mut days = Vec::new();
        let mut date = start;
        while date < end {
            days.push(DayWeather {
                date,
                condition: "sunny".to_string(),
                temperature: TemperatureRange { min_c: 16.0, max_c: 26.0, average_c: 21.0 },
            });
            date = date.succ_opt().unwrap();
        }
        Ok(days)
    }
}

fn entry(
    id: &str,
    category: CatalogCategory,
    title: &str,
    location: &str,
    cost_cents: i64,
    tags: &[&str],
) -> CatalogEntry {
    CatalogEntry {
        id: id.to_string(),
        category,
        title: title.to_string(),
        location: location.to_string(),
        cost_cents,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        embedding: Vec::new(),
    }
}

/// A small in-memory catalog: enough Paris inventory for a clean happy path
/// plus out-of-town entries to exercise the location filter.
pub fn sample_catalog() -> CatalogStore {
    CatalogStore {
        flights: vec![
            entry("FL-1", CatalogCategory::Flight, "Round trip New York to Paris", "Paris", 48_000, &["New York", "direct"]),
            entry("FL-2", CatalogCategory::Flight, "Round trip New York to Paris with layover", "Paris", 45_000, &["New York", "one stop"]),
            entry("FL-3", CatalogCategory::Flight, "Round trip New York to Paris saver fare", "Paris", 50_000, &["New York", "saver"]),
            entry("FL-4", CatalogCategory::Flight, "Round trip New York to London", "London", 61_000, &["New York", "direct"]),
        ],
        hotels: vec![
            entry("HO-1", CatalogCategory::Hotel, "Hotel Lumiere Montmartre", "Paris", 14_000, &["mid-range", "city center"]),
            entry("HO-2", CatalogCategory::Hotel, "Auberge du Canal budget stay", "Paris", 8_000, &["budget", "near metro"]),
            entry("HO-3", CatalogCategory::Hotel, "Rue Cler boutique rooms", "Paris", 12_000, &["mid-range", "quiet street"]),
            entry("HO-4", CatalogCategory::Hotel, "Le Palais Royal grand suites", "Paris", 48_000, &["luxury", "spa"]),
        ],
        // Five food and five culture entries keep both pools at least as
        // large as the five-day test trip, and the narrow cost band means a
        // clean run schedules exactly two activities per day with no repeats
        // or placeholders.
        activities: vec![
            entry("AC-1", CatalogCategory::Activity, "Le Marais food walk with tastings", "Paris", 2_900, &["food", "walking"]),
            entry("AC-2", CatalogCategory::Activity, "Bastille market brunch", "Paris", 2_950, &["food", "market"]),
            entry("AC-3", CatalogCategory::Activity, "Latin Quarter bistro lunch", "Paris", 3_000, &["food", "local"]),
            entry("AC-4", CatalogCategory::Activity, "Wine and cheese tasting", "Paris", 3_050, &["food", "tasting"]),
            entry("AC-5", CatalogCategory::Activity, "Seine picnic with market stop", "Paris", 3_100, &["food", "relaxation"]),
            entry("AC-6", CatalogCategory::Activity, "Notre Dame island walk", "Paris", 2_900, &["culture", "history"]),
            entry("AC-7", CatalogCategory::Activity, "Louvre and Tuileries guided morning", "Paris", 2_950, &["culture", "art"]),
            entry("AC-8", CatalogCategory::Activity, "Montmartre artists quarter walking tour", "Paris", 3_000, &["culture", "walking"]),
            entry("AC-9", CatalogCategory::Activity, "Musee d'Orsay highlights", "Paris", 3_050, &["culture", "art"]),
            entry("AC-10", CatalogCategory::Activity, "Opera Garnier backstage tour", "Paris", 3_100, &["culture", "music"]),
            entry("AC-11", CatalogCategory::Activity, "Borough Market tasting tour", "London", 5_500, &["food", "market"]),
        ],
    }
}

pub struct TestApp {
    pub inference: Arc<dyn InferenceBackend>,
    pub index: Arc<EmbeddingIndex>,
    pub plan_service: Arc<TravelPlanService>,
    pub rate_limiter: Arc<RateLimitService>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(false, false, 5).await
    }

    pub async fn with_failing_inference() -> Self {
        Self::build(true, false, 5).await
    }

    pub async fn with_request_limit(limit: u32) -> Self {
        Self::build(false, false, limit).await
    }

    async fn build(fail_inference: bool, fail_forecast: bool, limit: u32) -> Self {
        let inference: Arc<dyn InferenceBackend> =
            Arc::new(StubInference { fail: fail_inference });
        let forecast: Arc<dyn ForecastProvider> = Arc::new(StubForecast { fail: fail_forecast });

        let mut catalog = sample_catalog();
        catalog.ensure_embeddings(inference.as_ref()).await;
        let index = Arc::new(EmbeddingIndex::build(&catalog));

        let plan_service = Arc::new(TravelPlanService::new(
            inference.clone(),
            forecast,
            index.clone(),
        ));

        Self {
            inference,
            index,
            plan_service,
            rate_limiter: Arc::new(RateLimitService::new(limit)),
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.inference.clone()))
            .app_data(web::Data::new(self.index.clone()))
            .app_data(web::Data::new(self.plan_service.clone()))
            .app_data(web::Data::new(self.rate_limiter.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .route("/health", web::get().to(routes::health::health_check))
            .service(
                web::scope("/api")
                    .route(
                        "/travel-plan",
                        web::post().to(routes::travel_plan::create_travel_plan),
                    )
                    .route("/search", web::get().to(routes::search::semantic_search))
                    .route(
                        "/rate-limit-status",
                        web::get().to(routes::travel_plan::rate_limit_status),
                    ),
            )
    }
}
