use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use wayfarer_api::db::catalog::CatalogStore;
use wayfarer_api::routes;
use wayfarer_api::services::cohere_service::{CohereService, InferenceBackend};
use wayfarer_api::services::embedding_index::EmbeddingIndex;
use wayfarer_api::services::rate_limit_service::RateLimitService;
use wayfarer_api::services::travel_plan_service::TravelPlanService;
use wayfarer_api::services::weather_service::{ForecastProvider, OpenWeatherService};

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const DEFAULT_CATALOG_DIR: &str = "data";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);

    let inference: Arc<dyn InferenceBackend> = Arc::new(CohereService::from_env());
    let forecast: Arc<dyn ForecastProvider> = Arc::new(OpenWeatherService::from_env());

    let catalog_dir = std::env::var("CATALOG_DIR").unwrap_or_else(|_| DEFAULT_CATALOG_DIR.to_string());
    let mut catalog = CatalogStore::load(&PathBuf::from(&catalog_dir));
    println!("Catalog loaded from {}: {} entries", catalog_dir, catalog.len());
    catalog.ensure_embeddings(inference.as_ref()).await;

    let index = Arc::new(EmbeddingIndex::build(&catalog));
    let plan_service = Arc::new(TravelPlanService::new(
        inference.clone(),
        forecast.clone(),
        index.clone(),
    ));
    let rate_limiter = Arc::new(RateLimitService::default());

    println!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .app_data(web::Data::new(inference.clone()))
            .app_data(web::Data::new(index.clone()))
            .app_data(web::Data::new(plan_service.clone()))
            .app_data(web::Data::new(rate_limiter.clone()))
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
    })
    .bind((host, port))?
    .run()
    .await
}
