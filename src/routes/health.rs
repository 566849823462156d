use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use crate::services::embedding_index::EmbeddingIndex;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

pub async fn health_check(index: web::Data<Arc<EmbeddingIndex>>) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let inference_result = check_api_key("COHERE_API_KEY", "Cohere API");
    health
        .services
        .insert("inference".to_string(), inference_result.clone());

    let weather_result = check_api_key("OPENWEATHER_API_KEY", "OpenWeather API");
    health
        .services
        .insert("weather".to_string(), weather_result.clone());

    let catalog_result = check_catalog(&index);
    health
        .services
        .insert("catalog".to_string(), catalog_result.clone());

    // Planning still works without upstream services, it just degrades; an
    // empty catalog is the only thing that leaves nothing to recommend.
    if catalog_result.status != "ok" {
        health.status = "degraded".to_string();
    }

    HttpResponse::Ok().json(health)
}

fn check_api_key(var: &str, label: &str) -> ServiceStatus {
    match env::var(var) {
        Ok(key) => {
            let masked_key = if key.len() > 8 {
                format!("{}***{}", &key[0..4], &key[key.len() - 4..])
            } else {
                "***".to_string()
            };

            ServiceStatus {
                status: "ok".to_string(),
                details: Some(format!("{} key configured ({})", label, masked_key)),
            }
        }
        Err(_) => ServiceStatus {
            status: "error".to_string(),
            details: Some(format!("{} not configured", var)),
        },
    }
}

fn check_catalog(index: &EmbeddingIndex) -> ServiceStatus {
    let total: usize = [
        crate::models::catalog::CatalogCategory::Flight,
        crate::models::catalog::CatalogCategory::Hotel,
        crate::models::catalog::CatalogCategory::Activity,
    ]
    .iter()
    .map(|category| index.pool_size(*category))
    .sum();

    if total == 0 {
        ServiceStatus {
            status: "error".to_string(),
            details: Some("No embedded catalog entries loaded".to_string()),
        }
    } else {
        ServiceStatus {
            status: "ok".to_string(),
            details: Some(format!("{} embedded catalog entries", total)),
        }
    }
}
