use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::models::catalog::CatalogCategory;
use crate::services::cohere_service::InferenceBackend;
use crate::services::embedding_index::EmbeddingIndex;

const SEARCH_RESULT_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    #[serde(default)]
    pub category: Option<String>,
}

/*
    /api/search?query=...&category=all|flights|hotels|activities
*/
pub async fn semantic_search(
    params: web::Query<SearchParams>,
    inference: web::Data<Arc<dyn InferenceBackend>>,
    index: web::Data<Arc<EmbeddingIndex>>,
) -> impl Responder {
    let category = params.category.as_deref().unwrap_or("all");

    let queries = vec![params.query.clone()];
    let vector = match inference.embed(&queries).await {
        Ok(mut vectors) => vectors.remove(0),
        Err(err) => {
            eprintln!("Semantic search embedding failed: {}", err);
            return HttpResponse::ServiceUnavailable().json(json!({
                "success": false,
                "error": "Search is temporarily unavailable. Please try again.",
            }));
        }
    };

    let results = match category {
        "flights" => index.rank(&vector, CatalogCategory::Flight),
        "hotels" => index.rank(&vector, CatalogCategory::Hotel),
        "activities" => index.rank(&vector, CatalogCategory::Activity),
        "all" => index.rank_all(&vector, SEARCH_RESULT_LIMIT),
        other => {
            return HttpResponse::BadRequest().json(json!({
                "success": false,
                "error": format!("Unknown category '{}'", other),
            }));
        }
    };

    let results: Vec<_> = results.into_iter().take(SEARCH_RESULT_LIMIT).collect();

    HttpResponse::Ok().json(json!({
        "success": true,
        "query": params.query,
        "category": category,
        "total_results": results.len(),
        "results": results,
    }))
}
