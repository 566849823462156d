use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::models::trip::{HotelTier, TravelMode, TripRequest};
use crate::services::rate_limit_service::{QuotaDecision, RateLimitService};
use crate::services::travel_plan_service::{TravelPlan, TravelPlanService};

/// Form payload mirroring the frontend's field names.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelPlanForm {
    pub origin: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub strict_dates: bool,
    pub budget: f64,
    pub people: u32,
    #[serde(default)]
    pub travel_mode: Option<String>,
    pub activities: Vec<String>,
    #[serde(default)]
    pub visited_before: bool,
    #[serde(default)]
    pub hotel_preference: Option<String>,
}

#[derive(Debug, Serialize)]
struct TravelPlanResponse {
    success: bool,
    message: &'static str,
    plan_id: uuid::Uuid,
    generated_at: String,
    travel_plan: TravelPlan,
}

/*
    /api/travel-plan
*/
pub async fn create_travel_plan(
    req: HttpRequest,
    service: web::Data<Arc<TravelPlanService>>,
    limiter: web::Data<Arc<RateLimitService>>,
    input: web::Json<TravelPlanForm>,
) -> impl Responder {
    let client_id = client_identity(&req);

    if let QuotaDecision::Denied { reset_date } = limiter.check_quota(&client_id) {
        return HttpResponse::TooManyRequests().json(json!({
            "success": false,
            "error": "Rate limit exceeded",
            "message": "Daily request limit exceeded. Please try again tomorrow.",
            "reset_date": reset_date,
        }));
    }

    let form = input.into_inner();
    let trip = match trip_from_form(form) {
        Ok(trip) => trip,
        Err(message) => {
            return HttpResponse::BadRequest().json(json!({
                "success": false,
                "error": message,
            }));
        }
    };

    println!("Creating travel plan for {} -> {}", trip.origin, trip.destination);

    match service.synthesize(trip).await {
        Ok(plan) => {
            limiter.record_request(&client_id);
            HttpResponse::Ok().json(TravelPlanResponse {
                success: true,
                message: "Travel plan created successfully!",
                plan_id: uuid::Uuid::new_v4(),
                generated_at: chrono::Utc::now().to_rfc3339(),
                travel_plan: plan,
            })
        }
        Err(err) => HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": err.to_string(),
        })),
    }
}

/*
    /api/rate-limit-status
*/
pub async fn rate_limit_status(
    req: HttpRequest,
    limiter: web::Data<Arc<RateLimitService>>,
) -> impl Responder {
    let stats = limiter.stats(&client_identity(&req));
    HttpResponse::Ok().json(stats)
}

fn client_identity(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .split(':')
        .next()
        .unwrap_or("unknown")
        .to_string()
}

fn trip_from_form(form: TravelPlanForm) -> Result<TripRequest, String> {
    let start_date = NaiveDate::parse_from_str(&form.start_date, "%Y-%m-%d")
        .map_err(|_| format!("Invalid start date '{}'", form.start_date))?;
    let end_date = NaiveDate::parse_from_str(&form.end_date, "%Y-%m-%d")
        .map_err(|_| format!("Invalid end date '{}'", form.end_date))?;

    let trip = TripRequest {
        origin: form.origin,
        destination: form.destination,
        start_date,
        end_date,
        strict_dates: form.strict_dates,
        budget_cents: (form.budget * 100.0).round() as i64,
        travelers: form.people,
        travel_mode: TravelMode::parse(form.travel_mode.as_deref().unwrap_or("plane")),
        activities: form.activities,
        hotel_tier: HotelTier::parse(form.hotel_preference.as_deref().unwrap_or("mid-range")),
        visited_before: form.visited_before,
    };

    // Surface structural problems here so the handler can map them to 400
    // without ever invoking the pipeline.
    trip.validated().map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> TravelPlanForm {
        TravelPlanForm {
            origin: "New York".to_string(),
            destination: "Paris".to_string(),
            start_date: "2026-09-01".to_string(),
            end_date: "2026-09-06".to_string(),
            strict_dates: true,
            budget: 3000.0,
            people: 2,
            travel_mode: Some("plane".to_string()),
            activities: vec!["food".to_string()],
            visited_before: false,
            hotel_preference: Some("mid-range".to_string()),
        }
    }

    #[test]
    fn converts_dollars_to_cents() {
        let trip = trip_from_form(form()).unwrap();
        assert_eq!(trip.budget_cents, 300_000);
        assert_eq!(trip.duration_days(), 5);
    }

    #[test]
    fn rejects_malformed_dates() {
        let mut bad = form();
        bad.start_date = "09/01/2026".to_string();
        assert!(trip_from_form(bad).is_err());
    }

    #[test]
    fn rejects_inverted_ranges() {
        let mut bad = form();
        bad.end_date = "2026-08-30".to_string();
        assert!(trip_from_form(bad).is_err());
    }
}
