use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::ListingSearch;
use crate::models::{ErrorResponse, HealthResponse, Listing, SearchListingsQuery, SearchResponse};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub listings: Arc<Vec<Listing>>,
    pub search: ListingSearch,
    pub default_radius_m: u32,
}

/// Configure all listing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/listings", web::get().to(search_listings));
}

/// Health check endpoint
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        listings: state.listings.len(),
        amenity_cache: state.search.cache().stats(),
    })
}

fn bad_request(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
    })
}

/// Listing search endpoint
///
/// GET /api/listings?west=..&south=..&east=..&north=..
///
/// Optional: `sale_type`, `min_price`, `max_price`, `min_beds`, `min_baths`,
/// `need_parks` + `parks_radius`, and `worship`, `stores`, `gyms`, `sports`
/// (repeatable or comma-separated) each with a `*_radius` in meters.
async fn search_listings(
    state: web::Data<AppState>,
    pairs: web::Query<Vec<(String, String)>>,
) -> impl Responder {
    let query = match SearchListingsQuery::from_pairs(pairs.into_inner()) {
        Ok(query) => query,
        Err(e) => {
            tracing::info!("Rejected listing search: {}", e);
            return bad_request("invalid_query", e.to_string());
        }
    };

    if let Err(errors) = query.validate() {
        tracing::info!("Validation failed for listing search: field_errors={:?}", errors);
        return bad_request("Validation failed", errors.to_string());
    }

    let criteria = query.to_criteria(state.default_radius_m);

    tracing::info!(
        "Searching listings in bbox {:?} (proximity requested: {})",
        criteria.bbox,
        !criteria.proximity.is_empty()
    );

    match state.search.search(&state.listings, &criteria).await {
        Ok(outcome) => HttpResponse::Ok().json(SearchResponse {
            listings: outcome.listings,
            amenities_used: outcome.amenities.as_ref().clone(),
        }),
        Err(e) => {
            tracing::error!("Listing search failed: {}", e);
            HttpResponse::BadGateway().json(ErrorResponse {
                error: "Amenity service unavailable".to_string(),
                message: e.to_string(),
                status_code: 502,
            })
        }
    }
}
