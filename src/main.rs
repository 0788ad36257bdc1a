use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use nearby_listings::config::Settings;
use nearby_listings::core::{ListingSearch, Taxonomy};
use nearby_listings::models::ErrorResponse;
use nearby_listings::routes::{self, listings::AppState};
use nearby_listings::services::{load_listings, AmenityCache, HttpOverpassClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for rejected query strings
#[derive(Debug)]
pub struct QueryError(ErrorResponse);

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.0.error, self.0.message)
    }
}

impl std::error::Error for QueryError {}

impl error::ResponseError for QueryError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(&self.0)
    }
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("Query payload error on {}: {}", req.path(), err);
    QueryError(ErrorResponse {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    })
    .into()
}

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn startup_error<E: std::fmt::Display>(context: &str, err: E) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        // Logging is not configured yet
        eprintln!("Configuration error: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_logging(&settings.logging.level, &settings.logging.format);

    info!("Starting nearby-listings search service...");

    let listings = load_listings(&settings.dataset.path)
        .map_err(|e| startup_error("Failed to load listing dataset", e))?;

    info!("Loaded {} listings from {}", listings.len(), settings.dataset.path);

    let client = HttpOverpassClient::new(
        settings.overpass.url.clone(),
        Duration::from_secs(settings.overpass.timeout_secs),
    )
    .map_err(|e| startup_error("Failed to create Overpass client", e))?;

    info!("Overpass client initialized ({})", settings.overpass.url);

    let cache = AmenityCache::new(
        settings.cache.max_entries,
        Duration::from_secs(settings.cache.ttl_secs),
    );

    info!(
        "Amenity cache initialized ({} entries, TTL: {}s)",
        settings.cache.max_entries, settings.cache.ttl_secs
    );

    let search = ListingSearch::new(Arc::new(Taxonomy::default()), Arc::new(cache), Arc::new(client))
        .with_max_listings(settings.search.max_listings)
        .with_query_timeout_secs(settings.overpass.query_timeout_secs);

    // Build application state
    let app_state = AppState {
        listings: Arc::new(listings),
        search,
        default_radius_m: settings.search.default_radius_m,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
