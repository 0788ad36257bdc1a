// Route exports
pub mod listings;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/healthz", web::get().to(listings::health_check))
        .service(web::scope("/api").configure(listings::configure));
}
