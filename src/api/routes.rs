// API route configuration

use crate::api::handlers;
use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check
        .route("/health", web::get().to(handlers::health_check))
        .route("/", web::get().to(handlers::health_check))
        // Search results page data
        .route("/search", web::get().to(handlers::search))
        // Type-ahead for the header search box
        .service(web::scope("/api").route("/quick", web::get().to(handlers::quick_search)));
}
