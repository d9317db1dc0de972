//! # fq-api
//!
//! The web routing and orchestration layer for Fabriq.

pub mod error;
pub mod handlers;
pub mod middleware;

use actix_web::web;

/// Configures the JSON API routes.
///
/// # Developer Note
/// We use a scoped configuration so the main binary could mount the API
/// under a different prefix if needed.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/categories", web::get().to(handlers::list_categories))
            // Wardrobe CRUD
            .route("/clothing", web::get().to(handlers::list_items))
            .route("/clothing", web::post().to(handlers::create_item))
            .route("/clothing/{id}", web::get().to(handlers::get_item))
            .route("/clothing/{id}", web::put().to(handlers::update_item))
            .route("/clothing/{id}", web::delete().to(handlers::delete_item))
            // Outfit CRUD
            .route("/outfits", web::get().to(handlers::list_outfits))
            .route("/outfits", web::post().to(handlers::create_outfit))
            .route("/outfits/{id}", web::get().to(handlers::get_outfit))
            .route("/outfits/{id}", web::put().to(handlers::update_outfit))
            .route("/outfits/{id}", web::delete().to(handlers::delete_outfit))
            // AI recommendation
            .route("/recommend", web::post().to(handlers::recommend)),
    );
}
