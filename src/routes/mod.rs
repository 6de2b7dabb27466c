pub mod auth;
pub mod cards;
pub mod catalog;
pub mod collection;
pub mod decks;
pub mod health;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(cards::cards_routes)
            .configure(collection::collection_routes)
            .configure(decks::decks_routes)
            .configure(catalog::catalog_routes)
    );
}
