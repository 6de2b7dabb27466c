use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde_json::json;
use validator::Validate;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{BatchSyncQuery, CatalogLookupQuery, CatalogSearchQuery};
use crate::services::card_source::YgoProDeckClient;
use crate::services::sync_service::SyncService;

const SEARCH_RESULT_LIMIT: usize = 20;

/// GET /api/catalog/search?q= - Recherche directe sur YGOPRODeck (20 résultats max)
#[get("/search")]
pub async fn search_catalog(
    query: web::Query<CatalogSearchQuery>,
    client: web::Data<YgoProDeckClient>,
) -> Result<HttpResponse, AppError> {
    query.validate()?;
    let cards = client.search(&query.q).await?;
    let count = cards.len();
    let cards: Vec<_> = cards.into_iter().take(SEARCH_RESULT_LIMIT).collect();

    Ok(HttpResponse::Ok().json(json!({ "count": count, "cards": cards })))
}

/// GET /api/catalog/lookup?name= - Carte au nom exact
#[get("/lookup")]
pub async fn lookup_by_name(
    query: web::Query<CatalogLookupQuery>,
    client: web::Data<YgoProDeckClient>,
) -> Result<HttpResponse, AppError> {
    query.validate()?;
    let card = client
        .fetch_by_name(&query.name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Card named {} not found", query.name)))?;
    Ok(HttpResponse::Ok().json(card))
}

#[get("/card/{konami_id}")]
pub async fn lookup_by_konami_id(
    path: web::Path<i64>,
    client: web::Data<YgoProDeckClient>,
) -> Result<HttpResponse, AppError> {
    let konami_id = path.into_inner();
    let card = client
        .fetch_by_konami_id(konami_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Card with Konami ID {} not found", konami_id)))?;
    Ok(HttpResponse::Ok().json(card))
}

#[get("/archetype/{name}")]
pub async fn cards_of_archetype(
    path: web::Path<String>,
    client: web::Data<YgoProDeckClient>,
) -> Result<HttpResponse, AppError> {
    let cards = client.fetch_by_archetype(&path).await?;
    Ok(HttpResponse::Ok().json(json!({ "count": cards.len(), "cards": cards })))
}

#[get("/archetypes")]
pub async fn get_archetypes(client: web::Data<YgoProDeckClient>) -> Result<HttpResponse, AppError> {
    let archetypes = client.archetypes().await?;
    Ok(HttpResponse::Ok().json(json!({ "archetypes": archetypes })))
}

#[get("/sets")]
pub async fn get_card_sets(client: web::Data<YgoProDeckClient>) -> Result<HttpResponse, AppError> {
    let sets = client.card_sets().await?;
    Ok(HttpResponse::Ok().json(json!({ "sets": sets })))
}

/// POST /api/catalog/sync - Synchronisation complète du catalogue (PROTÉGÉ)
#[post("/sync")]
pub async fn sync_catalog(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
    client: web::Data<YgoProDeckClient>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    tracing::info!(user_id = auth_user.user_id, email = %auth_user.email, "Catalog sync requested");
    let report = SyncService::sync_all(db.get_ref(), client.get_ref(), &config.sync).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// POST /api/catalog/sync/batch?batchSize= - Synchronisation par batchs (PROTÉGÉ)
#[post("/sync/batch")]
pub async fn sync_catalog_batch(
    auth_user: AuthUser,
    query: web::Query<BatchSyncQuery>,
    db: web::Data<DatabaseConnection>,
    client: web::Data<YgoProDeckClient>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    query.validate()?;
    let batch_size = query.batch_size.unwrap_or(config.sync.batch_size);
    tracing::info!(user_id = auth_user.user_id, email = %auth_user.email, batch_size, "Batch catalog sync requested");

    let report =
        SyncService::sync_in_batches(db.get_ref(), client.get_ref(), &config.sync, batch_size).await?;
    Ok(HttpResponse::Ok().json(report))
}

pub fn catalog_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/catalog")
            .service(search_catalog)
            .service(lookup_by_name)
            .service(lookup_by_konami_id)
            .service(cards_of_archetype)
            .service(get_archetypes)
            .service(get_card_sets)
            .service(sync_catalog)
            .service(sync_catalog_batch)
    );
}
