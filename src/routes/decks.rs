use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{CreateDeckRequest, DeckCardInput, UpdateDeckRequest};
use crate::services::deck_service::DeckService;

#[derive(Debug, Deserialize, Validate)]
pub struct PreviewRequest {
    #[validate(nested)]
    pub cards: Vec<DeckCardInput>,
}

#[post("")]
pub async fn create_deck(
    auth_user: AuthUser,
    body: web::Json<CreateDeckRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let deck = DeckService::create_deck(db.get_ref(), auth_user.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(deck))
}

#[get("")]
pub async fn list_decks(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let decks = DeckService::list_decks(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(decks))
}

/// POST /api/decks/preview - Normalise une liste de cartes sans l'enregistrer
#[post("/preview")]
pub async fn preview_deck(
    _auth_user: AuthUser,
    body: web::Json<PreviewRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    Ok(HttpResponse::Ok().json(DeckService::preview(&body.cards)))
}

#[get("/{id}")]
pub async fn get_deck(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let deck = DeckService::get_deck(db.get_ref(), auth_user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(deck))
}

#[put("/{id}")]
pub async fn update_deck(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UpdateDeckRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let deck = DeckService::update_deck(db.get_ref(), auth_user.user_id, path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(deck))
}

#[delete("/{id}")]
pub async fn delete_deck(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let deleted = DeckService::delete_deck(db.get_ref(), auth_user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(deleted))
}

/// GET /api/decks/{id}/stats - Comptes par zone et avertissements
#[get("/{id}/stats")]
pub async fn deck_stats(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let stats = DeckService::deck_stats(db.get_ref(), auth_user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// GET /api/decks/{id}/ownership - Cartes du deck manquantes dans la collection
#[get("/{id}/ownership")]
pub async fn deck_ownership(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let report = DeckService::validate_ownership(db.get_ref(), auth_user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(report))
}

pub fn decks_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/decks")
            .service(create_deck)
            .service(list_decks)
            .service(preview_deck)
            .service(deck_stats)
            .service(deck_ownership)
            .service(get_deck)
            .service(update_deck)
            .service(delete_deck)
    );
}
