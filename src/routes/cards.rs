use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::error::AppError;
use crate::models::dto::SearchCardsQuery;
use crate::services::card_service::CardService;

/// GET /api/cards?name=&language=&type=&archetype=&attribute=&limit=&offset=
#[get("")]
pub async fn search_cards(
    query: web::Query<SearchCardsQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    query.validate()?;
    let page = CardService::search_cards(db.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/cards/stats - Taille du catalogue local
#[get("/stats")]
pub async fn card_stats(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let stats = CardService::catalog_stats(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[get("/konami/{konami_id}")]
pub async fn get_card_by_konami_id(
    path: web::Path<i64>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let card = CardService::get_card_by_konami_id(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(card))
}

#[get("/printing/{set_code}")]
pub async fn get_printing_by_set_code(
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let printing = CardService::get_printing_by_set_code(db.get_ref(), &path).await?;
    Ok(HttpResponse::Ok().json(printing))
}

#[get("/{id}")]
pub async fn get_card(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let card = CardService::get_card(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(card))
}

#[get("/{id}/printings")]
pub async fn get_card_printings(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let printings = CardService::get_card_printings(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(printings))
}

// L'ordre compte : les chemins fixes avant /{id}
pub fn cards_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cards")
            .service(search_cards)
            .service(card_stats)
            .service(get_card_by_konami_id)
            .service(get_printing_by_set_code)
            .service(get_card_printings)
            .service(get_card)
    );
}
