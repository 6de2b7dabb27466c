use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{
    AddToCollectionRequest, CollectionQuery, TopValueQuery, UpdateCollectionItemRequest,
};
use crate::services::collection_service::CollectionService;
use crate::services::valuation_service::ValuationService;

/// POST /api/collection/add - Ajouter une impression (fusionne les quantités si le tuple existe)
#[post("/add")]
pub async fn add_to_collection(
    auth_user: AuthUser,
    body: web::Json<AddToCollectionRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let item = CollectionService::add_to_collection(
        db.get_ref(),
        auth_user.user_id,
        body.into_inner(),
        config.free_tier_limit,
    )
    .await?;

    Ok(HttpResponse::Created().json(item))
}

/// GET /api/collection?portfolio=&condition=&search=&setCode=&sortBy=&sortOrder=&limit=&offset=
#[get("")]
pub async fn get_collection(
    auth_user: AuthUser,
    query: web::Query<CollectionQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    query.validate()?;
    let page = CollectionService::get_collection(db.get_ref(), auth_user.user_id, &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/collection/stats - Valeur totale, profit/perte, répartition par portfolio
#[get("/stats")]
pub async fn get_stats(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let stats = ValuationService::collection_stats(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// GET /api/collection/top-value?limit=10
#[get("/top-value")]
pub async fn get_top_value(
    auth_user: AuthUser,
    query: web::Query<TopValueQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    query.validate()?;
    let limit = query.limit.map(|l| l as usize);
    let items = ValuationService::top_value_items(db.get_ref(), auth_user.user_id, limit).await?;
    Ok(HttpResponse::Ok().json(items))
}

/// GET /api/collection/set-progress/{setCode}
#[get("/set-progress/{set_code}")]
pub async fn get_set_progress(
    auth_user: AuthUser,
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let progress = ValuationService::set_progress(db.get_ref(), auth_user.user_id, &path).await?;
    Ok(HttpResponse::Ok().json(progress))
}

/// GET /api/collection/export - Export JSON complet
#[get("/export")]
pub async fn export_collection(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let rows = ValuationService::export_collection(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[get("/{id}")]
pub async fn get_item(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let item = CollectionService::get_collection_item(db.get_ref(), auth_user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

/// PUT /api/collection/{id} - quantity = 0 supprime l'item
#[put("/{id}")]
pub async fn update_item(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UpdateCollectionItemRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let outcome = CollectionService::update_collection_item(
        db.get_ref(),
        auth_user.user_id,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(outcome))
}

#[delete("/{id}")]
pub async fn remove_item(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let deleted = CollectionService::remove_from_collection(db.get_ref(), auth_user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(deleted))
}

pub fn collection_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/collection")
            .service(add_to_collection)
            .service(get_collection)
            .service(get_stats)
            .service(get_top_value)
            .service(get_set_progress)
            .service(export_collection)
            .service(get_item)
            .service(update_item)
            .service(remove_item)
    );
}
