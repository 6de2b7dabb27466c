use actix_web::{get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::services::auth_service::AuthService;

/// POST /api/auth/register - Créer un compte (PUBLIC)
#[post("/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let response = AuthService::register(db.get_ref(), body.into_inner(), &config.auth).await?;

    Ok(HttpResponse::Created().json(response))
}

/// POST /api/auth/login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let response = AuthService::login(db.get_ref(), body.into_inner(), &config.auth).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/auth/profile - Profil de l'utilisateur connecté (PROTÉGÉ)
#[get("/profile")]
pub async fn profile(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let profile = AuthService::profile(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// PUT /api/auth/profile - Changer la langue de recherche (PROTÉGÉ)
#[put("/profile")]
pub async fn update_profile(
    auth_user: AuthUser,
    body: web::Json<UpdateProfileRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let updated =
        AuthService::update_search_language(db.get_ref(), auth_user.user_id, body.search_language).await?;
    Ok(HttpResponse::Ok().json(updated))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(profile)
            .service(update_profile)
    );
}
