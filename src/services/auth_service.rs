use chrono::Utc;
use sea_orm::*;

use crate::config::AuthSettings;
use crate::error::{AppError, AppResult};
use crate::models::dto::{AuthResponse, LoginRequest, ProfileResponse, RegisterRequest, UserSummary};
use crate::models::enums::{SearchLanguage, Tier};
use crate::models::{collection_item, deck, users};
use crate::utils::{jwt, password};

pub struct AuthService;

impl From<&users::Model> for UserSummary {
    fn from(user: &users::Model) -> Self {
        UserSummary {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            tier: user.tier,
        }
    }
}

impl AuthService {
    /// Crée un compte FREE (langue de recherche DE) et retourne un token
    pub async fn register(
        db: &DatabaseConnection,
        request: RegisterRequest,
        settings: &AuthSettings,
    ) -> AppResult<AuthResponse> {
        let email = request.email.trim().to_lowercase();
        let username = request.username.trim().to_string();

        // 1. Email et username doivent être libres
        let taken = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Email.eq(&email))
                    .add(users::Column::Username.eq(&username)),
            )
            .one(db)
            .await?;

        if let Some(existing) = taken {
            let field = if existing.email == email { "Email" } else { "Username" };
            return Err(AppError::Conflict(format!("{} already exists", field)));
        }

        // 2. Hash du mot de passe
        let password_hash = password::hash_password(&request.password, settings.hash_iterations)?;

        // 3. Création
        let user = users::ActiveModel {
            email: Set(email),
            username: Set(username),
            password_hash: Set(password_hash),
            tier: Set(Tier::Free),
            search_language: Set(SearchLanguage::De),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(user_id = user.id, "User registered");

        // 4. Token
        let access_token = jwt::generate_token(user.id, &user.email, settings)?;
        Ok(AuthResponse { access_token, user: UserSummary::from(&user) })
    }

    pub async fn login(
        db: &DatabaseConnection,
        request: LoginRequest,
        settings: &AuthSettings,
    ) -> AppResult<AuthResponse> {
        let email = request.email.trim().to_lowercase();
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(&email))
            .one(db)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        if !password::verify_password(&request.password, &user.password_hash)? {
            tracing::debug!(user_id = user.id, "Login rejected: wrong password");
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let access_token = jwt::generate_token(user.id, &user.email, settings)?;
        Ok(AuthResponse { access_token, user: UserSummary::from(&user) })
    }

    pub async fn profile(db: &DatabaseConnection, user_id: i32) -> AppResult<ProfileResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("User", user_id))?;

        let collection_items = collection_item::Entity::find()
            .filter(collection_item::Column::UserId.eq(user_id))
            .count(db)
            .await?;
        let decks = deck::Entity::find()
            .filter(deck::Column::UserId.eq(user_id))
            .count(db)
            .await?;

        Ok(ProfileResponse {
            id: user.id,
            email: user.email,
            username: user.username,
            tier: user.tier,
            search_language: user.search_language,
            created_at: user.created_at,
            collection_items,
            decks,
        })
    }

    pub async fn update_search_language(
        db: &DatabaseConnection,
        user_id: i32,
        language: SearchLanguage,
    ) -> AppResult<ProfileResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("User", user_id))?;

        let mut active: users::ActiveModel = user.into();
        active.search_language = Set(language);
        active.update(db).await?;

        Self::profile(db, user_id).await
    }
}
