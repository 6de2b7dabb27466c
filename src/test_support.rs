//! Fixtures partagées par les tests : base SQLite en mémoire et quelques insertions.

use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

use crate::config::{AppConfig, AuthSettings, SyncSettings};
use crate::db;
use crate::models::enums::{SearchLanguage, Tier};
use crate::models::{card, printing, users};

pub async fn setup_db() -> DatabaseConnection {
    // Une seule connexion : chaque connexion SQLite :memory: a sa propre base
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    db::create_schema(&db).await.unwrap();
    db
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        auth: AuthSettings {
            jwt_secret: "test-secret".to_string(),
            token_ttl_hours: 1,
            hash_iterations: 1_000,
        },
        card_api_base_url: "http://127.0.0.1:9".to_string(),
        card_api_timeout: std::time::Duration::from_secs(1),
        free_tier_limit: 500,
        sync: SyncSettings::default(),
        auto_create_schema: false,
    }
}

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

pub async fn insert_user(db: &DatabaseConnection, username: &str, tier: Tier) -> users::Model {
    users::ActiveModel {
        email: Set(format!("{}@example.com", username)),
        username: Set(username.to_string()),
        password_hash: Set("pbkdf2:sha256:1000$c2FsdA$aGFzaA".to_string()),
        tier: Set(tier),
        search_language: Set(SearchLanguage::De),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_card(db: &DatabaseConnection, konami_id: i64, name: &str) -> card::Model {
    card::ActiveModel {
        konami_id: Set(konami_id),
        name: Set(name.to_string()),
        name_en: Set(name.to_string()),
        name_de: Set(name.to_string()),
        card_type: Set("Normal Monster".to_string()),
        frame_type: Set("normal".to_string()),
        description: Set(String::new()),
        race: Set(Some("Dragon".to_string())),
        attack: Set(Some(3000)),
        defense: Set(Some(2500)),
        level: Set(Some(8)),
        attribute: Set(Some("LIGHT".to_string())),
        archetype: Set(None),
        image_url: Set(String::new()),
        image_url_small: Set(None),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_printing(
    db: &DatabaseConnection,
    card_id: i32,
    set_code: &str,
    price: Option<&str>,
) -> printing::Model {
    printing::ActiveModel {
        card_id: Set(card_id),
        set_code: Set(set_code.to_string()),
        set_name: Set("Test Set".to_string()),
        rarity: Set("Common".to_string()),
        rarity_code: Set(Some("(C)".to_string())),
        price: Set(price.map(dec)),
        price_updated_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}
