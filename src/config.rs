// ============================================================================
// CONFIGURATION
// ============================================================================
//
// Toute la configuration vient des variables d'environnement (.env chargé par
// dotenv dans main). Les valeurs invalides font échouer le démarrage.
//
// Variables:
//   - DATABASE_URL (obligatoire)
//   - HOST / PORT                       (127.0.0.1 / 8080)
//   - JWT_SECRET / JWT_TTL_HOURS        (défaut non sécurisé / 24)
//   - PASSWORD_HASH_ITERATIONS          (260000)
//   - CARD_API_BASE_URL                 (https://db.ygoprodeck.com/api/v7)
//   - CARD_API_TIMEOUT_SECS             (30)
//   - CATALOG_LOCALE                    (de)
//   - FREE_TIER_LIMIT                   (500)
//   - SYNC_BATCH_SIZE                   (50)
//   - PRINTING_REFRESH_POLICY           (price_only | overwrite)
//   - AUTO_CREATE_SCHEMA                (false)
//
// ============================================================================

use std::env;
use std::time::Duration;

use crate::models::enums::SearchLanguage;

const INSECURE_JWT_SECRET: &str = "default-insecure-key-change-this";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Ce que la synchronisation fait d'une impression déjà connue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintingRefreshPolicy {
    /// Seuls le prix et la date de rafraîchissement sont mis à jour
    PriceOnly,
    /// Nom du set, rareté et code de rareté sont aussi écrasés
    Overwrite,
}

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub catalog_locale: SearchLanguage,
    pub batch_size: usize,
    pub printing_policy: PrintingRefreshPolicy,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            catalog_locale: SearchLanguage::De,
            batch_size: 50,
            printing_policy: PrintingRefreshPolicy::PriceOnly,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub hash_iterations: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub auth: AuthSettings,
    pub card_api_base_url: String,
    pub card_api_timeout: Duration,
    pub free_tier_limit: u64,
    pub sync: SyncSettings,
    pub auto_create_schema: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construit la configuration à partir d'une fonction de lecture (testable sans toucher à l'env)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set, using the default (INSECURE)");
            INSECURE_JWT_SECRET.to_string()
        });

        let catalog_locale = match lookup("CATALOG_LOCALE") {
            Some(value) => SearchLanguage::parse(&value)
                .ok_or(ConfigError::Invalid { key: "CATALOG_LOCALE", value })?,
            None => SearchLanguage::De,
        };

        let printing_policy = match lookup("PRINTING_REFRESH_POLICY").as_deref() {
            None | Some("price_only") => PrintingRefreshPolicy::PriceOnly,
            Some("overwrite") => PrintingRefreshPolicy::Overwrite,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "PRINTING_REFRESH_POLICY",
                    value: other.to_string(),
                });
            }
        };

        let batch_size: usize = parse_or(&lookup, "SYNC_BATCH_SIZE", 50)?;
        if batch_size == 0 {
            return Err(ConfigError::Invalid { key: "SYNC_BATCH_SIZE", value: "0".to_string() });
        }

        Ok(AppConfig {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
            auth: AuthSettings {
                jwt_secret,
                token_ttl_hours: parse_or(&lookup, "JWT_TTL_HOURS", 24)?,
                hash_iterations: parse_or(&lookup, "PASSWORD_HASH_ITERATIONS", 260_000)?,
            },
            card_api_base_url: lookup("CARD_API_BASE_URL")
                .unwrap_or_else(|| "https://db.ygoprodeck.com/api/v7".to_string()),
            card_api_timeout: Duration::from_secs(parse_or(&lookup, "CARD_API_TIMEOUT_SECS", 30)?),
            free_tier_limit: parse_or(&lookup, "FREE_TIER_LIMIT", 500)?,
            sync: SyncSettings {
                catalog_locale,
                batch_size,
                printing_policy,
            },
            auto_create_schema: parse_or(&lookup, "AUTO_CREATE_SCHEMA", false)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
