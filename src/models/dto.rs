// DTO des requêtes et réponses de l'API (JSON en camelCase)
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::enums::{CardCondition, CardEdition, DeckZone, PortfolioType, SearchLanguage, Tier};

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 3, max = 20))]
    pub username: String,
    #[validate(length(min = 6, max = 100))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub search_language: SearchLanguage,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub tier: Tier,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub tier: Tier,
    pub search_language: SearchLanguage,
    pub created_at: DateTime<Utc>,
    pub collection_items: u64,
    pub decks: u64,
}

// ---------------------------------------------------------------------------
// Listes paginées
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
    pub id: i32,
}

// ---------------------------------------------------------------------------
// Cartes
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize, Validate)]
pub struct SearchCardsQuery {
    pub name: Option<String>,
    pub language: Option<SearchLanguage>,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    pub archetype: Option<String>,
    pub attribute: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CatalogSearchQuery {
    #[validate(length(min = 1))]
    pub q: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CatalogLookupQuery {
    #[validate(length(min = 1))]
    pub name: String,
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddToCollectionRequest {
    pub printing_id: i32,
    pub condition: Option<CardCondition>,
    #[validate(length(min = 2, max = 5))]
    pub language: Option<String>, // EN, DE, FR...
    pub edition: Option<CardEdition>,
    #[validate(range(min = 1, max = 999))]
    pub quantity: Option<i32>,
    #[validate(range(min = 0.0))]
    pub purchase_price: Option<f64>,
    #[validate(length(max = 100))]
    pub storage_location: Option<String>, // ex: "Binder A"
    pub portfolio: Option<PortfolioType>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCollectionItemRequest {
    #[validate(range(min = 0, max = 999))]
    pub quantity: Option<i32>,
    pub condition: Option<CardCondition>,
    pub edition: Option<CardEdition>,
    #[validate(range(min = 0.0))]
    pub purchase_price: Option<f64>,
    #[validate(length(max = 100))]
    pub storage_location: Option<String>,
    pub portfolio: Option<PortfolioType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionSort {
    Name,
    Price,
    #[default]
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CollectionQuery {
    pub portfolio: Option<PortfolioType>,
    pub condition: Option<CardCondition>,
    pub search: Option<String>,
    pub set_code: Option<String>,
    pub sort_by: Option<CollectionSort>,
    pub sort_order: Option<SortOrder>,
    #[validate(range(min = 1, max = 200))]
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TopValueQuery {
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u64>,
}

// ---------------------------------------------------------------------------
// Decks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeckCardInput {
    pub printing_id: i32,
    #[validate(range(min = 1, max = 3))]
    #[serde(default = "default_deck_quantity")]
    pub quantity: i32,
    #[serde(default)]
    pub zone: DeckZone,
}

fn default_deck_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeckRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub format: Option<String>, // TCG, OCG, Master Duel
    pub is_public: Option<bool>,
    #[serde(default)]
    #[validate(nested)]
    pub cards: Vec<DeckCardInput>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeckRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub format: Option<String>,
    pub is_public: Option<bool>,
    /// Remplace toute la liste quand présent
    #[validate(nested)]
    pub cards: Option<Vec<DeckCardInput>>,
}

// ---------------------------------------------------------------------------
// Synchronisation du catalogue
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BatchSyncQuery {
    #[validate(range(min = 1, max = 500))]
    pub batch_size: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_request_defaults_and_validation() {
        let request: AddToCollectionRequest =
            serde_json::from_str(r#"{ "printingId": 7, "quantity": 1000 }"#).unwrap();
        assert_eq!(request.printing_id, 7);
        assert!(request.condition.is_none());
        assert!(request.validate().is_err());

        let request: AddToCollectionRequest = serde_json::from_str(
            r#"{ "printingId": 7, "condition": "MINT", "purchasePrice": 2.5, "portfolio": "TRADES" }"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.portfolio, Some(PortfolioType::Trades));
    }

    #[test]
    fn test_deck_payload_is_typed_and_nested_validated() {
        let request: CreateDeckRequest = serde_json::from_str(
            r#"{ "name": "Kaiba", "cards": [ { "printingId": 1 }, { "printingId": 2, "quantity": 3, "zone": "EXTRA" } ] }"#,
        )
        .unwrap();
        assert_eq!(request.cards[0].quantity, 1);
        assert_eq!(request.cards[0].zone, DeckZone::Main);
        assert_eq!(request.cards[1].zone, DeckZone::Extra);
        assert!(request.validate().is_ok());

        let request: CreateDeckRequest = serde_json::from_str(
            r#"{ "name": "Kaiba", "cards": [ { "printingId": 1, "quantity": 4 } ] }"#,
        )
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_register_validation() {
        let request = RegisterRequest {
            email: "not-an-email".to_string(),
            username: "yu".to_string(),
            password: "123".to_string(),
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_collection_sort_parses_camel_case() {
        let query: CollectionQuery =
            serde_json::from_str(r#"{ "sortBy": "createdAt", "sortOrder": "asc" }"#).unwrap();
        assert_eq!(query.sort_by, Some(CollectionSort::CreatedAt));
        assert_eq!(query.sort_order, Some(SortOrder::Asc));
    }
}
