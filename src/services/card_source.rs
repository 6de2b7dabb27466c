// ============================================================================
// SOURCE DU CATALOGUE : API YGOPRODeck
// ============================================================================
//
// Endpoints utilisés (base: CARD_API_BASE_URL):
//   - GET /cardinfo.php               -> { "data": [carte, ...] }
//       ?language=de|fr|it|pt         (anglais si absent)
//       ?fname=<texte>                recherche floue
//       ?name=<nom> | ?id=<id> | ?archetype=<nom>
//   - GET /archetypes.php             -> [{ "archetype_name": ... }]
//   - GET /cardsets.php               -> [{ "set_name", "set_code", "num_of_cards" }]
//
// Points d'attention:
//   - L'API répond 400 quand une recherche ne trouve rien : traité comme vide
//   - card_sets est absent pour les cartes jamais imprimées
//   - Les prix des sets sont des chaînes ("1.23"), parfois vides
//
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::enums::SearchLanguage;

/// Carte telle que renvoyée par le catalogue externe
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogCard {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub card_type: String,
    #[serde(rename = "frameType", default)]
    pub frame_type: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default)]
    pub atk: Option<i32>,
    #[serde(default)]
    pub def: Option<i32>,
    #[serde(default)]
    pub level: Option<i32>,
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default)]
    pub archetype: Option<String>,
    #[serde(default)]
    pub card_sets: Vec<CatalogSet>,
    #[serde(default)]
    pub card_images: Vec<CatalogImage>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogSet {
    pub set_name: String,
    pub set_code: String,
    pub set_rarity: String,
    #[serde(default)]
    pub set_rarity_code: Option<String>,
    #[serde(default)]
    pub set_price: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogImage {
    pub id: i64,
    pub image_url: String,
    #[serde(default)]
    pub image_url_small: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogSetSummary {
    pub set_name: String,
    pub set_code: String,
    #[serde(default)]
    pub num_of_cards: u32,
    #[serde(default)]
    pub tcg_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CardInfoResponse {
    data: Vec<CatalogCard>,
}

#[derive(Debug, Deserialize)]
struct ArchetypeEntry {
    archetype_name: String,
}

/// Source du catalogue complet. Le moteur de synchronisation ne dépend que de ce trait.
#[async_trait]
pub trait CardSource: Send + Sync {
    /// Toutes les cartes dans la langue demandée. Toute erreur réseau est fatale pour l'appelant.
    async fn fetch_catalog(&self, language: SearchLanguage) -> AppResult<Vec<CatalogCard>>;
}

#[derive(Clone)]
pub struct YgoProDeckClient {
    http: reqwest::Client,
    base_url: String,
}

impl YgoProDeckClient {
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("duelvault/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(YgoProDeckClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET /cardinfo.php. `Ok(None)` quand l'API signale qu'aucune carte ne correspond.
    async fn card_info(&self, params: &[(&str, String)]) -> AppResult<Option<Vec<CatalogCard>>> {
        let url = format!("{}/cardinfo.php", self.base_url);
        tracing::debug!(%url, ?params, "Querying card catalog");

        let response = self.http.get(&url).query(params).send().await?;

        match response.status() {
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body: CardInfoResponse = response.json().await?;
                Ok(Some(body.data))
            }
            status => Err(AppError::Upstream(format!("cardinfo.php returned {}", status))),
        }
    }

    /// Recherche floue par nom
    pub async fn search(&self, query: &str) -> AppResult<Vec<CatalogCard>> {
        let cards = self.card_info(&[("fname", query.to_string())]).await?;
        if cards.is_none() {
            tracing::warn!(query, "No cards found for query");
        }
        Ok(cards.unwrap_or_default())
    }

    pub async fn fetch_by_name(&self, name: &str) -> AppResult<Option<CatalogCard>> {
        let cards = self.card_info(&[("name", name.to_string())]).await?;
        Ok(cards.and_then(|cards| cards.into_iter().next()))
    }

    pub async fn fetch_by_konami_id(&self, konami_id: i64) -> AppResult<Option<CatalogCard>> {
        let cards = self.card_info(&[("id", konami_id.to_string())]).await?;
        Ok(cards.and_then(|cards| cards.into_iter().next()))
    }

    pub async fn fetch_by_archetype(&self, archetype: &str) -> AppResult<Vec<CatalogCard>> {
        let cards = self.card_info(&[("archetype", archetype.to_string())]).await?;
        Ok(cards.unwrap_or_default())
    }

    pub async fn archetypes(&self) -> AppResult<Vec<String>> {
        let url = format!("{}/archetypes.php", self.base_url);
        let entries: Vec<ArchetypeEntry> = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(entries.into_iter().map(|e| e.archetype_name).collect())
    }

    pub async fn card_sets(&self) -> AppResult<Vec<CatalogSetSummary>> {
        let url = format!("{}/cardsets.php", self.base_url);
        let sets = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(sets)
    }
}

#[async_trait]
impl CardSource for YgoProDeckClient {
    async fn fetch_catalog(&self, language: SearchLanguage) -> AppResult<Vec<CatalogCard>> {
        tracing::info!(?language, "Fetching all cards from YGOPRODeck API...");

        let params: Vec<(&str, String)> = language
            .api_code()
            .map(|code| vec![("language", code.to_string())])
            .unwrap_or_default();

        let cards = self
            .card_info(&params)
            .await?
            .ok_or_else(|| AppError::Upstream("cardinfo.php rejected the catalog request".to_string()))?;

        tracing::info!(count = cards.len(), ?language, "Fetched cards");
        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn card_json(id: i64, name: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": name,
            "type": "Normal Monster",
            "frameType": "normal",
            "desc": "This legendary dragon is a powerful engine of destruction.",
            "race": "Dragon",
            "atk": 3000,
            "def": 2500,
            "level": 8,
            "attribute": "LIGHT",
            "archetype": "Blue-Eyes",
            "card_sets": [
                { "set_name": "Legend of Blue Eyes White Dragon", "set_code": "LOB-001",
                  "set_rarity": "Ultra Rare", "set_rarity_code": "(UR)", "set_price": "120.50" },
                { "set_name": "Starter Deck: Kaiba", "set_code": "SDK-001",
                  "set_rarity": "Ultra Rare", "set_rarity_code": "(UR)", "set_price": "" }
            ],
            "card_images": [
                { "id": id, "image_url": "https://images.ygoprodeck.com/images/cards/89631139.jpg",
                  "image_url_small": "https://images.ygoprodeck.com/images/cards_small/89631139.jpg" }
            ]
        })
    }

    async fn client_for(server: &MockServer) -> YgoProDeckClient {
        YgoProDeckClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn fetch_catalog_passes_language_and_parses_cards() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cardinfo.php"))
            .and(query_param("language", "de"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [card_json(89631139, "Blauäugiger w. Drache")]
            })))
            .mount(&server)
            .await;

        let cards = client_for(&server).await.fetch_catalog(SearchLanguage::De).await.unwrap();

        assert_eq!(cards.len(), 1);
        let card = &cards[0];
        assert_eq!(card.id, 89631139);
        assert_eq!(card.frame_type, "normal");
        assert_eq!(card.card_sets.len(), 2);
        assert_eq!(card.card_sets[0].set_price.as_deref(), Some("120.50"));
        assert_eq!(card.card_images[0].id, 89631139);
    }

    #[tokio::test]
    async fn fetch_catalog_server_error_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cardinfo.php"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = client_for(&server).await.fetch_catalog(SearchLanguage::En).await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }

    #[tokio::test]
    async fn spell_without_stats_or_sets_parses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cardinfo.php"))
            .and(query_param("id", "55144522"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{
                    "id": 55144522,
                    "name": "Pot of Greed",
                    "type": "Spell Card",
                    "frameType": "spell",
                    "desc": "Draw 2 cards.",
                    "race": "Normal",
                    "card_images": [{ "id": 55144522, "image_url": "https://example.com/pot.jpg" }]
                }]
            })))
            .mount(&server)
            .await;

        let card = client_for(&server)
            .await
            .fetch_by_konami_id(55144522)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(card.atk, None);
        assert!(card.card_sets.is_empty());
        assert_eq!(card.card_images[0].image_url_small, None);
    }

    #[tokio::test]
    async fn search_without_match_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cardinfo.php"))
            .and(query_param("fname", "zzzz"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "No card matching your query was found in the database."
            })))
            .mount(&server)
            .await;

        let cards = client_for(&server).await.search("zzzz").await.unwrap();
        assert!(cards.is_empty());
    }

    #[tokio::test]
    async fn archetypes_are_flattened() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/archetypes.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "archetype_name": "Blue-Eyes" },
                { "archetype_name": "Dark Magician" }
            ])))
            .mount(&server)
            .await;

        let archetypes = client_for(&server).await.archetypes().await.unwrap();
        assert_eq!(archetypes, vec!["Blue-Eyes".to_string(), "Dark Magician".to_string()]);
    }
}
