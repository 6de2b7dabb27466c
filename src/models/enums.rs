use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Abonnement de l'utilisateur. Le tier FREE limite la taille de la collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    #[sea_orm(string_value = "FREE")]
    Free,
    #[sea_orm(string_value = "PRO")]
    Pro,
}

/// Langue de recherche préférée, aussi utilisée comme locale du catalogue YGOPRODeck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchLanguage {
    #[sea_orm(string_value = "DE")]
    De,
    #[sea_orm(string_value = "EN")]
    En,
    #[sea_orm(string_value = "FR")]
    Fr,
    #[sea_orm(string_value = "IT")]
    It,
    #[sea_orm(string_value = "PT")]
    Pt,
}

impl SearchLanguage {
    /// Valeur du paramètre `language` de l'API. L'anglais est la langue par défaut de l'API.
    pub fn api_code(self) -> Option<&'static str> {
        match self {
            SearchLanguage::En => None,
            SearchLanguage::De => Some("de"),
            SearchLanguage::Fr => Some("fr"),
            SearchLanguage::It => Some("it"),
            SearchLanguage::Pt => Some("pt"),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "DE" => Some(SearchLanguage::De),
            "EN" => Some(SearchLanguage::En),
            "FR" => Some(SearchLanguage::Fr),
            "IT" => Some(SearchLanguage::It),
            "PT" => Some(SearchLanguage::Pt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardCondition {
    #[sea_orm(string_value = "MINT")]
    Mint,
    #[default]
    #[sea_orm(string_value = "NEAR_MINT")]
    NearMint,
    #[sea_orm(string_value = "EXCELLENT")]
    Excellent,
    #[sea_orm(string_value = "GOOD")]
    Good,
    #[sea_orm(string_value = "LIGHT_PLAYED")]
    LightPlayed,
    #[sea_orm(string_value = "PLAYED")]
    Played,
    #[sea_orm(string_value = "POOR")]
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardEdition {
    #[sea_orm(string_value = "FIRST_EDITION")]
    FirstEdition,
    #[default]
    #[sea_orm(string_value = "UNLIMITED")]
    Unlimited,
    #[sea_orm(string_value = "LIMITED")]
    Limited,
}

/// Portfolio d'un item : collection active, classeur d'échange ou vrac
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortfolioType {
    #[default]
    #[sea_orm(string_value = "COLLECTION")]
    Collection,
    #[sea_orm(string_value = "TRADES")]
    Trades,
    #[sea_orm(string_value = "BULK")]
    Bulk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeckZone {
    #[default]
    #[sea_orm(string_value = "MAIN")]
    Main,
    #[sea_orm(string_value = "EXTRA")]
    Extra,
    #[sea_orm(string_value = "SIDE")]
    Side,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_api_code() {
        assert_eq!(SearchLanguage::En.api_code(), None);
        assert_eq!(SearchLanguage::De.api_code(), Some("de"));
        assert_eq!(SearchLanguage::parse("pt"), Some(SearchLanguage::Pt));
        assert_eq!(SearchLanguage::parse("xx"), None);
    }

    #[test]
    fn test_enums_serialize_screaming_case() {
        let json = serde_json::to_string(&CardCondition::LightPlayed).unwrap();
        assert_eq!(json, "\"LIGHT_PLAYED\"");
        let edition: CardEdition = serde_json::from_str("\"FIRST_EDITION\"").unwrap();
        assert_eq!(edition, CardEdition::FirstEdition);
    }
}
