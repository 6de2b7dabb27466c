// ============================================================================
// MODÈLE : CARD
// ============================================================================
//
// Entrée canonique du catalogue, identifiée par l'id numérique YGOPRODeck
// (konami_id, unique). Écrite uniquement par la synchronisation du catalogue,
// jamais supprimée par les flux normaux.
//
//   - name    : nom dans la locale par défaut du catalogue (DE)
//   - name_en : nom anglais, rempli depuis le second fetch (EN)
//   - attack/defense/level : absents pour les magies et pièges
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cards")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub konami_id: i64,
    pub name: String,
    pub name_en: String,
    pub name_de: String,
    #[serde(rename = "type")]
    #[sea_orm(column_name = "type")]
    pub card_type: String,
    pub frame_type: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub race: Option<String>,
    pub attack: Option<i32>,
    pub defense: Option<i32>,
    pub level: Option<i32>,
    pub attribute: Option<String>,
    pub archetype: Option<String>,
    pub image_url: String,
    pub image_url_small: Option<String>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::printing::Entity")]
    Printing,
}

impl Related<super::printing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Printing.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
