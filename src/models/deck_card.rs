use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

use super::enums::DeckZone;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deck_cards")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub deck_id: i32,
    pub printing_id: i32,
    pub quantity: i32,
    pub zone: DeckZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    // ON DELETE CASCADE: supprimer un deck supprime ses cartes
    #[sea_orm(
        belongs_to = "super::deck::Entity",
        from = "Column::DeckId",
        to = "super::deck::Column::Id",
        on_delete = "Cascade"
    )]
    Deck,

    #[sea_orm(
        belongs_to = "super::printing::Entity",
        from = "Column::PrintingId",
        to = "super::printing::Column::Id"
    )]
    Printing,
}

impl Related<super::deck::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deck.def()
    }
}

impl Related<super::printing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Printing.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
