use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Une impression physique d'une carte dans un set. (card_id, set_code) est unique,
/// l'index composite est créé par `db::create_schema`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "printings")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub card_id: i32,
    pub set_code: String,
    pub set_name: String,
    pub rarity: String,
    pub rarity_code: Option<String>,
    pub price: Option<Decimal>,
    pub price_updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::card::Entity",
        from = "Column::CardId",
        to = "super::card::Column::Id",
        on_delete = "Cascade"
    )]
    Card,

    #[sea_orm(has_many = "super::collection_item::Entity")]
    CollectionItem,

    #[sea_orm(has_many = "super::deck_card::Entity")]
    DeckCard,
}

impl Related<super::card::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Card.def()
    }
}

impl Related<super::collection_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CollectionItem.def()
    }
}

impl Related<super::deck_card::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeckCard.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
