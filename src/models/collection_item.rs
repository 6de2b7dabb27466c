// ============================================================================
// MODÈLE : COLLECTION ITEM
// ============================================================================
//
// Possession d'une impression par un utilisateur dans un état donné.
//
// Clé naturelle (index unique uq_collection_items_natural_key):
//   (user_id, printing_id, condition, language, edition)
//
// Points d'attention:
//   - Deux ajouts du même tuple fusionnent les quantités (pas de doublon)
//   - quantity = 0 => la ligne est supprimée
//   - purchase_price est un prix unitaire
//
// ============================================================================

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

use super::enums::{CardCondition, CardEdition, PortfolioType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "collection_items")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub printing_id: i32,
    pub condition: CardCondition,
    pub language: String,
    pub edition: CardEdition,
    pub quantity: i32,
    pub purchase_price: Option<Decimal>,
    pub storage_location: Option<String>,
    pub portfolio: PortfolioType,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::printing::Entity",
        from = "Column::PrintingId",
        to = "super::printing::Column::Id"
    )]
    Printing,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::printing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Printing.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
