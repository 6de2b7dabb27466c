// connexion BD + création du schéma

use sea_orm::sea_query::{Index, IndexCreateStatement, TableCreateStatement};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};

use crate::models::{card, collection_item, deck, deck_card, printing, users};

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options.sqlx_logging(false);

    Database::connect(options).await
}

/// Crée les tables et les index uniques composites s'ils n'existent pas.
/// L'ordre des tables respecte les clés étrangères.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let tables: Vec<TableCreateStatement> = vec![
        schema.create_table_from_entity(users::Entity).if_not_exists().to_owned(),
        schema.create_table_from_entity(card::Entity).if_not_exists().to_owned(),
        schema.create_table_from_entity(printing::Entity).if_not_exists().to_owned(),
        schema.create_table_from_entity(collection_item::Entity).if_not_exists().to_owned(),
        schema.create_table_from_entity(deck::Entity).if_not_exists().to_owned(),
        schema.create_table_from_entity(deck_card::Entity).if_not_exists().to_owned(),
    ];

    for table in &tables {
        db.execute(backend.build(table)).await?;
    }

    for index in unique_indexes() {
        db.execute(backend.build(&index)).await?;
    }

    tracing::info!(tables = tables.len(), "Database schema ready");
    Ok(())
}

fn unique_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("uq_printings_card_set")
            .table(printing::Entity)
            .col(printing::Column::CardId)
            .col(printing::Column::SetCode)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("uq_collection_items_natural_key")
            .table(collection_item::Entity)
            .col(collection_item::Column::UserId)
            .col(collection_item::Column::PrintingId)
            .col(collection_item::Column::Condition)
            .col(collection_item::Column::Language)
            .col(collection_item::Column::Edition)
            .unique()
            .if_not_exists()
            .to_owned(),
    ]
}
