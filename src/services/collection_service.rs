use chrono::Utc;
use sea_orm::*;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::dto::{
    AddToCollectionRequest, CollectionQuery, CollectionSort, DeletedResponse, Page, SortOrder,
    UpdateCollectionItemRequest,
};
use crate::models::enums::Tier;
use crate::models::{card, collection_item, printing, users};
use crate::services::card_service::{contains_ci, CardService, PrintingWithCard};
use crate::utils::money::price_from_f64;

const DEFAULT_PAGE_SIZE: u64 = 50;
const DEFAULT_LANGUAGE: &str = "EN";

pub struct CollectionService;

/// Item de collection avec son impression et sa carte
#[derive(Debug, Clone, Serialize)]
pub struct CollectionItemView {
    #[serde(flatten)]
    pub item: collection_item::Model,
    pub printing: PrintingWithCard,
}

/// Une mise à jour à quantité 0 supprime l'item
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UpdateOutcome {
    Updated(CollectionItemView),
    Deleted(DeletedResponse),
}

impl CollectionService {
    /// Ajoute une impression à la collection.
    /// Si le tuple (impression, état, langue, édition) existe déjà, les quantités sont fusionnées.
    /// Le quota FREE est vérifié avant la fusion.
    pub async fn add_to_collection(
        db: &DatabaseConnection,
        user_id: i32,
        request: AddToCollectionRequest,
        free_tier_limit: u64,
    ) -> AppResult<CollectionItemView> {
        let printing = printing::Entity::find_by_id(request.printing_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Printing", request.printing_id))?;

        let user = users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("User", user_id))?;

        if user.tier == Tier::Free {
            let count = collection_item::Entity::find()
                .filter(collection_item::Column::UserId.eq(user_id))
                .count(db)
                .await?;

            if count >= free_tier_limit {
                tracing::info!(user_id, count, "Free tier limit reached");
                return Err(AppError::QuotaExceeded { limit: free_tier_limit });
            }
        }

        let condition = request.condition.unwrap_or_default();
        let edition = request.edition.unwrap_or_default();
        let language = request
            .language
            .map(|l| l.trim().to_uppercase())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let quantity = request.quantity.unwrap_or(1);
        let purchase_price = request.purchase_price.and_then(price_from_f64);

        let existing = collection_item::Entity::find()
            .filter(collection_item::Column::UserId.eq(user_id))
            .filter(collection_item::Column::PrintingId.eq(printing.id))
            .filter(collection_item::Column::Condition.eq(condition))
            .filter(collection_item::Column::Language.eq(&language))
            .filter(collection_item::Column::Edition.eq(edition))
            .one(db)
            .await?;

        let item = match existing {
            Some(existing) => {
                let merged = existing.quantity + quantity;
                let mut active: collection_item::ActiveModel = existing.into();
                active.quantity = Set(merged);
                if purchase_price.is_some() {
                    active.purchase_price = Set(purchase_price);
                }
                if request.storage_location.is_some() {
                    active.storage_location = Set(request.storage_location);
                }
                active.update(db).await?
            }
            None => {
                collection_item::ActiveModel {
                    user_id: Set(user_id),
                    printing_id: Set(printing.id),
                    condition: Set(condition),
                    language: Set(language),
                    edition: Set(edition),
                    quantity: Set(quantity),
                    purchase_price: Set(purchase_price),
                    storage_location: Set(request.storage_location),
                    portfolio: Set(request.portfolio.unwrap_or_default()),
                    created_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(db)
                .await?
            }
        };

        Self::view(db, item).await
    }

    /// Collection filtrée, triée et paginée
    pub async fn get_collection(
        db: &DatabaseConnection,
        user_id: i32,
        query: &CollectionQuery,
    ) -> AppResult<Page<CollectionItemView>> {
        let mut select = collection_item::Entity::find()
            .join(JoinType::InnerJoin, collection_item::Relation::Printing.def())
            .join(JoinType::InnerJoin, printing::Relation::Card.def())
            .filter(collection_item::Column::UserId.eq(user_id));

        if let Some(portfolio) = query.portfolio {
            select = select.filter(collection_item::Column::Portfolio.eq(portfolio));
        }
        if let Some(condition) = query.condition {
            select = select.filter(collection_item::Column::Condition.eq(condition));
        }
        if let Some(set_code) = query.set_code.as_deref().filter(|s| !s.trim().is_empty()) {
            select = select.filter(contains_ci(printing::Column::SetCode, set_code));
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(contains_ci(card::Column::Name, search))
                    .add(contains_ci(card::Column::NameEn, search)),
            );
        }

        let total = select.clone().count(db).await?;

        // Par défaut : nom croissant, prix et date décroissants
        let sort_by = query.sort_by.unwrap_or_default();
        let order = match (sort_by, query.sort_order) {
            (_, Some(SortOrder::Asc)) => Order::Asc,
            (_, Some(SortOrder::Desc)) => Order::Desc,
            (CollectionSort::Name, None) => Order::Asc,
            _ => Order::Desc,
        };
        select = match sort_by {
            CollectionSort::Name => select.order_by(card::Column::Name, order),
            CollectionSort::Price => select.order_by(printing::Column::Price, order),
            CollectionSort::CreatedAt => select.order_by(collection_item::Column::CreatedAt, order),
        };

        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        let offset = query.offset.unwrap_or(0);
        let items = select
            .order_by_asc(collection_item::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(db)
            .await?;

        let data = Self::views(db, items).await?;

        Ok(Page { data, total, limit, offset })
    }

    pub async fn get_collection_item(
        db: &DatabaseConnection,
        user_id: i32,
        item_id: i32,
    ) -> AppResult<CollectionItemView> {
        let item = Self::find_owned(db, user_id, item_id).await?;
        Self::view(db, item).await
    }

    pub async fn update_collection_item(
        db: &DatabaseConnection,
        user_id: i32,
        item_id: i32,
        request: UpdateCollectionItemRequest,
    ) -> AppResult<UpdateOutcome> {
        let item = Self::find_owned(db, user_id, item_id).await?;

        if request.quantity == Some(0) {
            item.delete(db).await?;
            tracing::debug!(user_id, item_id, "Collection item removed (quantity 0)");
            return Ok(UpdateOutcome::Deleted(DeletedResponse { deleted: true, id: item_id }));
        }

        let mut active: collection_item::ActiveModel = item.into();
        if let Some(quantity) = request.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(condition) = request.condition {
            active.condition = Set(condition);
        }
        if let Some(edition) = request.edition {
            active.edition = Set(edition);
        }
        if let Some(price) = request.purchase_price {
            active.purchase_price = Set(price_from_f64(price));
        }
        if let Some(location) = request.storage_location {
            active.storage_location = Set(Some(location));
        }
        if let Some(portfolio) = request.portfolio {
            active.portfolio = Set(portfolio);
        }

        let updated = active.update(db).await?;
        Ok(UpdateOutcome::Updated(Self::view(db, updated).await?))
    }

    pub async fn remove_from_collection(
        db: &DatabaseConnection,
        user_id: i32,
        item_id: i32,
    ) -> AppResult<DeletedResponse> {
        let item = Self::find_owned(db, user_id, item_id).await?;
        item.delete(db).await?;

        Ok(DeletedResponse { deleted: true, id: item_id })
    }

    /// Les items des autres utilisateurs sont introuvables
    async fn find_owned(
        db: &DatabaseConnection,
        user_id: i32,
        item_id: i32,
    ) -> AppResult<collection_item::Model> {
        collection_item::Entity::find_by_id(item_id)
            .filter(collection_item::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Collection item", item_id))
    }

    async fn view(db: &DatabaseConnection, item: collection_item::Model) -> AppResult<CollectionItemView> {
        let item_id = item.id;
        Self::views(db, vec![item])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal(format!("Printing of collection item {} is missing", item_id)))
    }

    async fn views(
        db: &DatabaseConnection,
        items: Vec<collection_item::Model>,
    ) -> AppResult<Vec<CollectionItemView>> {
        let printings =
            CardService::load_printings_with_cards(db, items.iter().map(|i| i.printing_id)).await?;

        Ok(items
            .into_iter()
            .filter_map(|item| {
                let printing = printings.get(&item.printing_id).cloned()?;
                Some(CollectionItemView { item, printing })
            })
            .collect())
    }
}
