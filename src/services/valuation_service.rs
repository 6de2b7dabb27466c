// ============================================================================
// VALORISATION ET PROGRESSION DE LA COLLECTION
// ============================================================================
//
// Agrégats en lecture seule sur les collection_items d'un utilisateur.
//
// Règles de calcul:
//   - Valeur d'un item     = prix de l'impression × quantité (prix absent = 0)
//   - Valeur d'achat       = purchase_price × quantité (absent = 0)
//   - Montants arrondis au centime, demi-valeur loin de zéro
//   - Tout le calcul se fait en mémoire, en Decimal
//
// Progression d'un set:
//   - Préfixe = partie du code avant le premier '-' ("LOB-EN001" -> "LOB")
//   - Univers = toutes les impressions dont le code commence par le préfixe
//   - Possédée = au moins un item de la collection, quelle que soit la quantité
//
// ============================================================================

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use sea_orm::*;
use serde::Serialize;

use crate::error::AppResult;
use crate::models::enums::{CardCondition, CardEdition, PortfolioType};
use crate::models::{card, collection_item, printing};
use crate::services::card_service::{starts_with_literal, CardService, PrintingWithCard};
use crate::utils::money::round_cents;

const DEFAULT_TOP_LIMIT: usize = 10;

pub struct ValuationService;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PortfolioSlice {
    pub count: i64,
    pub value: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub total_cards: i64,
    pub total_unique_cards: u64,
    pub total_value: Decimal,
    pub total_purchase_value: Decimal,
    pub profit_loss: Decimal,
    pub portfolio_breakdown: BTreeMap<PortfolioType, PortfolioSlice>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopValueItem {
    #[serde(flatten)]
    pub item: collection_item::Model,
    pub printing: PrintingWithCard,
    pub total_value: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingPrinting {
    pub id: i32,
    pub set_code: String,
    pub card_name: String,
    pub rarity: String,
    pub price: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetProgress {
    pub set_code: String,
    pub total_cards: usize,
    pub owned_cards: usize,
    pub missing_cards: usize,
    pub completion_percentage: u32,
    pub missing_list: Vec<MissingPrinting>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub card_name: String,
    pub set_code: String,
    pub set_name: String,
    pub rarity: String,
    pub condition: CardCondition,
    pub language: String,
    pub edition: CardEdition,
    pub quantity: i32,
    pub purchase_price: Option<Decimal>,
    pub current_price: Option<Decimal>,
    pub storage_location: Option<String>,
    pub portfolio: PortfolioType,
}

/// Préfixe de set : "LOB-EN001" -> "LOB", "LOB" -> "LOB"
pub fn set_prefix(set_code: &str) -> &str {
    set_code.split('-').next().unwrap_or(set_code)
}

/// round(100 × owned / total), 0 quand le set est inconnu
pub fn completion_percentage(owned: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((owned * 200 + total) / (2 * total)) as u32
}

fn item_value(item: &collection_item::Model, price: Option<Decimal>) -> Decimal {
    price.unwrap_or(Decimal::ZERO) * Decimal::from(item.quantity)
}

impl ValuationService {
    pub fn compute_stats(items: &[(collection_item::Model, Option<Decimal>)]) -> CollectionStats {
        let mut total_cards = 0i64;
        let mut total_value = Decimal::ZERO;
        let mut total_purchase_value = Decimal::ZERO;
        let mut portfolio_breakdown: BTreeMap<PortfolioType, PortfolioSlice> = BTreeMap::new();

        for (item, price) in items {
            let value = item_value(item, *price);
            let purchase = item_value(item, item.purchase_price);

            total_cards += i64::from(item.quantity);
            total_value += value;
            total_purchase_value += purchase;

            let slice = portfolio_breakdown.entry(item.portfolio).or_default();
            slice.count += i64::from(item.quantity);
            slice.value += value;
        }

        for slice in portfolio_breakdown.values_mut() {
            slice.value = round_cents(slice.value);
        }

        CollectionStats {
            total_cards,
            total_unique_cards: items.len() as u64,
            total_value: round_cents(total_value),
            total_purchase_value: round_cents(total_purchase_value),
            profit_loss: round_cents(total_value - total_purchase_value),
            portfolio_breakdown,
        }
    }

    pub async fn collection_stats(db: &DatabaseConnection, user_id: i32) -> AppResult<CollectionStats> {
        let rows = collection_item::Entity::find()
            .filter(collection_item::Column::UserId.eq(user_id))
            .order_by_asc(collection_item::Column::Id)
            .find_also_related(printing::Entity)
            .all(db)
            .await?;

        let items: Vec<_> = rows
            .into_iter()
            .map(|(item, printing)| (item, printing.and_then(|p| p.price)))
            .collect();

        Ok(Self::compute_stats(&items))
    }

    /// Items triés par valeur décroissante. Le tri est stable : à valeur égale, ordre d'insertion.
    pub async fn top_value_items(
        db: &DatabaseConnection,
        user_id: i32,
        limit: Option<usize>,
    ) -> AppResult<Vec<TopValueItem>> {
        let items = collection_item::Entity::find()
            .filter(collection_item::Column::UserId.eq(user_id))
            .order_by_asc(collection_item::Column::Id)
            .all(db)
            .await?;

        let printings =
            CardService::load_printings_with_cards(db, items.iter().map(|i| i.printing_id)).await?;

        let mut ranked: Vec<TopValueItem> = items
            .into_iter()
            .filter_map(|item| {
                let printing = printings.get(&item.printing_id)?.clone();
                let total_value = round_cents(item_value(&item, printing.printing.price));
                Some(TopValueItem { item, printing, total_value })
            })
            .collect();

        ranked.sort_by(|a, b| b.total_value.cmp(&a.total_value));
        ranked.truncate(limit.unwrap_or(DEFAULT_TOP_LIMIT));

        Ok(ranked)
    }

    pub async fn set_progress(
        db: &DatabaseConnection,
        user_id: i32,
        set_code: &str,
    ) -> AppResult<SetProgress> {
        let prefix = set_prefix(set_code.trim());

        let universe = printing::Entity::find()
            .filter(starts_with_literal(printing::Column::SetCode, prefix))
            .order_by_asc(printing::Column::SetCode)
            .order_by_asc(printing::Column::Id)
            .find_also_related(card::Entity)
            .all(db)
            .await?;

        let owned_ids: HashSet<i32> = if universe.is_empty() {
            HashSet::new()
        } else {
            collection_item::Entity::find()
                .select_only()
                .column(collection_item::Column::PrintingId)
                .filter(collection_item::Column::UserId.eq(user_id))
                .filter(collection_item::Column::PrintingId.is_in(universe.iter().map(|(p, _)| p.id)))
                .into_tuple::<i32>()
                .all(db)
                .await?
                .into_iter()
                .collect()
        };

        let total = universe.len();
        let owned = universe.iter().filter(|(p, _)| owned_ids.contains(&p.id)).count();

        let missing_list: Vec<MissingPrinting> = universe
            .into_iter()
            .filter(|(p, _)| !owned_ids.contains(&p.id))
            .map(|(p, card)| MissingPrinting {
                id: p.id,
                set_code: p.set_code,
                card_name: card.map(|c| c.name).unwrap_or_default(),
                rarity: p.rarity,
                price: p.price,
            })
            .collect();

        Ok(SetProgress {
            set_code: prefix.to_string(),
            total_cards: total,
            owned_cards: owned,
            missing_cards: missing_list.len(),
            completion_percentage: completion_percentage(owned, total),
            missing_list,
        })
    }

    /// Export complet, une ligne par item
    pub async fn export_collection(db: &DatabaseConnection, user_id: i32) -> AppResult<Vec<ExportRow>> {
        let items = collection_item::Entity::find()
            .filter(collection_item::Column::UserId.eq(user_id))
            .order_by_asc(collection_item::Column::Id)
            .all(db)
            .await?;

        let printings =
            CardService::load_printings_with_cards(db, items.iter().map(|i| i.printing_id)).await?;

        Ok(items
            .into_iter()
            .filter_map(|item| {
                let found = printings.get(&item.printing_id)?;
                Some(ExportRow {
                    card_name: found.card.name.clone(),
                    set_code: found.printing.set_code.clone(),
                    set_name: found.printing.set_name.clone(),
                    rarity: found.printing.rarity.clone(),
                    condition: item.condition,
                    language: item.language,
                    edition: item.edition,
                    quantity: item.quantity,
                    purchase_price: item.purchase_price,
                    current_price: found.printing.price,
                    storage_location: item.storage_location,
                    portfolio: item.portfolio,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::Tier;
    use crate::test_support::{dec, insert_card, insert_printing, insert_user, setup_db};
    use chrono::Utc;

    async fn own(
        db: &DatabaseConnection,
        user_id: i32,
        printing_id: i32,
        quantity: i32,
        purchase_price: Option<&str>,
        portfolio: PortfolioType,
    ) -> collection_item::Model {
        collection_item::ActiveModel {
            user_id: Set(user_id),
            printing_id: Set(printing_id),
            condition: Set(CardCondition::NearMint),
            language: Set("EN".to_string()),
            edition: Set(CardEdition::Unlimited),
            quantity: Set(quantity),
            purchase_price: Set(purchase_price.map(dec)),
            storage_location: Set(None),
            portfolio: Set(portfolio),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    }

    #[test]
    fn prefix_stops_at_first_hyphen() {
        assert_eq!(set_prefix("LOB-EN001"), "LOB");
        assert_eq!(set_prefix("LOB"), "LOB");
        assert_eq!(set_prefix("RA01-DE-001"), "RA01");
    }

    #[test]
    fn completion_rounds_half_up_and_handles_empty_sets() {
        assert_eq!(completion_percentage(2, 4), 50);
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(2, 3), 67);
        assert_eq!(completion_percentage(1, 8), 13); // 12.5
        assert_eq!(completion_percentage(0, 0), 0);
    }

    #[tokio::test]
    async fn stats_sum_value_and_ignore_missing_purchase_price() {
        let db = setup_db().await;
        let user = insert_user(&db, "kaiba", Tier::Free).await;
        let card = insert_card(&db, 1, "Blue-Eyes White Dragon").await;
        let p1 = insert_printing(&db, card.id, "LOB-001", Some("5.00")).await;
        let p2 = insert_printing(&db, card.id, "SDK-001", Some("10.00")).await;
        own(&db, user.id, p1.id, 10, Some("2.50"), PortfolioType::Collection).await;
        own(&db, user.id, p2.id, 5, None, PortfolioType::Trades).await;

        let stats = ValuationService::collection_stats(&db, user.id).await.unwrap();

        assert_eq!(stats.total_cards, 15);
        assert_eq!(stats.total_unique_cards, 2);
        assert_eq!(stats.total_value, dec("100.00"));
        assert_eq!(stats.total_purchase_value, dec("25.00"));
        assert_eq!(stats.profit_loss, dec("75.00"));
        assert_eq!(
            stats.portfolio_breakdown[&PortfolioType::Trades],
            PortfolioSlice { count: 5, value: dec("50.00") }
        );
        assert!(!stats.portfolio_breakdown.contains_key(&PortfolioType::Bulk));
    }

    #[test]
    fn stats_treat_missing_price_as_zero() {
        let item = collection_item::Model {
            id: 1,
            user_id: 1,
            printing_id: 1,
            condition: CardCondition::Mint,
            language: "EN".to_string(),
            edition: CardEdition::FirstEdition,
            quantity: 3,
            purchase_price: Some(dec("0.335")),
            storage_location: None,
            portfolio: PortfolioType::Bulk,
            created_at: Utc::now(),
        };

        let stats = ValuationService::compute_stats(&[(item, None)]);
        assert_eq!(stats.total_value, Decimal::ZERO);
        assert_eq!(stats.total_purchase_value, dec("1.01")); // 1.005
        assert_eq!(stats.profit_loss, dec("-1.01"));
    }

    #[tokio::test]
    async fn set_progress_reports_missing_printings() {
        let db = setup_db().await;
        let user = insert_user(&db, "yugi", Tier::Free).await;
        let card = insert_card(&db, 1, "Dark Magician").await;
        let p1 = insert_printing(&db, card.id, "LOB-001", Some("1.00")).await;
        let p2 = insert_printing(&db, card.id, "LOB-002", None).await;
        let p3 = insert_printing(&db, card.id, "LOB-003", Some("3.00")).await;
        let p4 = insert_printing(&db, card.id, "LOB-004", None).await;
        insert_printing(&db, card.id, "SDY-001", None).await;
        own(&db, user.id, p1.id, 1, None, PortfolioType::Collection).await;
        own(&db, user.id, p2.id, 2, None, PortfolioType::Collection).await;

        let progress = ValuationService::set_progress(&db, user.id, "LOB-EN001").await.unwrap();

        assert_eq!(progress.set_code, "LOB");
        assert_eq!(progress.total_cards, 4);
        assert_eq!(progress.owned_cards, 2);
        assert_eq!(progress.missing_cards, 2);
        assert_eq!(progress.completion_percentage, 50);
        let missing: Vec<i32> = progress.missing_list.iter().map(|m| m.id).collect();
        assert_eq!(missing, vec![p3.id, p4.id]);
        assert_eq!(progress.missing_list[0].card_name, "Dark Magician");
        assert_eq!(progress.missing_list[0].price, Some(dec("3.00")));
    }

    #[tokio::test]
    async fn set_progress_for_unknown_prefix_is_zero() {
        let db = setup_db().await;
        let user = insert_user(&db, "joey", Tier::Free).await;

        let progress = ValuationService::set_progress(&db, user.id, "XXX").await.unwrap();

        assert_eq!(progress.total_cards, 0);
        assert_eq!(progress.completion_percentage, 0);
        assert!(progress.missing_list.is_empty());
    }

    #[tokio::test]
    async fn set_progress_treats_like_wildcards_literally() {
        let db = setup_db().await;
        let user = insert_user(&db, "mai", Tier::Free).await;
        let card = insert_card(&db, 89631139, "Blue-Eyes White Dragon").await;
        insert_printing(&db, card.id, "LOB-001", Some("5.00")).await;
        insert_printing(&db, card.id, "SDY-001", Some("1.00")).await;

        let progress = ValuationService::set_progress(&db, user.id, "L_B-001").await.unwrap();
        assert_eq!(progress.total_cards, 0);

        let progress = ValuationService::set_progress(&db, user.id, "%").await.unwrap();
        assert_eq!(progress.total_cards, 0);
        assert_eq!(progress.completion_percentage, 0);

        let progress = ValuationService::set_progress(&db, user.id, "LOB-002").await.unwrap();
        assert_eq!(progress.total_cards, 1);
    }

    #[tokio::test]
    async fn top_value_sorts_by_total_and_keeps_insertion_order_on_ties() {
        let db = setup_db().await;
        let user = insert_user(&db, "mai", Tier::Pro).await;
        let card = insert_card(&db, 1, "Harpie Lady").await;
        let cheap = insert_printing(&db, card.id, "LOB-001", Some("1.00")).await;
        let pricey = insert_printing(&db, card.id, "LOB-002", Some("20.00")).await;
        let tie = insert_printing(&db, card.id, "LOB-003", Some("10.00")).await;
        let a = own(&db, user.id, cheap.id, 3, None, PortfolioType::Collection).await;
        let b = own(&db, user.id, tie.id, 2, None, PortfolioType::Collection).await;
        let c = own(&db, user.id, pricey.id, 1, None, PortfolioType::Collection).await;

        let top = ValuationService::top_value_items(&db, user.id, None).await.unwrap();
        let ids: Vec<i32> = top.iter().map(|t| t.item.id).collect();
        assert_eq!(ids, vec![b.id, c.id, a.id]);
        assert_eq!(top[0].total_value, dec("20.00"));
        assert_eq!(top[2].printing.card.name, "Harpie Lady");

        let top = ValuationService::top_value_items(&db, user.id, Some(1)).await.unwrap();
        assert_eq!(top.len(), 1);
    }

    #[tokio::test]
    async fn export_flattens_every_item() {
        let db = setup_db().await;
        let user = insert_user(&db, "bakura", Tier::Free).await;
        let other = insert_user(&db, "marik", Tier::Free).await;
        let card = insert_card(&db, 1, "Change of Heart").await;
        let p = insert_printing(&db, card.id, "MRD-060", Some("4.20")).await;
        own(&db, user.id, p.id, 2, Some("1.00"), PortfolioType::Trades).await;
        own(&db, other.id, p.id, 9, None, PortfolioType::Collection).await;

        let rows = ValuationService::export_collection(&db, user.id).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].card_name, "Change of Heart");
        assert_eq!(rows[0].set_code, "MRD-060");
        assert_eq!(rows[0].quantity, 2);
        assert_eq!(rows[0].current_price, Some(dec("4.20")));
        assert_eq!(rows[0].portfolio, PortfolioType::Trades);
    }
}
