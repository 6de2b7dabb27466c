use std::collections::{BTreeSet, HashMap};

use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::*;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::dto::{Page, SearchCardsQuery};
use crate::models::enums::SearchLanguage;
use crate::models::{card, printing};

const DEFAULT_SEARCH_LIMIT: u64 = 20;

pub struct CardService;

/// Carte avec toutes ses impressions
#[derive(Debug, Clone, Serialize)]
pub struct CardWithPrintings {
    #[serde(flatten)]
    pub card: card::Model,
    pub printings: Vec<printing::Model>,
}

/// Impression avec sa carte, forme utilisée par la collection et les decks
#[derive(Debug, Clone, Serialize)]
pub struct PrintingWithCard {
    #[serde(flatten)]
    pub printing: printing::Model,
    pub card: card::Model,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_cards: u64,
    pub total_printings: u64,
    pub total_archetypes: u64,
}

/// Échappe `\`, `%` et `_` : la saisie utilisateur est cherchée littéralement
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `LOWER(col) LIKE '%needle%' ESCAPE '\'`, portable entre Postgres et SQLite
pub(crate) fn contains_ci<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&needle.trim().to_lowercase()));
    Expr::expr(Func::lower(Expr::col(column.as_column_ref())))
        .like(LikeExpr::new(pattern).escape('\\'))
}

/// `col LIKE 'prefix%' ESCAPE '\'`
pub(crate) fn starts_with_literal<C: ColumnTrait>(column: C, prefix: &str) -> SimpleExpr {
    let pattern = format!("{}%", escape_like(prefix));
    Expr::col(column.as_column_ref()).like(LikeExpr::new(pattern).escape('\\'))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl CardService {
    /// Recherche dans le catalogue local. Le champ de nom interrogé dépend de la langue :
    /// EN -> nom anglais, DE -> nom allemand ou nom par défaut, autre -> tous les noms.
    pub async fn search_cards(
        db: &DatabaseConnection,
        query: &SearchCardsQuery,
    ) -> AppResult<Page<CardWithPrintings>> {
        let language = query.language.unwrap_or(SearchLanguage::De);
        let mut condition = Condition::all();

        if let Some(name) = non_empty(&query.name) {
            condition = condition.add(match language {
                SearchLanguage::En => Condition::all().add(contains_ci(card::Column::NameEn, name)),
                SearchLanguage::De => Condition::any()
                    .add(contains_ci(card::Column::NameDe, name))
                    .add(contains_ci(card::Column::Name, name)),
                _ => Condition::any()
                    .add(contains_ci(card::Column::Name, name))
                    .add(contains_ci(card::Column::NameEn, name))
                    .add(contains_ci(card::Column::NameDe, name)),
            });
        }
        if let Some(card_type) = non_empty(&query.card_type) {
            condition = condition.add(contains_ci(card::Column::CardType, card_type));
        }
        if let Some(archetype) = non_empty(&query.archetype) {
            condition = condition.add(contains_ci(card::Column::Archetype, archetype));
        }
        if let Some(attribute) = non_empty(&query.attribute) {
            condition = condition.add(card::Column::Attribute.eq(attribute));
        }

        let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        let offset = query.offset.unwrap_or(0);
        let select = card::Entity::find().filter(condition);

        let total = select.clone().count(db).await?;

        let sort_column = match language {
            SearchLanguage::En => card::Column::NameEn,
            _ => card::Column::Name,
        };
        let cards = select
            .order_by_asc(sort_column)
            .order_by_asc(card::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(db)
            .await?;

        let data = Self::attach_printings(db, cards).await?;

        Ok(Page { data, total, limit, offset })
    }

    pub async fn get_card(db: &DatabaseConnection, id: i32) -> AppResult<CardWithPrintings> {
        let card = card::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Card", id))?;

        let mut cards = Self::attach_printings(db, vec![card]).await?;
        cards.pop().ok_or_else(|| AppError::not_found("Card", id))
    }

    pub async fn get_card_by_konami_id(
        db: &DatabaseConnection,
        konami_id: i64,
    ) -> AppResult<CardWithPrintings> {
        let card = card::Entity::find()
            .filter(card::Column::KonamiId.eq(konami_id))
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Card with Konami ID {} not found", konami_id)))?;

        let mut cards = Self::attach_printings(db, vec![card]).await?;
        cards
            .pop()
            .ok_or_else(|| AppError::NotFound(format!("Card with Konami ID {} not found", konami_id)))
    }

    pub async fn get_card_printings(
        db: &DatabaseConnection,
        card_id: i32,
    ) -> AppResult<Vec<printing::Model>> {
        let printings = printing::Entity::find()
            .filter(printing::Column::CardId.eq(card_id))
            .order_by_asc(printing::Column::SetCode)
            .all(db)
            .await?;

        Ok(printings)
    }

    pub async fn get_printing_by_set_code(
        db: &DatabaseConnection,
        set_code: &str,
    ) -> AppResult<PrintingWithCard> {
        let found = printing::Entity::find()
            .filter(printing::Column::SetCode.eq(set_code))
            .order_by_asc(printing::Column::Id)
            .find_also_related(card::Entity)
            .one(db)
            .await?;

        match found {
            Some((printing, Some(card))) => Ok(PrintingWithCard { printing, card }),
            _ => Err(AppError::NotFound(format!(
                "Printing with set code {} not found",
                set_code
            ))),
        }
    }

    pub async fn catalog_stats(db: &DatabaseConnection) -> AppResult<CatalogStats> {
        let total_cards = card::Entity::find().count(db).await?;
        let total_printings = printing::Entity::find().count(db).await?;
        let archetypes: Vec<String> = card::Entity::find()
            .select_only()
            .column(card::Column::Archetype)
            .filter(card::Column::Archetype.is_not_null())
            .distinct()
            .into_tuple()
            .all(db)
            .await?;

        Ok(CatalogStats {
            total_cards,
            total_printings,
            total_archetypes: archetypes.len() as u64,
        })
    }

    /// Charge des impressions avec leur carte, indexées par id d'impression.
    pub async fn load_printings_with_cards<C: ConnectionTrait>(
        db: &C,
        printing_ids: impl IntoIterator<Item = i32>,
    ) -> AppResult<HashMap<i32, PrintingWithCard>> {
        let ids: BTreeSet<i32> = printing_ids.into_iter().collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = printing::Entity::find()
            .filter(printing::Column::Id.is_in(ids))
            .find_also_related(card::Entity)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(printing, card)| {
                card.map(|card| (printing.id, PrintingWithCard { printing, card }))
            })
            .collect())
    }

    async fn attach_printings(
        db: &DatabaseConnection,
        cards: Vec<card::Model>,
    ) -> AppResult<Vec<CardWithPrintings>> {
        if cards.is_empty() {
            return Ok(Vec::new());
        }

        let card_ids: Vec<i32> = cards.iter().map(|c| c.id).collect();
        let printings = printing::Entity::find()
            .filter(printing::Column::CardId.is_in(card_ids))
            .order_by_asc(printing::Column::SetCode)
            .all(db)
            .await?;

        let mut by_card: HashMap<i32, Vec<printing::Model>> = HashMap::new();
        for p in printings {
            by_card.entry(p.card_id).or_default().push(p);
        }

        Ok(cards
            .into_iter()
            .map(|card| {
                let printings = by_card.remove(&card.id).unwrap_or_default();
                CardWithPrintings { card, printings }
            })
            .collect())
    }
}
