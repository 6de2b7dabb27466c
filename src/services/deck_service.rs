use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use sea_orm::*;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::dto::{CreateDeckRequest, DeckCardInput, DeletedResponse, UpdateDeckRequest};
use crate::models::enums::DeckZone;
use crate::models::{collection_item, deck, deck_card, printing};
use crate::services::card_service::{CardService, PrintingWithCard};
use crate::services::deck_rules::{self, DeckBuilder};

pub struct DeckService;

#[derive(Debug, Clone, Serialize)]
pub struct DeckCardView {
    #[serde(flatten)]
    pub deck_card: deck_card::Model,
    pub printing: PrintingWithCard,
}

/// Deck avec ses cartes, chaque carte avec son impression
#[derive(Debug, Clone, Serialize)]
pub struct DeckView {
    #[serde(flatten)]
    pub deck: deck::Model,
    pub cards: Vec<DeckCardView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStats {
    pub deck_id: i32,
    pub total_cards: i32,
    pub unique_cards: usize,
    pub main_deck_cards: i32,
    pub extra_deck_cards: i32,
    pub side_deck_cards: i32,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardOwnership {
    pub printing_id: i32,
    pub card_name: String,
    pub zone: DeckZone,
    pub required: i32,
    pub owned: i64,
    pub complete: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingCard {
    pub printing_id: i32,
    pub card_name: String,
    pub zone: DeckZone,
    pub shortfall: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipReport {
    pub deck_id: i32,
    pub is_complete: bool,
    pub cards: Vec<CardOwnership>,
    pub missing_cards: Vec<MissingCard>,
}

/// Deck normalisé par le builder (copies et tailles de zone tronquées)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckPreview {
    pub cards: Vec<DeckCardInput>,
    pub main_deck_cards: i32,
    pub extra_deck_cards: i32,
    pub side_deck_cards: i32,
    pub warnings: Vec<String>,
}

impl DeckService {
    pub async fn create_deck(
        db: &DatabaseConnection,
        user_id: i32,
        request: CreateDeckRequest,
    ) -> AppResult<DeckView> {
        deck_rules::validate_copy_limits(&request.cards)?;

        let txn = db.begin().await?;
        Self::ensure_printings_exist(&txn, &request.cards).await?;

        let now = Utc::now();
        let deck = deck::ActiveModel {
            user_id: Set(user_id),
            name: Set(request.name.trim().to_string()),
            description: Set(request.description),
            format: Set(request.format),
            is_public: Set(request.is_public.unwrap_or(false)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        Self::insert_cards(&txn, deck.id, &request.cards).await?;
        let view = Self::load_view(&txn, deck).await?;
        txn.commit().await?;

        tracing::info!(user_id, deck_id = view.deck.id, cards = view.cards.len(), "Deck created");
        Ok(view)
    }

    pub async fn get_deck(db: &DatabaseConnection, user_id: i32, deck_id: i32) -> AppResult<DeckView> {
        let deck = Self::find_owned(db, user_id, deck_id).await?;
        Self::load_view(db, deck).await
    }

    pub async fn list_decks(db: &DatabaseConnection, user_id: i32) -> AppResult<Vec<DeckView>> {
        let decks = deck::Entity::find()
            .filter(deck::Column::UserId.eq(user_id))
            .order_by_desc(deck::Column::UpdatedAt)
            .order_by_desc(deck::Column::Id)
            .all(db)
            .await?;

        let mut views = Vec::with_capacity(decks.len());
        for deck in decks {
            views.push(Self::load_view(db, deck).await?);
        }
        Ok(views)
    }

    /// Met à jour les métadonnées. Si `cards` est présent, la liste complète est remplacée.
    pub async fn update_deck(
        db: &DatabaseConnection,
        user_id: i32,
        deck_id: i32,
        request: UpdateDeckRequest,
    ) -> AppResult<DeckView> {
        if let Some(cards) = &request.cards {
            deck_rules::validate_copy_limits(cards)?;
        }

        let txn = db.begin().await?;
        let existing = Self::find_owned(&txn, user_id, deck_id).await?;

        let mut active: deck::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(format) = request.format {
            active.format = Set(Some(format));
        }
        if let Some(is_public) = request.is_public {
            active.is_public = Set(is_public);
        }
        active.updated_at = Set(Utc::now());
        let deck = active.update(&txn).await?;

        if let Some(cards) = &request.cards {
            Self::ensure_printings_exist(&txn, cards).await?;
            deck_card::Entity::delete_many()
                .filter(deck_card::Column::DeckId.eq(deck_id))
                .exec(&txn)
                .await?;
            Self::insert_cards(&txn, deck_id, cards).await?;
        }

        let view = Self::load_view(&txn, deck).await?;
        txn.commit().await?;
        Ok(view)
    }

    pub async fn delete_deck(
        db: &DatabaseConnection,
        user_id: i32,
        deck_id: i32,
    ) -> AppResult<DeletedResponse> {
        let txn = db.begin().await?;
        let deck = Self::find_owned(&txn, user_id, deck_id).await?;

        deck_card::Entity::delete_many()
            .filter(deck_card::Column::DeckId.eq(deck_id))
            .exec(&txn)
            .await?;
        deck.delete(&txn).await?;
        txn.commit().await?;

        Ok(DeletedResponse { deleted: true, id: deck_id })
    }

    pub async fn deck_stats(db: &DatabaseConnection, user_id: i32, deck_id: i32) -> AppResult<DeckStats> {
        Self::find_owned(db, user_id, deck_id).await?;
        let cards = Self::deck_cards(db, deck_id).await?;

        let zone_total = |zone: DeckZone| -> i32 {
            cards.iter().filter(|c| c.zone == zone).map(|c| c.quantity).sum()
        };
        let main = zone_total(DeckZone::Main);
        let extra = zone_total(DeckZone::Extra);
        let side = zone_total(DeckZone::Side);

        Ok(DeckStats {
            deck_id,
            total_cards: main + extra + side,
            unique_cards: cards.len(),
            main_deck_cards: main,
            extra_deck_cards: extra,
            side_deck_cards: side,
            warnings: deck_rules::zone_warnings(main, extra, side),
        })
    }

    /// Compare chaque carte du deck à la quantité possédée de la même impression,
    /// tous états, langues et éditions confondus.
    pub async fn validate_ownership(
        db: &DatabaseConnection,
        user_id: i32,
        deck_id: i32,
    ) -> AppResult<OwnershipReport> {
        Self::find_owned(db, user_id, deck_id).await?;
        let cards = Self::deck_cards(db, deck_id).await?;

        let printing_ids: BTreeSet<i32> = cards.iter().map(|c| c.printing_id).collect();
        let holdings: Vec<(i32, i32)> = if printing_ids.is_empty() {
            Vec::new()
        } else {
            collection_item::Entity::find()
                .select_only()
                .column(collection_item::Column::PrintingId)
                .column(collection_item::Column::Quantity)
                .filter(collection_item::Column::UserId.eq(user_id))
                .filter(collection_item::Column::PrintingId.is_in(printing_ids.iter().copied()))
                .into_tuple()
                .all(db)
                .await?
        };

        let mut owned_by_printing: HashMap<i32, i64> = HashMap::new();
        for (printing_id, quantity) in holdings {
            *owned_by_printing.entry(printing_id).or_default() += i64::from(quantity);
        }

        let printings = CardService::load_printings_with_cards(db, printing_ids).await?;

        let mut report = OwnershipReport {
            deck_id,
            is_complete: true,
            cards: Vec::with_capacity(cards.len()),
            missing_cards: Vec::new(),
        };

        for card in cards {
            let owned = owned_by_printing.get(&card.printing_id).copied().unwrap_or(0);
            let required = i64::from(card.quantity);
            let complete = owned >= required;
            let card_name = printings
                .get(&card.printing_id)
                .map(|p| p.card.name.clone())
                .unwrap_or_default();

            if !complete {
                report.is_complete = false;
                report.missing_cards.push(MissingCard {
                    printing_id: card.printing_id,
                    card_name: card_name.clone(),
                    zone: card.zone,
                    shortfall: required - owned,
                });
            }
            report.cards.push(CardOwnership {
                printing_id: card.printing_id,
                card_name,
                zone: card.zone,
                required: card.quantity,
                owned,
                complete,
            });
        }

        Ok(report)
    }

    /// Passe une liste de cartes dans le builder sans rien enregistrer
    pub fn preview(cards: &[DeckCardInput]) -> DeckPreview {
        let builder = DeckBuilder::from_cards(cards);

        DeckPreview {
            cards: builder.to_cards(),
            main_deck_cards: builder.zone_count(DeckZone::Main),
            extra_deck_cards: builder.zone_count(DeckZone::Extra),
            side_deck_cards: builder.zone_count(DeckZone::Side),
            warnings: builder.warnings(),
        }
    }

    async fn find_owned<C: ConnectionTrait>(db: &C, user_id: i32, deck_id: i32) -> AppResult<deck::Model> {
        deck::Entity::find_by_id(deck_id)
            .filter(deck::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Deck", deck_id))
    }

    async fn deck_cards<C: ConnectionTrait>(db: &C, deck_id: i32) -> AppResult<Vec<deck_card::Model>> {
        let cards = deck_card::Entity::find()
            .filter(deck_card::Column::DeckId.eq(deck_id))
            .order_by_asc(deck_card::Column::Id)
            .all(db)
            .await?;
        Ok(cards)
    }

    async fn ensure_printings_exist<C: ConnectionTrait>(db: &C, cards: &[DeckCardInput]) -> AppResult<()> {
        let wanted: BTreeSet<i32> = cards.iter().map(|c| c.printing_id).collect();
        if wanted.is_empty() {
            return Ok(());
        }

        let found: BTreeSet<i32> = printing::Entity::find()
            .select_only()
            .column(printing::Column::Id)
            .filter(printing::Column::Id.is_in(wanted.iter().copied()))
            .into_tuple::<i32>()
            .all(db)
            .await?
            .into_iter()
            .collect();

        match wanted.difference(&found).next() {
            Some(missing) => Err(AppError::not_found("Printing", missing)),
            None => Ok(()),
        }
    }

    async fn insert_cards<C: ConnectionTrait>(db: &C, deck_id: i32, cards: &[DeckCardInput]) -> AppResult<()> {
        if cards.is_empty() {
            return Ok(());
        }

        let rows = cards.iter().map(|card| deck_card::ActiveModel {
            deck_id: Set(deck_id),
            printing_id: Set(card.printing_id),
            quantity: Set(card.quantity),
            zone: Set(card.zone),
            ..Default::default()
        });
        deck_card::Entity::insert_many(rows).exec(db).await?;
        Ok(())
    }

    async fn load_view<C: ConnectionTrait>(db: &C, deck: deck::Model) -> AppResult<DeckView> {
        let cards = Self::deck_cards(db, deck.id).await?;
        let printings =
            CardService::load_printings_with_cards(db, cards.iter().map(|c| c.printing_id)).await?;

        let cards = cards
            .into_iter()
            .filter_map(|deck_card| {
                let printing = printings.get(&deck_card.printing_id).cloned()?;
                Some(DeckCardView { deck_card, printing })
            })
            .collect();

        Ok(DeckView { deck, cards })
    }
}
