// ============================================================================
// SYNCHRONISATION DU CATALOGUE
// ============================================================================
//
// Réconcilie le catalogue YGOPRODeck avec les tables cards / printings.
//
// Flux:
//   1. Fetch du catalogue dans la locale par défaut + en anglais
//   2. Index id externe -> nom anglais
//   3. Pour chaque carte : upsert par konami_id, puis upsert des impressions
//      par (card_id, set_code)
//
// Points d'attention:
//   - Source injoignable => toute la synchro échoue (rien à compter)
//   - Une carte qui échoue est loggée et comptée dans `errors`, les autres continuent
//   - Le mode batch traite les cartes d'un batch en parallèle, les batchs en série
//   - Pas de verrou : deux synchros concurrentes peuvent violer une contrainte
//     unique, l'erreur est alors comptée pour la carte concernée
//
// ============================================================================

use std::collections::HashMap;

use chrono::Utc;
use futures::future::join_all;
use sea_orm::*;
use serde::Serialize;

use crate::config::{PrintingRefreshPolicy, SyncSettings};
use crate::error::{AppError, AppResult};
use crate::models::enums::SearchLanguage;
use crate::models::{card, printing};
use crate::services::card_source::{CardSource, CatalogCard, CatalogSet};
use crate::utils::money::parse_price;

pub struct SyncService;

/// Résultat d'une synchronisation, renvoyé tel quel par l'API
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub success: bool,
    pub cards_created: u32,
    pub cards_updated: u32,
    pub printings_created: u32,
    pub total_cards: usize,
    pub errors: u32,
    #[serde(skip)]
    pub batch_sizes: Vec<usize>,
}

/// Résultat de l'upsert d'une carte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardUpsert {
    pub created: bool,
    pub card_id: i32,
}

#[derive(Debug, Clone, Copy)]
struct RecordOutcome {
    created: bool,
    printings_created: u32,
}

impl SyncReport {
    fn absorb(&mut self, outcome: &AppResult<RecordOutcome>) {
        match outcome {
            Ok(outcome) => {
                if outcome.created {
                    self.cards_created += 1;
                } else {
                    self.cards_updated += 1;
                }
                self.printings_created += outcome.printings_created;
            }
            Err(_) => self.errors += 1,
        }
    }
}

impl SyncService {
    /// id externe -> nom anglais
    pub fn build_localized_name_index(english: &[CatalogCard]) -> HashMap<i64, String> {
        english.iter().map(|c| (c.id, c.name.clone())).collect()
    }

    /// Crée la carte si le konami_id est inconnu, sinon écrase tous les champs modifiables.
    /// `name_de` n'est écrit depuis le nom par défaut que si la locale du catalogue est l'allemand,
    /// il reste vide à la création sinon.
    pub async fn upsert_card<C: ConnectionTrait>(
        db: &C,
        record: &CatalogCard,
        english_name: &str,
        locale: SearchLanguage,
    ) -> AppResult<CardUpsert> {
        let existing = card::Entity::find()
            .filter(card::Column::KonamiId.eq(record.id))
            .one(db)
            .await?;

        let created = existing.is_none();
        let mut active = match existing {
            Some(model) => model.into_active_model(),
            None => card::ActiveModel {
                konami_id: Set(record.id),
                name_de: Set(String::new()),
                ..Default::default()
            },
        };

        let image = record.card_images.first();
        active.name = Set(record.name.clone());
        active.name_en = Set(english_name.to_string());
        if locale == SearchLanguage::De {
            active.name_de = Set(record.name.clone());
        }
        active.card_type = Set(record.card_type.clone());
        active.frame_type = Set(record.frame_type.clone());
        active.description = Set(record.desc.clone());
        active.race = Set(record.race.clone());
        active.attack = Set(record.atk);
        active.defense = Set(record.def);
        active.level = Set(record.level);
        active.attribute = Set(record.attribute.clone());
        active.archetype = Set(record.archetype.clone());
        active.image_url = Set(image.map(|i| i.image_url.clone()).unwrap_or_default());
        active.image_url_small = Set(image.and_then(|i| i.image_url_small.clone()));
        active.updated_at = Set(Utc::now());

        let model = if created {
            active.insert(db).await?
        } else {
            active.update(db).await?
        };

        Ok(CardUpsert { created, card_id: model.id })
    }

    /// Crée les impressions inconnues, rafraîchit le prix des existantes.
    /// Retourne le nombre d'impressions créées.
    pub async fn upsert_printings<C: ConnectionTrait>(
        db: &C,
        card_id: i32,
        sets: &[CatalogSet],
        policy: PrintingRefreshPolicy,
    ) -> AppResult<u32> {
        let mut created = 0;

        for set in sets {
            let existing = printing::Entity::find()
                .filter(printing::Column::CardId.eq(card_id))
                .filter(printing::Column::SetCode.eq(&set.set_code))
                .one(db)
                .await?;

            let price = parse_price(set.set_price.as_deref());
            let now = Utc::now();

            match existing {
                None => {
                    printing::ActiveModel {
                        card_id: Set(card_id),
                        set_code: Set(set.set_code.clone()),
                        set_name: Set(set.set_name.clone()),
                        rarity: Set(set.set_rarity.clone()),
                        rarity_code: Set(set.set_rarity_code.clone()),
                        price: Set(price),
                        price_updated_at: Set(Some(now)),
                        ..Default::default()
                    }
                    .insert(db)
                    .await?;
                    created += 1;
                }
                Some(model) => {
                    let mut active = model.into_active_model();
                    active.price = Set(price);
                    active.price_updated_at = Set(Some(now));
                    if policy == PrintingRefreshPolicy::Overwrite {
                        active.set_name = Set(set.set_name.clone());
                        active.rarity = Set(set.set_rarity.clone());
                        active.rarity_code = Set(set.set_rarity_code.clone());
                    }
                    active.update(db).await?;
                }
            }
        }

        Ok(created)
    }

    /// Synchronisation séquentielle de tout le catalogue
    pub async fn sync_all(
        db: &DatabaseConnection,
        source: &dyn CardSource,
        settings: &SyncSettings,
    ) -> AppResult<SyncReport> {
        tracing::info!("Starting full card sync...");
        let (records, names) = Self::fetch_catalog(source, settings.catalog_locale).await?;

        let mut report = SyncReport {
            total_cards: records.len(),
            batch_sizes: vec![records.len()],
            ..Default::default()
        };

        for record in &records {
            let outcome = Self::sync_record(db, record, &names, settings).await;
            report.absorb(&outcome);
        }

        report.success = true;
        Self::log_summary(&report);
        Ok(report)
    }

    /// Synchronisation par batchs : parallèle dans un batch, séquentielle entre batchs
    pub async fn sync_in_batches(
        db: &DatabaseConnection,
        source: &dyn CardSource,
        settings: &SyncSettings,
        batch_size: usize,
    ) -> AppResult<SyncReport> {
        if batch_size == 0 {
            return Err(AppError::BadRequest("batchSize must be at least 1".to_string()));
        }

        tracing::info!(batch_size, "Starting batch card sync...");
        let (records, names) = Self::fetch_catalog(source, settings.catalog_locale).await?;

        let mut report = SyncReport {
            total_cards: records.len(),
            ..Default::default()
        };
        let batch_count = records.len().div_ceil(batch_size);

        for (index, batch) in records.chunks(batch_size).enumerate() {
            let outcomes = join_all(
                batch
                    .iter()
                    .map(|record| Self::sync_record(db, record, &names, settings)),
            )
            .await;

            for outcome in &outcomes {
                report.absorb(outcome);
            }
            report.batch_sizes.push(batch.len());

            tracing::info!(batch = index + 1, batches = batch_count, size = batch.len(), "Processed batch");
        }

        report.success = true;
        Self::log_summary(&report);
        Ok(report)
    }

    /// Fetch des deux locales. Si la locale par défaut est l'anglais, un seul appel suffit.
    async fn fetch_catalog(
        source: &dyn CardSource,
        locale: SearchLanguage,
    ) -> AppResult<(Vec<CatalogCard>, HashMap<i64, String>)> {
        if locale == SearchLanguage::En {
            let records = source.fetch_catalog(SearchLanguage::En).await?;
            let names = Self::build_localized_name_index(&records);
            return Ok((records, names));
        }

        let (records, english) = futures::try_join!(
            source.fetch_catalog(locale),
            source.fetch_catalog(SearchLanguage::En),
        )?;
        let names = Self::build_localized_name_index(&english);

        Ok((records, names))
    }

    async fn sync_record(
        db: &DatabaseConnection,
        record: &CatalogCard,
        names: &HashMap<i64, String>,
        settings: &SyncSettings,
    ) -> AppResult<RecordOutcome> {
        let english_name = names.get(&record.id).unwrap_or(&record.name);

        let result = async {
            let upsert = Self::upsert_card(db, record, english_name, settings.catalog_locale).await?;
            let printings_created =
                Self::upsert_printings(db, upsert.card_id, &record.card_sets, settings.printing_policy)
                    .await?;
            Ok::<_, AppError>(RecordOutcome {
                created: upsert.created,
                printings_created,
            })
        }
        .await;

        if let Err(e) = &result {
            tracing::error!(konami_id = record.id, name = %record.name, error = %e, "Failed to sync card");
        }
        result
    }

    fn log_summary(report: &SyncReport) {
        tracing::info!(
            created = report.cards_created,
            updated = report.cards_updated,
            printings = report.printings_created,
            errors = report.errors,
            total = report.total_cards,
            batches = report.batch_sizes.len(),
            "Sync complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::card_source::CatalogImage;
    use crate::test_support::{dec, setup_db};
    use async_trait::async_trait;

    /// Catalogue figé : une liste par langue
    struct FixtureSource {
        default: Vec<CatalogCard>,
        english: Vec<CatalogCard>,
    }

    #[async_trait]
    impl CardSource for FixtureSource {
        async fn fetch_catalog(&self, language: SearchLanguage) -> AppResult<Vec<CatalogCard>> {
            match language {
                SearchLanguage::En => Ok(self.english.clone()),
                _ => Ok(self.default.clone()),
            }
        }
    }

    struct UnreachableSource;

    #[async_trait]
    impl CardSource for UnreachableSource {
        async fn fetch_catalog(&self, _language: SearchLanguage) -> AppResult<Vec<CatalogCard>> {
            Err(AppError::Upstream("connection refused".to_string()))
        }
    }

    fn set(code: &str, rarity: &str, price: Option<&str>) -> CatalogSet {
        CatalogSet {
            set_name: "Legend of Blue Eyes White Dragon".to_string(),
            set_code: code.to_string(),
            set_rarity: rarity.to_string(),
            set_rarity_code: Some("(C)".to_string()),
            set_price: price.map(str::to_string),
        }
    }

    fn record(id: i64, name: &str, sets: Vec<CatalogSet>) -> CatalogCard {
        CatalogCard {
            id,
            name: name.to_string(),
            card_type: "Normal Monster".to_string(),
            frame_type: "normal".to_string(),
            desc: "A card.".to_string(),
            race: Some("Dragon".to_string()),
            atk: Some(1200),
            def: Some(800),
            level: Some(4),
            attribute: Some("DARK".to_string()),
            archetype: None,
            card_sets: sets,
            card_images: vec![CatalogImage {
                id,
                image_url: format!("https://images.example.com/{}.jpg", id),
                image_url_small: None,
            }],
        }
    }

    fn fixture() -> FixtureSource {
        FixtureSource {
            default: vec![
                record(1, "Blauäugiger w. Drache", vec![set("LOB-DE001", "Ultra Rare", Some("10.50"))]),
                record(2, "Dunkler Magier", vec![set("LOB-DE005", "Ultra Rare", None), set("SDY-DE006", "Common", Some("abc"))]),
                record(3, "Nur Deutsch", vec![]),
            ],
            english: vec![
                record(1, "Blue-Eyes White Dragon", vec![]),
                record(2, "Dark Magician", vec![]),
            ],
        }
    }

    fn settings() -> SyncSettings {
        SyncSettings::default()
    }

    #[test]
    fn name_index_maps_ids() {
        let index = SyncService::build_localized_name_index(&fixture().english);
        assert_eq!(index.get(&1).map(String::as_str), Some("Blue-Eyes White Dragon"));
        assert_eq!(index.get(&3), None);
    }

    #[test]
    fn report_counts_failures_separately() {
        let mut report = SyncReport::default();
        report.absorb(&Ok(RecordOutcome { created: true, printings_created: 2 }));
        report.absorb(&Err(AppError::Conflict("duplicate".to_string())));
        report.absorb(&Ok(RecordOutcome { created: false, printings_created: 0 }));

        assert_eq!(report.cards_created, 1);
        assert_eq!(report.cards_updated, 1);
        assert_eq!(report.printings_created, 2);
        assert_eq!(report.errors, 1);
    }

    #[tokio::test]
    async fn sync_all_creates_cards_and_backfills_english_names() {
        let db = setup_db().await;
        let report = SyncService::sync_all(&db, &fixture(), &settings()).await.unwrap();

        assert!(report.success);
        assert_eq!(report.total_cards, 3);
        assert_eq!(report.cards_created, 3);
        assert_eq!(report.cards_updated, 0);
        assert_eq!(report.printings_created, 3);
        assert_eq!(report.errors, 0);

        let cards = card::Entity::find().order_by_asc(card::Column::KonamiId).all(&db).await.unwrap();
        assert_eq!(cards[0].name, "Blauäugiger w. Drache");
        assert_eq!(cards[0].name_en, "Blue-Eyes White Dragon");
        assert_eq!(cards[0].name_de, "Blauäugiger w. Drache");
        // absent du fetch anglais : nom par défaut
        assert_eq!(cards[2].name_en, "Nur Deutsch");

        let printings = printing::Entity::find().order_by_asc(printing::Column::SetCode).all(&db).await.unwrap();
        assert_eq!(printings[0].set_code, "LOB-DE001");
        assert_eq!(printings[0].price, Some(dec("10.50")));
        assert_eq!(printings[1].price, None); // prix absent
        assert_eq!(printings[2].price, None); // prix illisible
        assert!(printings.iter().all(|p| p.price_updated_at.is_some()));
    }

    #[tokio::test]
    async fn second_sync_is_idempotent() {
        let db = setup_db().await;
        let first = SyncService::sync_all(&db, &fixture(), &settings()).await.unwrap();
        let second = SyncService::sync_all(&db, &fixture(), &settings()).await.unwrap();

        assert_eq!(second.cards_created, 0);
        assert_eq!(second.printings_created, 0);
        assert_eq!(second.cards_updated, first.cards_created);
        assert_eq!(second.total_cards, first.total_cards);
        assert_eq!(card::Entity::find().count(&db).await.unwrap(), 3);
        assert_eq!(printing::Entity::find().count(&db).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn existing_printing_only_gets_price_by_default() {
        let db = setup_db().await;
        SyncService::sync_all(&db, &fixture(), &settings()).await.unwrap();

        let mut changed = fixture();
        changed.default[0].card_sets = vec![set("LOB-DE001", "Secret Rare", Some("12.00"))];
        SyncService::sync_all(&db, &changed, &settings()).await.unwrap();

        let p = printing::Entity::find()
            .filter(printing::Column::SetCode.eq("LOB-DE001"))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.price, Some(dec("12.00")));
        assert_eq!(p.rarity, "Ultra Rare");
    }

    #[tokio::test]
    async fn overwrite_policy_refreshes_rarity() {
        let db = setup_db().await;
        let overwrite = SyncSettings {
            printing_policy: PrintingRefreshPolicy::Overwrite,
            ..SyncSettings::default()
        };
        SyncService::sync_all(&db, &fixture(), &overwrite).await.unwrap();

        let mut changed = fixture();
        changed.default[0].card_sets = vec![set("LOB-DE001", "Secret Rare", Some("12.00"))];
        SyncService::sync_all(&db, &changed, &overwrite).await.unwrap();

        let p = printing::Entity::find()
            .filter(printing::Column::SetCode.eq("LOB-DE001"))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.rarity, "Secret Rare");
    }

    #[tokio::test]
    async fn upsert_card_overwrites_existing_fields() {
        let db = setup_db().await;
        let first = SyncService::upsert_card(&db, &record(7, "Alt", vec![]), "Old", SearchLanguage::De)
            .await
            .unwrap();
        assert!(first.created);

        let mut updated = record(7, "Neu", vec![]);
        updated.atk = None;
        let second = SyncService::upsert_card(&db, &updated, "New", SearchLanguage::De).await.unwrap();

        assert!(!second.created);
        assert_eq!(second.card_id, first.card_id);
        let card = card::Entity::find_by_id(first.card_id).one(&db).await.unwrap().unwrap();
        assert_eq!(card.name, "Neu");
        assert_eq!(card.name_en, "New");
        assert_eq!(card.attack, None);
    }

    #[tokio::test]
    async fn german_name_is_only_written_for_a_german_catalog() {
        let db = setup_db().await;
        let french = SyncService::upsert_card(&db, &record(8, "Magicien Sombre", vec![]), "Dark Magician", SearchLanguage::Fr)
            .await
            .unwrap();
        let card = card::Entity::find_by_id(french.card_id).one(&db).await.unwrap().unwrap();
        assert_eq!(card.name, "Magicien Sombre");
        assert_eq!(card.name_de, "");

        SyncService::upsert_card(&db, &record(8, "Dunkler Magier", vec![]), "Dark Magician", SearchLanguage::De)
            .await
            .unwrap();
        SyncService::upsert_card(&db, &record(8, "Mago Oscuro", vec![]), "Dark Magician", SearchLanguage::It)
            .await
            .unwrap();

        let card = card::Entity::find_by_id(french.card_id).one(&db).await.unwrap().unwrap();
        assert_eq!(card.name, "Mago Oscuro");
        assert_eq!(card.name_de, "Dunkler Magier");
    }

    #[tokio::test]
    async fn unique_violation_is_counted_and_the_run_continues() {
        let db = setup_db().await;
        // contrainte supplémentaire : deux fiches au même nom se heurtent à l'insert
        db.execute_unprepared("CREATE UNIQUE INDEX uq_test_cards_name ON cards (name)")
            .await
            .unwrap();

        SyncService::upsert_card(&db, &record(20, "Kuriboh", vec![]), "Kuriboh", SearchLanguage::De)
            .await
            .unwrap();
        let duplicate =
            SyncService::upsert_card(&db, &record(21, "Kuriboh", vec![]), "Kuriboh", SearchLanguage::De).await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));

        let source = FixtureSource {
            default: vec![
                record(30, "Winged Kuriboh", vec![]),
                record(31, "Winged Kuriboh", vec![]),
                record(32, "Kuriboh Token", vec![]),
            ],
            english: vec![],
        };
        let report = SyncService::sync_in_batches(&db, &source, &settings(), 2).await.unwrap();

        assert!(report.success);
        assert_eq!(report.errors, 1);
        assert_eq!(report.cards_created, 2);
        assert_eq!(report.batch_sizes, vec![2, 1]);
    }

    #[tokio::test]
    async fn batch_sync_splits_into_fixed_batches() {
        let db = setup_db().await;
        let source = FixtureSource {
            default: (1..=5).map(|id| record(id, &format!("Karte {}", id), vec![])).collect(),
            english: vec![],
        };

        let report = SyncService::sync_in_batches(&db, &source, &settings(), 2).await.unwrap();

        assert_eq!(report.batch_sizes, vec![2, 2, 1]);
        assert_eq!(report.cards_created + report.cards_updated, 5);
        assert_eq!(report.errors, 0);
    }

    #[tokio::test]
    async fn batch_size_zero_is_rejected() {
        let db = setup_db().await;
        let result = SyncService::sync_in_batches(&db, &fixture(), &settings(), 0).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn unreachable_source_fails_the_run() {
        let db = setup_db().await;
        let result = SyncService::sync_all(&db, &UnreachableSource, &settings()).await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
        assert_eq!(card::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn record_failures_do_not_abort_the_run() {
        let db = setup_db().await;
        db.execute_unprepared("DROP TABLE printings").await.unwrap();

        let report = SyncService::sync_all(&db, &fixture(), &settings()).await.unwrap();

        assert!(report.success);
        // la carte sans impression passe, les deux autres échouent sur printings
        assert_eq!(report.errors, 2);
        assert_eq!(report.cards_created, 1);
        assert_eq!(report.total_cards, 3);
    }
}
