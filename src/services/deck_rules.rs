// ============================================================================
// RÈGLES DE COMPOSITION D'UN DECK
// ============================================================================
//
// Limites:
//   - Une impression apparaît au plus 3 fois par zone (quantités cumulées)
//   - MAIN : 40 à 60 cartes, EXTRA : 15 max, SIDE : 15 max
//
// Les tailles de zone sont indicatives : elles produisent des avertissements,
// jamais un refus. La limite de copies est bloquante côté serveur.
//
// ============================================================================

use std::collections::BTreeMap;

use crate::error::{AppError, AppResult};
use crate::models::dto::DeckCardInput;
use crate::models::enums::DeckZone;

pub const MAX_COPIES: i32 = 3;
pub const MAIN_MIN: i32 = 40;
pub const MAIN_MAX: i32 = 60;
pub const EXTRA_MAX: i32 = 15;
pub const SIDE_MAX: i32 = 15;

/// Avertissements sur la taille des zones
pub fn zone_warnings(main: i32, extra: i32, side: i32) -> Vec<String> {
    let mut warnings = Vec::new();
    if main < MAIN_MIN {
        warnings.push(format!("Main deck has {} cards, minimum is {}", main, MAIN_MIN));
    }
    if main > MAIN_MAX {
        warnings.push(format!("Main deck has {} cards, maximum is {}", main, MAIN_MAX));
    }
    if extra > EXTRA_MAX {
        warnings.push(format!("Extra deck has {} cards, maximum is {}", extra, EXTRA_MAX));
    }
    if side > SIDE_MAX {
        warnings.push(format!("Side deck has {} cards, maximum is {}", side, SIDE_MAX));
    }
    warnings
}

/// Vérifie la limite de copies sur une liste de cartes reçue par l'API.
/// Les doublons (même impression, même zone) sont cumulés.
pub fn validate_copy_limits(cards: &[DeckCardInput]) -> AppResult<()> {
    let mut totals: BTreeMap<(DeckZone, i32), i32> = BTreeMap::new();
    for card in cards {
        if card.quantity < 1 {
            return Err(AppError::BadRequest(format!(
                "Quantity of printing {} must be at least 1",
                card.printing_id
            )));
        }
        *totals.entry((card.zone, card.printing_id)).or_default() += card.quantity;
    }

    match totals.into_iter().find(|(_, quantity)| *quantity > MAX_COPIES) {
        Some(((zone, printing_id), quantity)) => Err(AppError::BadRequest(format!(
            "Printing {} appears {} times in the {:?} deck, the limit is {}",
            printing_id, quantity, zone, MAX_COPIES
        ))),
        None => Ok(()),
    }
}

/// Résultat d'un ajout dans le builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    CopyLimitReached,
}

/// État d'un deck en construction : zone -> impression -> quantité.
///
/// `add` s'arrête à la limite de copies, `remove` décrémente et retire
/// l'impression à zéro. Une zone trop grande ne produit qu'un avertissement.
#[derive(Debug, Clone, Default)]
pub struct DeckBuilder {
    zones: BTreeMap<DeckZone, BTreeMap<i32, i32>>,
}

impl DeckBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reprend un deck existant. Les quantités au-delà de la limite de copies sont tronquées.
    pub fn from_cards(cards: &[DeckCardInput]) -> Self {
        let mut builder = Self::new();
        for card in cards {
            for _ in 0..card.quantity {
                builder.add(card.printing_id, card.zone);
            }
        }
        builder
    }

    pub fn add(&mut self, printing_id: i32, zone: DeckZone) -> AddOutcome {
        let quantity = self.zones.entry(zone).or_default().entry(printing_id).or_insert(0);
        if *quantity >= MAX_COPIES {
            return AddOutcome::CopyLimitReached;
        }
        *quantity += 1;
        AddOutcome::Added
    }

    /// Retire une copie. Retourne false si l'impression n'était pas dans la zone.
    pub fn remove(&mut self, printing_id: i32, zone: DeckZone) -> bool {
        let Some(cards) = self.zones.get_mut(&zone) else {
            return false;
        };
        let Some(quantity) = cards.get_mut(&printing_id) else {
            return false;
        };

        *quantity -= 1;
        if *quantity <= 0 {
            cards.remove(&printing_id);
        }
        true
    }

    pub fn quantity(&self, printing_id: i32, zone: DeckZone) -> i32 {
        self.zones
            .get(&zone)
            .and_then(|cards| cards.get(&printing_id))
            .copied()
            .unwrap_or(0)
    }

    pub fn zone_count(&self, zone: DeckZone) -> i32 {
        self.zones.get(&zone).map(|cards| cards.values().sum()).unwrap_or(0)
    }

    pub fn warnings(&self) -> Vec<String> {
        zone_warnings(
            self.zone_count(DeckZone::Main),
            self.zone_count(DeckZone::Extra),
            self.zone_count(DeckZone::Side),
        )
    }

    /// Liste des cartes au format de l'API, triée par zone puis impression
    pub fn to_cards(&self) -> Vec<DeckCardInput> {
        self.zones
            .iter()
            .flat_map(|(zone, cards)| {
                cards.iter().map(move |(printing_id, quantity)| DeckCardInput {
                    printing_id: *printing_id,
                    quantity: *quantity,
                    zone: *zone,
                })
            })
            .collect()
    }
}
