use rust_decimal::{Decimal, RoundingStrategy};

/// Arrondi au centime, demi-valeur arrondie loin de zéro (2.675 -> 2.68, -2.675 -> -2.68)
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Prix YGOPRODeck ("1.23"). Absent, vide ou illisible => None
pub fn parse_price(raw: Option<&str>) -> Option<Decimal> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<Decimal>().ok()
}

/// Prix reçu en JSON (f64) vers Decimal, arrondi au centime
pub fn price_from_f64(value: f64) -> Option<Decimal> {
    Decimal::from_f64_retain(value).map(round_cents)
}
