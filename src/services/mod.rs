pub mod auth_service;
pub mod card_service;
pub mod card_source;
pub mod collection_service;
pub mod deck_rules;
pub mod deck_service;
pub mod sync_service;
pub mod valuation_service;
