// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque entité correspond à une table gérée avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - enums : Tier, langue, état, édition, portfolio, zone de deck
//   - users : Utilisateurs (email + username uniques, tier FREE/PRO)
//   - card : Cartes du catalogue, clé naturelle konami_id
//   - printing : Impressions d'une carte dans un set, unique (card_id, set_code)
//   - collection_item : Possessions d'un utilisateur, clé naturelle à 5 colonnes
//   - deck / deck_card : Decks et leurs cartes par zone
//   - dto : Data Transfer Objects des requêtes et réponses API
//
// Points d'attention:
//   - Cartes et impressions ne sont écrites que par la synchronisation
//   - Supprimer un deck supprime ses cartes
//   - Les enums sont stockés en texte (valeurs SCREAMING_SNAKE_CASE)
//
// ============================================================================

pub mod card;
pub mod collection_item;
pub mod deck;
pub mod deck_card;
pub mod dto;
pub mod enums;
pub mod health;
pub mod printing;
pub mod users;
