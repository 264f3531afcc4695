pub mod api;
pub mod card;
pub mod cards;
pub mod config;
pub mod deck;
pub mod equity;
pub mod evaluator;
pub mod hand;
pub mod ledger;
pub mod rank;
pub mod result;
pub mod settlement;
pub mod suite;
