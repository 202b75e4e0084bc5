pub mod analysis;
pub mod config;
pub mod dice;
pub mod expected;
pub mod game;
pub mod ledger;
pub mod patterns;
pub mod player;
pub mod scoring;
pub mod selector;
pub mod strategy;
pub mod turn;
