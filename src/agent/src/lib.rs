pub mod player;
pub mod strategy;
