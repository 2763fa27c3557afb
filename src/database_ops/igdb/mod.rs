pub mod client;
pub mod hit;

pub use client::{CatalogClient, GameCatalog};
pub use hit::CatalogHit;
