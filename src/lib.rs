//! Search core of the WASD With Me site: local user/game lookups, the IGDB catalog
//! fallback with cache-back into the local store, result normalization and paging.

pub mod api;
pub mod config;
pub mod database_ops;
pub mod logging;
pub mod normalization;
pub mod orchestrator;
pub mod pagination;

pub mod util {
    pub mod env;
}

#[cfg(test)]
pub(crate) mod testing;

pub use normalization::{ResultKind, SearchResult};
pub use orchestrator::{SearchOrchestrator, SearchRequest, SearchScope};
