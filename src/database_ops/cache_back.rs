use chrono::{TimeZone, Utc};
use futures::{stream, StreamExt};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::ImageSettings;
use crate::database_ops::igdb::CatalogHit;
use crate::database_ops::models::GameRecord;
use crate::database_ops::store::SearchStore;
use crate::normalization::clean_game_name;
use crate::normalization::result::cover_url;

impl GameRecord {
    /// Local cache row for a catalog hit. Optional fields the hit lacks stay `None`.
    pub fn from_catalog_hit(hit: &CatalogHit, images: &ImageSettings) -> Self {
        Self {
            id: hit.id,
            name: clean_game_name(&hit.name),
            display_name: hit.name.clone(),
            description: hit.summary.clone().unwrap_or_default(),
            boxart: cover_url(images, hit.cover_id.as_deref()),
            release_date: hit
                .first_release_ms
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            rating: hit.rating,
            screenshots: hit.screenshots.clone(),
            videos: hit.videos.clone(),
        }
    }
}

/// Tally of one cache-back pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheBackReport {
    pub written: usize,
    pub failed: usize,
}

/// Upsert every hit, `concurrency` at a time. Failures are logged and counted, never
/// returned.
pub async fn write_back(
    store: &dyn SearchStore,
    records: Vec<GameRecord>,
    concurrency: usize,
) -> CacheBackReport {
    let outcomes: Vec<bool> = stream::iter(records)
        .map(|game| async move {
            match store.upsert_game_by_id(&game).await {
                Ok(()) => {
                    info!(game_id = game.id, name = %game.display_name, "cached game from catalog");
                    true
                }
                Err(err) => {
                    warn!(
                        game_id = game.id,
                        name = %game.display_name,
                        error = ?err,
                        "failed to cache game from catalog"
                    );
                    false
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let written = outcomes.iter().filter(|ok| **ok).count();
    CacheBackReport {
        written,
        failed: outcomes.len() - written,
    }
}

/// Run [`write_back`] on its own task. Nothing on the response path waits for it; the
/// handle exists so a CLI run or a test can.
pub fn spawn_write_back(
    store: Arc<dyn SearchStore>,
    records: Vec<GameRecord>,
    concurrency: usize,
) -> JoinHandle<CacheBackReport> {
    tokio::spawn(async move { write_back(store.as_ref(), records, concurrency).await })
}
