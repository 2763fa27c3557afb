use anyhow::Result;
use async_trait::async_trait;

use crate::database_ops::models::{GameRecord, UserRecord};

/// Local persistence the search reads from and caches into.
///
/// "Name prefix" follows the document-store regex the site used (`term.*`, unanchored),
/// so implementations match names that contain `text`, case-insensitively, and return
/// rows in their natural (insertion) order.
#[async_trait]
pub trait SearchStore: Send + Sync {
    async fn find_users_by_name_prefix(&self, text: &str, limit: i64) -> Result<Vec<UserRecord>>;

    async fn find_games_by_name_prefix(&self, text: &str, limit: i64) -> Result<Vec<GameRecord>>;

    /// Insert the game, or overwrite the row that already carries `game.id`.
    async fn upsert_game_by_id(&self, game: &GameRecord) -> Result<()>;
}
