// Test doubles shared by the module tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::config::ImageSettings;
use crate::database_ops::db::Db;
use crate::database_ops::igdb::{CatalogHit, GameCatalog};
use crate::database_ops::models::{GameRecord, UserRecord};
use crate::database_ops::store::SearchStore;

pub fn user_record(username: &str, display_name: &str) -> UserRecord {
    UserRecord {
        username: username.to_string(),
        display_name: display_name.to_string(),
        tagline: Some(format!("{display_name} plays a lot")),
        bio: Some(format!("bio of {display_name}")),
    }
}

pub fn game_record(id: i64, display_name: &str) -> GameRecord {
    GameRecord::from_catalog_hit(&CatalogHit::named(id, display_name), &ImageSettings::default())
}

/// Wraps a real store, counts calls, and fails the operations it is told to.
pub struct FlakyStore {
    inner: Db,
    fail_users: bool,
    fail_games: bool,
    fail_upsert_id: Option<i64>,
    pub calls: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: Db) -> Self {
        Self {
            inner,
            fail_users: false,
            fail_games: false,
            fail_upsert_id: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_users(mut self) -> Self {
        self.fail_users = true;
        self
    }

    pub fn failing_games(mut self) -> Self {
        self.fail_games = true;
        self
    }

    pub fn failing_upsert_of(mut self, id: i64) -> Self {
        self.fail_upsert_id = Some(id);
        self
    }

    pub fn inner(&self) -> &Db {
        &self.inner
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchStore for FlakyStore {
    async fn find_users_by_name_prefix(&self, text: &str, limit: i64) -> Result<Vec<UserRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_users {
            return Err(anyhow!("users collection unavailable"));
        }
        self.inner.find_users_by_name_prefix(text, limit).await
    }

    async fn find_games_by_name_prefix(&self, text: &str, limit: i64) -> Result<Vec<GameRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_games {
            return Err(anyhow!("games collection unavailable"));
        }
        self.inner.find_games_by_name_prefix(text, limit).await
    }

    async fn upsert_game_by_id(&self, game: &GameRecord) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_upsert_id == Some(game.id) {
            return Err(anyhow!("write rejected for game {}", game.id));
        }
        self.inner.upsert_game_by_id(game).await
    }
}

enum Reply {
    Hits(Vec<CatalogHit>),
    Fail,
    Hang,
}

/// Scripted catalog that records how often it was asked.
pub struct FakeCatalog {
    reply: Reply,
    calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn with_hits(hits: Vec<CatalogHit>) -> Self {
        Self {
            reply: Reply::Hits(hits),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::with_hits(Vec::new())
    }

    pub fn failing() -> Self {
        Self {
            reply: Reply::Fail,
            calls: AtomicUsize::new(0),
        }
    }

    /// Never answers within any reasonable timeout.
    pub fn hanging() -> Self {
        Self {
            reply: Reply::Hang,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GameCatalog for FakeCatalog {
    async fn search_games(&self, _query: &str, _page: u32) -> Result<Vec<CatalogHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Reply::Hits(hits) => Ok(hits.clone()),
            Reply::Fail => Err(anyhow!("catalog search failed (status=503)")),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(Vec::new())
            }
        }
    }
}
