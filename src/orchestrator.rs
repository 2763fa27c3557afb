//! Search entry point: local lookups, catalog fallback, cache-back, merge.
//!
//! A search never fails from the caller's point of view. Each backend that misbehaves
//! is logged and contributes nothing; [`SearchOutcome::failures`] records which ones
//! did for callers that want to tell "nothing matched" from "something broke".

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::config::{AppConfig, SearchSettings};
use crate::database_ops::cache_back::{spawn_write_back, CacheBackReport};
use crate::database_ops::db::Db;
use crate::database_ops::igdb::{CatalogClient, CatalogHit, GameCatalog};
use crate::database_ops::models::GameRecord;
use crate::database_ops::search::{search_local, LookupScope};
use crate::database_ops::store::SearchStore;
use crate::normalization::{
    normalize, normalize_user, normalize_user_brief, normalize_users, SearchResult, SourceRecord,
};

/// Queries shorter than this (in characters, after trimming) are not searched.
pub const MIN_QUERY_CHARS: usize = 3;

/// The `type` filter of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    #[default]
    All,
    Users,
    Games,
}

impl SearchScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchScope::All => "all",
            SearchScope::Users => "users",
            SearchScope::Games => "games",
        }
    }
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(SearchScope::All),
            "users" => Ok(SearchScope::Users),
            "games" => Ok(SearchScope::Games),
            other => Err(format!("unknown search type '{other}' (all|users|games)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    /// 1-based.
    pub page: u32,
    pub include_users: bool,
    pub include_games: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, page: u32, scope: SearchScope) -> Self {
        Self {
            query: query.into(),
            page,
            include_users: matches!(scope, SearchScope::All | SearchScope::Users),
            include_games: matches!(scope, SearchScope::All | SearchScope::Games),
        }
    }

    /// The searchable form of the query, or `None` when the request must not run.
    pub fn validated_query(&self) -> Option<&str> {
        let query = self.query.trim();
        if self.page < 1 || query.chars().count() < MIN_QUERY_CHARS {
            None
        } else {
            Some(query)
        }
    }
}

/// A backend that contributed nothing because it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchFailure {
    LocalUsers,
    LocalGames,
    Catalog,
}

#[derive(Debug, Default)]
pub struct SearchOutcome {
    /// Users first, then games, each in source order.
    pub results: Vec<SearchResult>,
    pub failures: Vec<SearchFailure>,
    /// Pending cache-back writes for catalog hits, if any were found.
    pub cache_back: Option<JoinHandle<CacheBackReport>>,
}

pub struct SearchOrchestrator {
    store: Arc<dyn SearchStore>,
    catalog: Arc<dyn GameCatalog>,
    settings: SearchSettings,
}

impl SearchOrchestrator {
    pub fn new(
        store: Arc<dyn SearchStore>,
        catalog: Arc<dyn GameCatalog>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            store,
            catalog,
            settings,
        }
    }

    /// Open the local store and wire the HTTP catalog client from configuration.
    pub async fn from_config(cfg: &AppConfig) -> Result<(Db, Self)> {
        let db = Db::connect(&cfg.store.database_url, cfg.store.max_connections).await?;
        let catalog = CatalogClient::new(cfg.catalog.clone(), cfg.search.results_per_page)?;
        if cfg.catalog.api_key.is_none() {
            warn!("CATALOG_API_KEY not set; game searches with no local hits will come back empty");
        }
        let orchestrator = Self::new(
            Arc::new(db.clone()),
            Arc::new(catalog),
            cfg.search.clone(),
        );
        Ok((db, orchestrator))
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Merged results for `req`; never fails.
    pub async fn search(&self, req: &SearchRequest) -> Vec<SearchResult> {
        // Dropping the handle detaches the cache-back task.
        self.search_detailed(req).await.results
    }

    #[instrument(skip(self, req), fields(query = %req.query, page = req.page))]
    pub async fn search_detailed(&self, req: &SearchRequest) -> SearchOutcome {
        let Some(query) = req.validated_query() else {
            debug!("query too short or page out of range; not searching");
            return SearchOutcome::default();
        };

        let scope = LookupScope {
            users: req.include_users,
            games: req.include_games,
        };
        let mut local = search_local(
            self.store.as_ref(),
            query,
            scope,
            self.settings.max_local_results,
        )
        .await;

        let mut outcome = SearchOutcome::default();
        let (users, users_failed) = local.users_or_empty();
        let (games, games_failed) = local.games_or_empty();
        if users_failed {
            outcome.failures.push(SearchFailure::LocalUsers);
        }
        if games_failed {
            outcome.failures.push(SearchFailure::LocalGames);
        }

        let images = &self.settings.images;
        debug!(users = users.len(), games = games.len(), "local results");
        outcome.results = normalize_users(users, images, normalize_user).await;
        let local_games = games
            .iter()
            .map(|g| normalize(SourceRecord::LocalGame(g), images));
        outcome.results.extend(local_games);

        if req.include_games && games.is_empty() {
            match self.fetch_remote(query, req.page).await {
                Ok(hits) => {
                    info!(hits = hits.len(), "no local games; using catalog results");
                    let remote = hits
                        .iter()
                        .map(|h| normalize(SourceRecord::RemoteGame(h), images));
                    outcome.results.extend(remote);
                    outcome.cache_back = self.cache_back(&hits);
                }
                Err(err) => {
                    warn!(error = ?err, "catalog search failed; using local results only");
                    outcome.failures.push(SearchFailure::Catalog);
                }
            }
        }

        outcome
    }

    /// Local-only lookup for type-ahead: users (with taglines) then games, no catalog
    /// call and no minimum length beyond a non-blank query.
    pub async fn quick_search(&self, text: &str) -> Vec<SearchResult> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        let mut local = search_local(
            self.store.as_ref(),
            text,
            LookupScope {
                users: true,
                games: true,
            },
            self.settings.max_local_results,
        )
        .await;
        let (users, _) = local.users_or_empty();
        let (games, _) = local.games_or_empty();
        let images = &self.settings.images;
        let mut results = normalize_users(users, images, normalize_user_brief).await;
        let local_games = games
            .iter()
            .map(|g| normalize(SourceRecord::LocalGame(g), images));
        results.extend(local_games);
        results
    }

    async fn fetch_remote(&self, query: &str, page: u32) -> Result<Vec<CatalogHit>> {
        let timeout = self.settings.catalog_timeout;
        tokio::time::timeout(timeout, self.catalog.search_games(query, page))
            .await
            .map_err(|_| anyhow!("catalog search timed out after {:?}", timeout))?
    }

    fn cache_back(&self, hits: &[CatalogHit]) -> Option<JoinHandle<CacheBackReport>> {
        if hits.is_empty() {
            return None;
        }
        let records: Vec<GameRecord> = hits
            .iter()
            .map(|h| GameRecord::from_catalog_hit(h, &self.settings.images))
            .collect();
        Some(spawn_write_back(
            Arc::clone(&self.store),
            records,
            self.settings.cache_back_concurrency,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalization::ResultKind;
    use crate::testing::{game_record, user_record, FakeCatalog, FlakyStore};
    use std::time::Duration;

    struct Harness {
        store: Arc<FlakyStore>,
        catalog: Arc<FakeCatalog>,
        orchestrator: SearchOrchestrator,
    }

    fn settings() -> SearchSettings {
        SearchSettings {
            catalog_timeout: Duration::from_millis(50),
            ..SearchSettings::default()
        }
    }

    async fn seeded_db() -> Db {
        let db = Db::connect_in_memory().await.unwrap();
        for (u, d) in [("halofan", "HaloFan"), ("halo_queen", "Queen"), ("zelda", "Link")] {
            db.insert_user(&user_record(u, d)).await.unwrap();
        }
        db
    }

    fn harness(store: FlakyStore, catalog: FakeCatalog) -> Harness {
        let store = Arc::new(store);
        let catalog = Arc::new(catalog);
        let orchestrator = SearchOrchestrator::new(
            store.clone() as Arc<dyn SearchStore>,
            catalog.clone() as Arc<dyn GameCatalog>,
            settings(),
        );
        Harness {
            store,
            catalog,
            orchestrator,
        }
    }

    #[test]
    fn scope_maps_to_flags_and_parses() {
        let r = SearchRequest::new("abc", 1, SearchScope::Users);
        assert!(r.include_users && !r.include_games);
        let r = SearchRequest::new("abc", 1, SearchScope::All);
        assert!(r.include_users && r.include_games);
        assert_eq!("Games".parse::<SearchScope>(), Ok(SearchScope::Games));
        assert!("everything".parse::<SearchScope>().is_err());
    }

    #[test]
    fn validation_counts_characters_after_trimming() {
        assert!(SearchRequest::new("  ab  ", 1, SearchScope::All).validated_query().is_none());
        assert_eq!(
            SearchRequest::new(" ōka ", 1, SearchScope::All).validated_query(),
            Some("ōka")
        );
        assert!(SearchRequest::new("halo", 0, SearchScope::All).validated_query().is_none());
    }

    #[tokio::test]
    async fn short_queries_touch_nothing() {
        let h = harness(FlakyStore::new(seeded_db().await), FakeCatalog::empty());
        for q in ["", "h", "ha", "  ha  "] {
            let out = h
                .orchestrator
                .search(&SearchRequest::new(q, 1, SearchScope::All))
                .await;
            assert!(out.is_empty());
        }
        assert_eq!(h.store.call_count(), 0);
        assert_eq!(h.catalog.call_count(), 0);
    }

    #[tokio::test]
    async fn page_zero_touches_nothing() {
        let h = harness(FlakyStore::new(seeded_db().await), FakeCatalog::empty());
        let out = h
            .orchestrator
            .search(&SearchRequest::new("halo", 0, SearchScope::All))
            .await;
        assert!(out.is_empty());
        assert_eq!(h.store.call_count(), 0);
    }

    #[tokio::test]
    async fn users_only_returns_users_in_local_order() {
        let h = harness(
            FlakyStore::new(seeded_db().await),
            FakeCatalog::with_hits(vec![CatalogHit::named(1, "Halo")]),
        );
        let out = h
            .orchestrator
            .search(&SearchRequest::new("halo", 1, SearchScope::Users))
            .await;
        assert!(out.iter().all(|r| r.kind == ResultKind::User));
        assert_eq!(
            out.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            vec!["HaloFan", "Queen"]
        );
        assert_eq!(h.catalog.call_count(), 0);
    }

    #[tokio::test]
    async fn users_precede_games_and_local_games_skip_the_catalog() {
        let db = seeded_db().await;
        db.upsert_game_by_id(&game_record(5, "Halo Infinite")).await.unwrap();
        let catalog = FakeCatalog::with_hits(vec![CatalogHit::named(1, "X")]);
        let h = harness(FlakyStore::new(db), catalog);

        let out = h
            .orchestrator
            .search(&SearchRequest::new("halo", 1, SearchScope::All))
            .await;
        let kinds: Vec<_> = out.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![ResultKind::User, ResultKind::User, ResultKind::Game]);
        assert_eq!(out[2].name, "Halo Infinite");
        assert_eq!(h.catalog.call_count(), 0);
    }

    #[tokio::test]
    async fn identical_searches_give_identical_lists() {
        let db = seeded_db().await;
        db.upsert_game_by_id(&game_record(5, "Halo 2")).await.unwrap();
        db.upsert_game_by_id(&game_record(6, "Halo 3")).await.unwrap();
        let h = harness(FlakyStore::new(db), FakeCatalog::empty());
        let req = SearchRequest::new("halo", 1, SearchScope::All);
        let first = h.orchestrator.search(&req).await;
        let second = h.orchestrator.search(&req).await;
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[tokio::test]
    async fn catalog_hits_are_cached_for_later_local_searches() {
        let h = harness(
            FlakyStore::new(Db::connect_in_memory().await.unwrap()),
            FakeCatalog::with_hits(vec![CatalogHit::named(42, "Foo")]),
        );
        let req = SearchRequest::new("Foo", 1, SearchScope::Games);

        let outcome = h.orchestrator.search_detailed(&req).await;
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].name, "Foo");
        assert_eq!(outcome.results[0].image, settings().images.fallback_boxart);
        let report = outcome.cache_back.expect("cache-back task").await.unwrap();
        assert_eq!(report.written, 1);

        let cached = h.store.inner().find_games_by_name_prefix("foo", 10).await.unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].id, 42);

        let again = h.orchestrator.search(&req).await;
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].name, "Foo");
        assert_eq!(h.catalog.call_count(), 1, "second search served locally");
    }

    #[tokio::test]
    async fn catalog_timeout_still_returns_users() {
        let h = harness(FlakyStore::new(seeded_db().await), FakeCatalog::hanging());
        let outcome = h
            .orchestrator
            .search_detailed(&SearchRequest::new("halo", 1, SearchScope::All))
            .await;
        assert_eq!(outcome.results.len(), 2);
        assert!(outcome.results.iter().all(|r| r.kind == ResultKind::User));
        assert_eq!(outcome.failures, vec![SearchFailure::Catalog]);
        assert!(outcome.cache_back.is_none());
    }

    #[tokio::test]
    async fn catalog_error_is_contained() {
        let h = harness(FlakyStore::new(seeded_db().await), FakeCatalog::failing());
        let out = h
            .orchestrator
            .search(&SearchRequest::new("zelda", 1, SearchScope::All))
            .await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Link");
    }

    #[tokio::test]
    async fn failed_user_lookup_keeps_games() {
        let db = seeded_db().await;
        db.upsert_game_by_id(&game_record(5, "Halo Wars")).await.unwrap();
        let h = harness(FlakyStore::new(db).failing_users(), FakeCatalog::empty());
        let outcome = h
            .orchestrator
            .search_detailed(&SearchRequest::new("halo", 1, SearchScope::All))
            .await;
        assert_eq!(outcome.failures, vec![SearchFailure::LocalUsers]);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].name, "Halo Wars");
    }

    #[tokio::test]
    async fn failed_game_lookup_falls_back_to_the_catalog() {
        let h = harness(
            FlakyStore::new(seeded_db().await).failing_games(),
            FakeCatalog::with_hits(vec![CatalogHit::named(3, "Halo CE")]),
        );
        let outcome = h
            .orchestrator
            .search_detailed(&SearchRequest::new("halo", 1, SearchScope::All))
            .await;
        assert_eq!(outcome.failures, vec![SearchFailure::LocalGames]);
        let names: Vec<_> = outcome.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["HaloFan", "Queen", "Halo CE"]);
        assert_eq!(h.catalog.call_count(), 1);
    }

    #[tokio::test]
    async fn cache_back_failure_does_not_change_results() {
        let h = harness(
            FlakyStore::new(Db::connect_in_memory().await.unwrap()).failing_upsert_of(2),
            FakeCatalog::with_hits(vec![
                CatalogHit::named(1, "Metro"),
                CatalogHit::named(2, "Metro 2033"),
            ]),
        );
        let outcome = h
            .orchestrator
            .search_detailed(&SearchRequest::new("metro", 1, SearchScope::Games))
            .await;
        let names: Vec<_> = outcome.results.iter().map(|r| r.name.clone()).collect();
        assert_eq!(names, vec!["Metro", "Metro 2033"]);
        let report = outcome.cache_back.expect("cache-back task").await.unwrap();
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn nothing_requested_is_an_empty_result() {
        let h = harness(FlakyStore::new(seeded_db().await), FakeCatalog::empty());
        let req = SearchRequest {
            query: "halo".into(),
            page: 1,
            include_users: false,
            include_games: false,
        };
        assert!(h.orchestrator.search(&req).await.is_empty());
        assert_eq!(h.catalog.call_count(), 0);
    }

    #[tokio::test]
    async fn quick_search_is_local_and_uses_taglines() {
        let db = seeded_db().await;
        db.upsert_game_by_id(&game_record(9, "Halo Reach")).await.unwrap();
        let catalog = FakeCatalog::with_hits(vec![CatalogHit::named(1, "X")]);
        let h = harness(FlakyStore::new(db), catalog);
        let out = h.orchestrator.quick_search("ha").await;
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].description, "HaloFan plays a lot");
        assert_eq!(out[2].kind, ResultKind::Game);
        assert!(h.orchestrator.quick_search("   ").await.is_empty());
        assert_eq!(h.catalog.call_count(), 0);
    }
}
