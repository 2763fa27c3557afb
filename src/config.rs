//! Application configuration assembled from the environment.
//!
//! Every value has a default so a bare checkout can start against a local SQLite file;
//! only the catalog API key has no sensible default. The resulting [`AppConfig`] is
//! passed by value into the orchestrator and catalog client, nothing reads env later.

use std::path::PathBuf;
use std::time::Duration;

use crate::util::env::{env_opt, env_parse, log_snapshot};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://wasd.db?mode=rwc";
pub const DEFAULT_CATALOG_API_URL: &str =
    "https://igdbcom-internet-game-database-v1.p.mashape.com/games/";
pub const DEFAULT_CATALOG_IMAGE_BASE: &str = "https://res.cloudinary.com/igdb/image/upload";
pub const DEFAULT_GAME_NOT_FOUND_BOXART: &str =
    "https://static-cdn.jtvnw.net/ttv-static/404_boxart-136x190.jpg";
pub const DEFAULT_PROFILE_PLACEHOLDER: &str = "/images/placeholder.png";

/// Where result images come from.
#[derive(Debug, Clone)]
pub struct ImageSettings {
    /// Base URL that cover ids are appended to (`<base>/t_cover_big/<id>.jpg`).
    pub cover_base: String,
    /// Boxart used for games without cover art.
    pub fallback_boxart: String,
    /// Directory served as `/`; profile pictures live under `images/profile/`.
    pub public_dir: PathBuf,
    pub profile_placeholder: String,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            cover_base: DEFAULT_CATALOG_IMAGE_BASE.to_string(),
            fallback_boxart: DEFAULT_GAME_NOT_FOUND_BOXART.to_string(),
            public_dir: PathBuf::from("public"),
            profile_placeholder: DEFAULT_PROFILE_PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub results_per_page: usize,
    /// Upper bound on rows returned by each local lookup.
    pub max_local_results: i64,
    /// Hard bound on the catalog call, whatever the catalog implementation does.
    pub catalog_timeout: Duration,
    /// Concurrent upserts issued by one cache-back task.
    pub cache_back_concurrency: usize,
    pub images: ImageSettings,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            results_per_page: 5,
            max_local_results: 200,
            catalog_timeout: Duration::from_millis(5_000),
            cache_back_concurrency: 4,
            images: ImageSettings::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    /// `limit` sent with every catalog search.
    pub max_per_query: u32,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_API_URL.to_string(),
            api_key: None,
            max_per_query: 50,
            timeout: Duration::from_millis(5_000),
            user_agent: "wasd-with-me-search/0.1".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub database_url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub allowed_origins: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub search: SearchSettings,
    pub catalog: CatalogSettings,
    pub store: StoreSettings,
    pub server: ServerSettings,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let search_defaults = SearchSettings::default();
        let catalog_defaults = CatalogSettings::default();
        let timeout_ms: u64 = env_parse("CATALOG_TIMEOUT_MS", 5_000u64);
        let timeout = Duration::from_millis(timeout_ms.max(1));

        let images = ImageSettings {
            cover_base: env_opt("CATALOG_IMAGE_BASE")
                .unwrap_or(search_defaults.images.cover_base)
                .trim_end_matches('/')
                .to_string(),
            fallback_boxart: env_opt("GAME_NOT_FOUND_BOXART")
                .unwrap_or(search_defaults.images.fallback_boxart),
            public_dir: env_opt("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(search_defaults.images.public_dir),
            profile_placeholder: search_defaults.images.profile_placeholder,
        };

        let search = SearchSettings {
            results_per_page: env_parse("RESULTS_PER_PAGE", search_defaults.results_per_page)
                .max(1),
            max_local_results: env_parse("MAX_LOCAL_RESULTS", search_defaults.max_local_results)
                .max(1),
            catalog_timeout: timeout,
            cache_back_concurrency: env_parse(
                "CACHE_BACK_CONCURRENCY",
                search_defaults.cache_back_concurrency,
            )
            .max(1),
            images,
        };

        let catalog = CatalogSettings {
            base_url: env_opt("CATALOG_API_URL").unwrap_or(catalog_defaults.base_url),
            api_key: env_opt("CATALOG_API_KEY"),
            max_per_query: env_parse("CATALOG_MAX_PER_QUERY", catalog_defaults.max_per_query)
                .max(1),
            timeout,
            user_agent: env_opt("CATALOG_USER_AGENT").unwrap_or(catalog_defaults.user_agent),
        };

        let store = StoreSettings {
            database_url: env_opt("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            max_connections: env_parse("DB_MAX_CONNS", 5u32).max(1),
        };

        let server = ServerSettings {
            host: env_opt("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env_parse("API_PORT", 8080u16),
            allowed_origins: env_opt("ALLOWED_ORIGINS")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
        };

        Self {
            search,
            catalog,
            store,
            server,
        }
    }

    /// Emit the effective configuration once at startup, secrets masked.
    pub fn log_snapshot(&self) {
        log_snapshot(
            "wasd-with-me",
            &[
                ("DATABASE_URL", self.store.database_url.clone()),
                ("DB_MAX_CONNS", self.store.max_connections.to_string()),
                ("RESULTS_PER_PAGE", self.search.results_per_page.to_string()),
                ("MAX_LOCAL_RESULTS", self.search.max_local_results.to_string()),
                ("CATALOG_API_URL", self.catalog.base_url.clone()),
                (
                    "CATALOG_API_KEY",
                    self.catalog.api_key.clone().unwrap_or_default(),
                ),
                ("CATALOG_MAX_PER_QUERY", self.catalog.max_per_query.to_string()),
                (
                    "CATALOG_TIMEOUT_MS",
                    self.catalog.timeout.as_millis().to_string(),
                ),
                (
                    "PUBLIC_DIR",
                    self.search.images.public_dir.display().to_string(),
                ),
                ("API_PORT", self.server.port.to_string()),
            ],
        );
    }
}
