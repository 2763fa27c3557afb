use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::config::CatalogSettings;
use crate::database_ops::igdb::hit::CatalogHit;

/// Fields requested for every search hit.
pub const CATALOG_SEARCH_FIELDS: &[&str] = &[
    "name",
    "summary",
    "release_dates",
    "cover",
    "rating",
    "screenshots",
    "videos",
    "developers",
    "publishers",
];
/// Category 0 is "main game" (no DLC, expansions or bundles).
const MAIN_GAME_CATEGORY: &str = "0";
const API_KEY_HEADER: &str = "X-Mashape-Key";

/// A remote game catalog the search can fall back to.
#[async_trait]
pub trait GameCatalog: Send + Sync {
    /// Games matching `query` for the given 1-based result page.
    async fn search_games(&self, query: &str, page: u32) -> Result<Vec<CatalogHit>>;
}

/// HTTP client for the IGDB catalog as exposed through the Mashape gateway.
pub struct CatalogClient {
    cfg: CatalogSettings,
    page_size: usize,
    http: Client,
}

impl CatalogClient {
    /// `page_size` is the site's results-per-page; the request offset is
    /// `page * page_size`.
    pub fn new(cfg: CatalogSettings, page_size: usize) -> Result<Self> {
        let http = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.timeout)
            .build()
            .context("failed to construct catalog HTTP client")?;
        Ok(Self {
            cfg,
            page_size,
            http,
        })
    }

    /// Full search URL for one query/page.
    pub fn search_url(&self, query: &str, page: u32) -> Result<Url> {
        let mut url = Url::parse(&self.cfg.base_url)
            .with_context(|| format!("invalid catalog base url {}", self.cfg.base_url))?;
        let offset = page as usize * self.page_size;
        url.query_pairs_mut()
            .append_pair("fields", &CATALOG_SEARCH_FIELDS.join(","))
            .append_pair("limit", &self.cfg.max_per_query.to_string())
            .append_pair("offset", &offset.to_string())
            .append_pair("search", query)
            .append_pair("filter[category][eq]", MAIN_GAME_CATEGORY);
        Ok(url)
    }
}

#[async_trait]
impl GameCatalog for CatalogClient {
    #[instrument(skip(self))]
    async fn search_games(&self, query: &str, page: u32) -> Result<Vec<CatalogHit>> {
        let api_key = self
            .cfg
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("missing env: CATALOG_API_KEY (required for catalog search)"))?;
        let url = self.search_url(query, page)?;

        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .context("catalog search request")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "catalog search failed (status={}): {}",
                status,
                text
            ));
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)
            .map_err(|err| anyhow!("failed to parse catalog payload ({err}): {text}"))?;
        let hits = parse_search_body(&body)?;
        debug!(hits = hits.len(), "catalog search ok");
        Ok(hits)
    }
}

/// Decode a search response body. The body must be a JSON array; elements that cannot
/// be used are skipped.
pub fn parse_search_body(body: &Value) -> Result<Vec<CatalogHit>> {
    let items = body
        .as_array()
        .ok_or_else(|| anyhow!("catalog payload is not an array"))?;
    let mut hits = Vec::with_capacity(items.len());
    for item in items {
        match CatalogHit::from_value(item) {
            Some(hit) => hits.push(hit),
            None => debug!(item = %item, "skipping catalog element without id/name"),
        }
    }
    Ok(hits)
}
