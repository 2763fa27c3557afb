// HTTP request handlers for API endpoints

use actix_web::{web, HttpResponse, Result};
use std::time::Instant;

use crate::api::models::*;
use crate::database_ops::db::Db;
use crate::orchestrator::{SearchOrchestrator, SearchRequest};
use crate::pagination::{page_count, SearchPage};

/// Shared per-process state handed to every handler.
pub struct AppState {
    pub db: Db,
    pub orchestrator: SearchOrchestrator,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: Db, orchestrator: SearchOrchestrator) -> Self {
        Self {
            db,
            orchestrator,
            started_at: Instant::now(),
        }
    }
}

/// Health check endpoint
pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    let db_status = match state.db.ping().await {
        Ok(()) => "connected",
        Err(_) => "disconnected",
    };

    let response = ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        database: db_status.to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    });

    Ok(HttpResponse::Ok().json(response))
}

/// Full search: local users/games with catalog fallback, one page at a time.
pub async fn search(
    params: web::Query<SearchParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let params = params.into_inner();
    let query = params.query.unwrap_or_default();
    let not_found = HttpResponse::NotFound().json(ApiResponse::<()>::error(format!(
        "We did not find any results for '{}'.",
        query
    )));

    let page = match params.page.map(u32::try_from).unwrap_or(Ok(1)) {
        Ok(page) if page >= 1 => page,
        _ => return Ok(not_found),
    };

    tracing::info!(query = %query, scope = %params.scope, page, "search requested");

    let request = SearchRequest::new(query.clone(), page, params.scope);
    let results = state.orchestrator.search(&request).await;
    let page_size = state.orchestrator.settings().results_per_page;
    let body = SearchPage::build(
        query.trim(),
        params.scope.as_str(),
        &results,
        page,
        page_size,
    );

    if body.results.is_empty() {
        return Ok(not_found);
    }
    let total = body.total;
    let pages = page_count(total, page_size);
    Ok(HttpResponse::Ok().json(ApiResponse::paged(body, page, total, pages)))
}

/// Type-ahead lookup over local data only.
pub async fn quick_search(
    params: web::Query<QuickSearchParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let q = params.into_inner().q.unwrap_or_default();
    let results = state.orchestrator.quick_search(&q).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(results)))
}
