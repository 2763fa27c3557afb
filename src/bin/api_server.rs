// HTTP API server binary for the WASD With Me search

use anyhow::Result;
use wasd_with_me::api::ApiServer;
use wasd_with_me::config::AppConfig;
use wasd_with_me::logging::init_tracing;
use wasd_with_me::orchestrator::SearchOrchestrator;
use wasd_with_me::util::env as env_util;

#[actix_web::main]
async fn main() -> Result<()> {
    // Load dotenv/env once (safe to call multiple times)
    env_util::init_env();
    init_tracing("info,sqlx=warn")?;

    tracing::info!("Initializing search API server");

    let cfg = AppConfig::from_env();
    cfg.log_snapshot();

    let (db, orchestrator) = SearchOrchestrator::from_config(&cfg).await?;
    tracing::info!("Database connected successfully");

    ApiServer::new(&cfg.server).run(db, orchestrator).await?;

    Ok(())
}
