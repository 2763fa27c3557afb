use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use wasd_with_me::config::AppConfig;
use wasd_with_me::database_ops::models::UserRecord;
use wasd_with_me::logging::init_tracing;
use wasd_with_me::orchestrator::{SearchOrchestrator, SearchRequest, SearchScope};
use wasd_with_me::pagination::SearchPage;
use wasd_with_me::util::env;

#[derive(Parser, Debug)]
#[command(name = "wasd", version, about = "WASD With Me search admin CLI")]
struct Cli {
    /// Optional override for the database URL
    #[arg(long, global = true)]
    db_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Commands {
    /// Run one search and print the requested page as JSON
    Search {
        query: String,
        /// all | users | games
        #[arg(long = "type", default_value = "all")]
        scope: SearchScope,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Exit without waiting for catalog hits to be cached locally
        #[arg(long, default_value_t = false)]
        no_wait: bool,
    },
    /// Insert or replace a user profile in the local store
    AddUser {
        username: String,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        tagline: Option<String>,
        #[arg(long)]
        bio: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env::init_env();
    init_tracing("warn,wasd_with_me=info")?;

    let cli = Cli::parse();
    let mut cfg = AppConfig::from_env();
    if let Some(url) = cli.db_url {
        cfg.store.database_url = url;
    }

    let (db, orchestrator) = SearchOrchestrator::from_config(&cfg)
        .await
        .context("opening search services")?;

    match cli.command {
        Commands::Search {
            query,
            scope,
            page,
            no_wait,
        } => {
            let request = SearchRequest::new(query, page, scope);
            let outcome = orchestrator.search_detailed(&request).await;
            if !outcome.failures.is_empty() {
                warn!(failures = ?outcome.failures, "search degraded");
            }
            let body = SearchPage::build(
                request.query.trim(),
                scope.as_str(),
                &outcome.results,
                page,
                cfg.search.results_per_page,
            );
            println!("{}", serde_json::to_string_pretty(&body)?);

            if let Some(handle) = outcome.cache_back {
                if no_wait {
                    warn!("not waiting for catalog cache-back; pending writes are dropped at exit");
                } else {
                    let report = handle.await.context("cache-back task panicked")?;
                    info!(
                        written = report.written,
                        failed = report.failed,
                        "catalog hits cached"
                    );
                }
            }
        }
        Commands::AddUser {
            username,
            display_name,
            tagline,
            bio,
        } => {
            let user = UserRecord {
                display_name: display_name.unwrap_or_else(|| username.clone()),
                username,
                tagline,
                bio,
            };
            db.insert_user(&user).await?;
            println!("saved user {}", user.username);
        }
    }

    Ok(())
}
