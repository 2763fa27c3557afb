use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Row, SqlitePool,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::database_ops::models::{GameRecord, UserRecord, VideoEntry};
use crate::database_ops::store::SearchStore;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        username     TEXT PRIMARY KEY NOT NULL,
        username_lc  TEXT NOT NULL,
        display_name TEXT NOT NULL,
        tagline      TEXT,
        bio          TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS games (
        seq          INTEGER PRIMARY KEY AUTOINCREMENT,
        id           INTEGER NOT NULL UNIQUE,
        name         TEXT NOT NULL,
        display_name TEXT NOT NULL,
        description  TEXT NOT NULL DEFAULT '',
        boxart       TEXT NOT NULL,
        release_date TEXT,
        rating       REAL,
        screenshots  TEXT,
        videos       TEXT,
        updated_at   TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS games_name_idx ON games (name)",
];

#[derive(Clone)]
pub struct Db {
    pub pool: SqlitePool,
}

impl Db {
    // SECURITY: never include raw DSNs in tracing spans (they may contain credentials).
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let connect_options = SqliteConnectOptions::from_str(database_url)
            .context("invalid DATABASE_URL")?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(600))
            .connect_with(connect_options)
            .await
            .context("failed to open local store")?;
        info!("connected to db");

        let db = Self { pool };
        db.ensure_schema().await?;
        Ok(db)
    }

    /// Private in-memory store. One connection that never idles out, since every
    /// SQLite `:memory:` connection is its own database.
    pub async fn connect_in_memory() -> Result<Self> {
        let connect_options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_options)
            .await
            .context("failed to open in-memory store")?;
        let db = Self { pool };
        db.ensure_schema().await?;
        Ok(db)
    }

    /// Create the tables the search needs when they are missing. Idempotent.
    pub async fn ensure_schema(&self) -> Result<()> {
        for stmt in SCHEMA {
            sqlx::query(*stmt)
                .execute(&self.pool)
                .await
                .context("creating search tables")?;
        }
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    /// Seed or replace a user profile.
    ///
    /// `username_lc` is lowercased here rather than in SQL, since SQLite's
    /// `lower()` only folds ASCII.
    pub async fn insert_user(&self, user: &UserRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (username, username_lc, display_name, tagline, bio)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(username) DO UPDATE SET
                display_name = excluded.display_name,
                tagline = excluded.tagline,
                bio = excluded.bio
            "#,
        )
        .bind(&user.username)
        .bind(user.username.to_lowercase())
        .bind(&user.display_name)
        .bind(&user.tagline)
        .bind(&user.bio)
        .execute(&self.pool)
        .await
        .with_context(|| format!("inserting user {}", user.username))?;
        Ok(())
    }

    pub async fn count_games(&self) -> Result<i64> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM games")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}

#[async_trait]
impl SearchStore for Db {
    async fn find_users_by_name_prefix(&self, text: &str, limit: i64) -> Result<Vec<UserRecord>> {
        let term = text.to_lowercase();
        let rows = sqlx::query(
            r#"
            SELECT username, display_name, tagline, bio
            FROM users
            WHERE instr(username_lc, ?1) > 0
            ORDER BY rowid
            LIMIT ?2
            "#,
        )
        .bind(&term)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("querying users by name")?;

        debug!(term = %term, rows = rows.len(), "user lookup");
        Ok(rows
            .into_iter()
            .map(|r| UserRecord {
                username: r.get("username"),
                display_name: r.get("display_name"),
                tagline: r.get("tagline"),
                bio: r.get("bio"),
            })
            .collect())
    }

    async fn find_games_by_name_prefix(&self, text: &str, limit: i64) -> Result<Vec<GameRecord>> {
        let term = text.to_lowercase();
        let rows = sqlx::query(
            r#"
            SELECT id, name, display_name, description, boxart, release_date, rating,
                   screenshots, videos
            FROM games
            WHERE instr(lower(name), ?1) > 0
            ORDER BY seq
            LIMIT ?2
            "#,
        )
        .bind(&term)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("querying games by name")?;

        debug!(term = %term, rows = rows.len(), "game lookup");
        rows.iter().map(game_from_row).collect()
    }

    async fn upsert_game_by_id(&self, game: &GameRecord) -> Result<()> {
        let screenshots = game
            .screenshots
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let videos = game
            .videos
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        // Optional columns keep their stored value when the new record has none.
        sqlx::query(
            r#"
            INSERT INTO games (id, name, display_name, description, boxart, release_date,
                               rating, screenshots, videos, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                display_name = excluded.display_name,
                description = excluded.description,
                boxart = excluded.boxart,
                release_date = COALESCE(excluded.release_date, games.release_date),
                rating = COALESCE(excluded.rating, games.rating),
                screenshots = COALESCE(excluded.screenshots, games.screenshots),
                videos = COALESCE(excluded.videos, games.videos),
                updated_at = excluded.updated_at
            "#,
        )
        .bind(game.id)
        .bind(&game.name)
        .bind(&game.display_name)
        .bind(&game.description)
        .bind(&game.boxart)
        .bind(game.release_date)
        .bind(game.rating)
        .bind(screenshots)
        .bind(videos)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .with_context(|| format!("upserting game {}", game.id))?;
        Ok(())
    }
}

fn game_from_row(r: &SqliteRow) -> Result<GameRecord> {
    let screenshots: Option<String> = r.try_get("screenshots")?;
    let videos: Option<String> = r.try_get("videos")?;
    let release_date: Option<DateTime<Utc>> = r.try_get("release_date")?;
    Ok(GameRecord {
        id: r.try_get("id")?,
        name: r.try_get("name")?,
        display_name: r.try_get("display_name")?,
        description: r.try_get("description")?,
        boxart: r.try_get("boxart")?,
        release_date,
        rating: r.try_get("rating")?,
        screenshots: screenshots
            .as_deref()
            .map(|raw| serde_json::from_str::<Vec<String>>(raw))
            .transpose()
            .context("decoding stored screenshots")?,
        videos: videos
            .as_deref()
            .map(|raw| serde_json::from_str::<Vec<VideoEntry>>(raw))
            .transpose()
            .context("decoding stored videos")?,
    })
}
