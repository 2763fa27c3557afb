// Rows of the local store as the search core sees them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile fields the search reads. Owned by user management; never written here
/// except when seeding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub display_name: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoEntry {
    pub title: String,
    /// Catalog video id (a YouTube id for the IGDB catalog).
    pub link: String,
}

/// A game cached from the external catalog, keyed by the catalog id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: i64,
    /// Normalized lookup name, see `normalization::clean_game_name`.
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub boxart: String,
    pub release_date: Option<DateTime<Utc>>,
    pub rating: Option<f64>,
    pub screenshots: Option<Vec<String>>,
    pub videos: Option<Vec<VideoEntry>>,
}
