use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::config::ImageSettings;
use crate::database_ops::igdb::CatalogHit;
use crate::database_ops::models::{GameRecord, UserRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    User,
    Game,
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultKind::User => f.write_str("user"),
            ResultKind::Game => f.write_str("game"),
        }
    }
}

/// The one display shape every search hit is projected into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub kind: ResultKind,
    pub name: String,
    pub image: String,
    pub description: String,
}

/// Every record shape the search can surface.
#[derive(Debug, Clone, Copy)]
pub enum SourceRecord<'a> {
    User(&'a UserRecord),
    LocalGame(&'a GameRecord),
    RemoteGame(&'a CatalogHit),
}

/// Project any source record into a [`SearchResult`].
pub fn normalize(record: SourceRecord<'_>, images: &ImageSettings) -> SearchResult {
    match record {
        SourceRecord::User(user) => SearchResult {
            kind: ResultKind::User,
            name: user.display_name.clone(),
            image: profile_picture(images, &user.display_name),
            description: user.bio.clone().unwrap_or_default(),
        },
        SourceRecord::LocalGame(game) => SearchResult {
            kind: ResultKind::Game,
            name: game.display_name.clone(),
            image: non_empty_or(&game.boxart, &images.fallback_boxart),
            description: game.description.clone(),
        },
        SourceRecord::RemoteGame(hit) => SearchResult {
            kind: ResultKind::Game,
            name: hit.name.clone(),
            image: cover_url(images, hit.cover_id.as_deref()),
            description: hit.summary.clone().unwrap_or_default(),
        },
    }
}

/// Autocomplete variant of the user projection: the tagline fits a dropdown better
/// than the full bio.
pub fn normalize_user_brief(user: &UserRecord, images: &ImageSettings) -> SearchResult {
    SearchResult {
        description: user.tagline.clone().unwrap_or_default(),
        ..normalize(SourceRecord::User(user), images)
    }
}

/// Projection applied to each user by [`normalize_users`].
pub type UserProjection = fn(&UserRecord, &ImageSettings) -> SearchResult;

/// Full-search user projection.
pub fn normalize_user(user: &UserRecord, images: &ImageSettings) -> SearchResult {
    normalize(SourceRecord::User(user), images)
}

/// Project a batch of users on the blocking pool, keeping their order.
///
/// Each user costs a profile-picture lookup on disk, which must not run on an
/// async worker.
pub async fn normalize_users(
    users: Vec<UserRecord>,
    images: &ImageSettings,
    project: UserProjection,
) -> Vec<SearchResult> {
    if users.is_empty() {
        return Vec::new();
    }
    let images = images.clone();
    let batch = users.len();
    let task = tokio::task::spawn_blocking(move || {
        users
            .iter()
            .map(|user| project(user, &images))
            .collect::<Vec<_>>()
    });
    match task.await {
        Ok(results) => results,
        Err(err) => {
            warn!(error = %err, batch, "user projection task failed; dropping users");
            Vec::new()
        }
    }
}

/// Cover URL for a catalog image id, or the configured fallback boxart.
pub fn cover_url(images: &ImageSettings, cover_id: Option<&str>) -> String {
    match cover_id {
        Some(id) if !id.is_empty() => format!("{}/t_cover_big/{}.jpg", images.cover_base, id),
        _ => images.fallback_boxart.clone(),
    }
}

/// Public path of an uploaded profile picture, or the placeholder when none exists.
pub fn profile_picture(images: &ImageSettings, display_name: &str) -> String {
    let file_name = format!("{display_name}.png");
    let safe = !display_name.is_empty()
        && !display_name.contains(['/', '\\'])
        && display_name != ".."
        && display_name != ".";
    if safe
        && images
            .public_dir
            .join("images")
            .join("profile")
            .join(&file_name)
            .is_file()
    {
        format!("/images/profile/{file_name}")
    } else {
        images.profile_placeholder.clone()
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
