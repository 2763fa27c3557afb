use anyhow::Result;
use tracing::{debug, warn};

use crate::database_ops::models::{GameRecord, UserRecord};
use crate::database_ops::store::SearchStore;
use crate::normalization::clean_game_name;

/// Which entity types one lookup covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupScope {
    pub users: bool,
    pub games: bool,
}

/// Rows found locally. A `None` side was not requested; `Some(Err)` failed.
#[derive(Debug)]
pub struct LocalHits {
    pub users: Option<Result<Vec<UserRecord>>>,
    pub games: Option<Result<Vec<GameRecord>>>,
}

impl LocalHits {
    /// Requested users, with a failed lookup logged and flattened to nothing.
    pub fn users_or_empty(&mut self) -> (Vec<UserRecord>, bool) {
        flatten("users", self.users.take())
    }

    pub fn games_or_empty(&mut self) -> (Vec<GameRecord>, bool) {
        flatten("games", self.games.take())
    }
}

/// Look up users and games matching `query`, both at once, and wait for whichever
/// were requested. Users match on the lowercased username; games match on the
/// normalized name, so the term is cleaned the same way stored names are.
pub async fn search_local(
    store: &dyn SearchStore,
    query: &str,
    scope: LookupScope,
    limit: i64,
) -> LocalHits {
    let user_term = query.to_lowercase();
    let game_term = clean_game_name(query);

    let users = async {
        if scope.users {
            Some(store.find_users_by_name_prefix(&user_term, limit).await)
        } else {
            None
        }
    };
    let games = async {
        if scope.games {
            Some(store.find_games_by_name_prefix(&game_term, limit).await)
        } else {
            None
        }
    };

    let (users, games) = tokio::join!(users, games);
    debug!(
        users = ?users.as_ref().map(|r| r.as_ref().map(Vec::len).ok()),
        games = ?games.as_ref().map(|r| r.as_ref().map(Vec::len).ok()),
        "local lookup finished"
    );
    LocalHits { users, games }
}

/// Returns the rows and whether the lookup failed.
fn flatten<T>(what: &'static str, hits: Option<Result<Vec<T>>>) -> (Vec<T>, bool) {
    match hits {
        Some(Ok(rows)) => (rows, false),
        Some(Err(err)) => {
            warn!(error = ?err, entity = what, "querying local store during search failed");
            (Vec::new(), true)
        }
        None => (Vec::new(), false),
    }
}
