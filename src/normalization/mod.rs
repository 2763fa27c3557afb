pub mod name;
pub mod result;

pub use name::clean_game_name;
pub use result::{
    normalize, normalize_user, normalize_user_brief, normalize_users, ResultKind, SearchResult,
    SourceRecord,
};
