use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::timestamp::Timestamp;

/// One user marking one local book, unique per `(username, book_id)`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Favorite {
    pub username: String,
    pub book_id:  i64,
    pub added_at: Timestamp,
}

/// Outcome of flipping a favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteToggle {
    Added,
    Removed,
}

impl FavoriteToggle {
    pub fn message(&self) -> &'static str {
        match self {
            FavoriteToggle::Added => "Book added to favorites",
            FavoriteToggle::Removed => "Book removed from favorites",
        }
    }
}
