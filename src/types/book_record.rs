use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};
use std::fmt::Display;

use super::{identifier::OlId, timestamp::Timestamp};

/// Normalized book, independent of the upstream schema.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title:                  String,
    pub author:                 Option<String>,
    pub description:            Option<String>,
    pub category:               Option<String>,
    pub first_publication_year: Option<i32>,
    pub cover_reference:        Option<String>,
    pub source_identifier:      Option<OlId>,
}

impl Display for BookRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)?;
        if let Some(author) = &self.author {
            write!(f, " by {author}")?;
        }
        if let Some(year) = self.first_publication_year {
            write!(f, " ({year})")?;
        }
        if let Some(id) = &self.source_identifier {
            write!(f, " [{id}]")?;
        }
        Ok(())
    }
}

/// A [BookRecord] as kept in the local catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBook {
    pub id:         i64,
    #[serde(flatten)]
    pub record:     BookRecord,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FromRow<'_, SqliteRow> for StoredBook {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id:         row.try_get("id")?,
            record:     BookRecord {
                title:                  row.try_get("title")?,
                author:                 row.try_get("author")?,
                description:            row.try_get("description")?,
                category:               row.try_get("category")?,
                first_publication_year: row.try_get("first_publication_year")?,
                cover_reference:        row.try_get("cover_reference")?,
                source_identifier:      row.try_get("source_identifier")?,
            },
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
