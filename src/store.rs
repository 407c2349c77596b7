use std::{path::Path, str::FromStr};

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, SqlitePool,
};
use tracing::{debug, info};

use crate::{
    traits::{CreateTable, DbTable},
    types::{timestamp::Timestamp, BookRecord, Favorite, FavoriteToggle, StoredBook},
};

/// Local catalog of books and per-user favorites.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Stores a record and returns its local id. A record whose
    /// `source_identifier` is already stored replaces that entry.
    async fn save(&self, record: &BookRecord) -> Result<i64>;

    /// `false` when there is no book with this id.
    async fn update(&self, id: i64, record: &BookRecord) -> Result<bool>;

    async fn find(&self, id: i64) -> Result<Option<StoredBook>>;

    /// Newest first.
    async fn list(&self) -> Result<Vec<StoredBook>>;

    /// Also drops the book from every favorites list.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// `None` when there is no book with this id.
    async fn toggle_favorite(&self, username: &str, book_id: i64)
        -> Result<Option<FavoriteToggle>>;

    /// Most recently added first.
    async fn favorites(&self, username: &str) -> Result<Vec<StoredBook>>;
}

impl DbTable for StoredBook {
    const TABLE_NAME: &'static str = "books";
}

impl CreateTable for StoredBook {
    async fn create_table(conn: &SqlitePool) -> Result<()> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                author TEXT,
                description TEXT,
                category TEXT,
                first_publication_year INTEGER,
                cover_reference TEXT,
                source_identifier TEXT UNIQUE,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );"#,
            Self::TABLE_NAME
        ))
        .execute(conn)
        .await?;
        Ok(())
    }
}

impl DbTable for Favorite {
    const TABLE_NAME: &'static str = "favorites";
}

impl CreateTable for Favorite {
    async fn create_table(conn: &SqlitePool) -> Result<()> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                username TEXT NOT NULL,
                book_id INTEGER NOT NULL REFERENCES {}(id) ON DELETE CASCADE,
                added_at INTEGER NOT NULL,
                PRIMARY KEY (username, book_id)
            );"#,
            Self::TABLE_NAME,
            StoredBook::TABLE_NAME
        ))
        .execute(conn)
        .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    conn: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|x| !x.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let conn = Pool::connect_with(
            SqliteConnectOptions::new()
                .filename(path)
                .journal_mode(SqliteJournalMode::Wal)
                .foreign_keys(true)
                .create_if_missing(true),
        )
        .await?;
        info!(path = %path.display(), "Opened catalog database");
        Self::with_pool(conn).await
    }

    /// A private database that lives as long as the store.
    pub async fn in_memory() -> Result<Self> {
        let conn = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true))
            .await?;
        Self::with_pool(conn).await
    }

    async fn with_pool(conn: SqlitePool) -> Result<Self> {
        StoredBook::create_table(&conn).await?;
        Favorite::create_table(&conn).await?;
        Ok(Self { conn })
    }

    async fn id_by_source(&self, record: &BookRecord) -> Result<Option<i64>> {
        let Some(source) = &record.source_identifier else {
            return Ok(None);
        };
        Ok(sqlx::query_scalar(&format!(
            "SELECT id FROM {} WHERE source_identifier = ?1",
            StoredBook::TABLE_NAME
        ))
        .bind(source)
        .fetch_optional(&self.conn)
        .await?)
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn save(&self, record: &BookRecord) -> Result<i64> {
        if let Some(id) = self.id_by_source(record).await? {
            debug!(id, "Replacing stored book with the same source identifier");
            self.update(id, record).await?;
            return Ok(id);
        }
        let now = Timestamp::now();
        let result = sqlx::query(&format!(
            r#"
            INSERT INTO {} (
                title, author, description, category, first_publication_year,
                cover_reference, source_identifier, created_at, updated_at
            )
            VALUES ( ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9 )
            "#,
            StoredBook::TABLE_NAME
        ))
        .bind(&record.title)
        .bind(&record.author)
        .bind(&record.description)
        .bind(&record.category)
        .bind(record.first_publication_year)
        .bind(&record.cover_reference)
        .bind(&record.source_identifier)
        .bind(now)
        .bind(now)
        .execute(&self.conn)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn update(&self, id: i64, record: &BookRecord) -> Result<bool> {
        let result = sqlx::query(&format!(
            r#"
            UPDATE {}
            SET
                title = ?2,
                author = ?3,
                description = ?4,
                category = ?5,
                first_publication_year = ?6,
                cover_reference = ?7,
                source_identifier = ?8,
                updated_at = ?9
            WHERE
                id = ?1;
            "#,
            StoredBook::TABLE_NAME
        ))
        .bind(id)
        .bind(&record.title)
        .bind(&record.author)
        .bind(&record.description)
        .bind(&record.category)
        .bind(record.first_publication_year)
        .bind(&record.cover_reference)
        .bind(&record.source_identifier)
        .bind(Timestamp::now())
        .execute(&self.conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find(&self, id: i64) -> Result<Option<StoredBook>> {
        Ok(sqlx::query_as::<_, StoredBook>(&format!(
            "SELECT * FROM {} WHERE id = ?1",
            StoredBook::TABLE_NAME
        ))
        .bind(id)
        .fetch_optional(&self.conn)
        .await?)
    }

    async fn list(&self) -> Result<Vec<StoredBook>> {
        Ok(sqlx::query_as::<_, StoredBook>(&format!(
            "SELECT * FROM {} ORDER BY created_at DESC, id DESC",
            StoredBook::TABLE_NAME
        ))
        .fetch_all(&self.conn)
        .await?)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE id = ?1",
            StoredBook::TABLE_NAME
        ))
        .bind(id)
        .execute(&self.conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn toggle_favorite(
        &self,
        username: &str,
        book_id: i64,
    ) -> Result<Option<FavoriteToggle>> {
        let mut tx = self.conn.begin().await?;
        let exists: Option<i64> = sqlx::query_scalar(&format!(
            "SELECT id FROM {} WHERE id = ?1",
            StoredBook::TABLE_NAME
        ))
        .bind(book_id)
        .fetch_optional(&mut tx)
        .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let removed = sqlx::query(&format!(
            "DELETE FROM {} WHERE username = ?1 AND book_id = ?2",
            Favorite::TABLE_NAME
        ))
        .bind(username)
        .bind(book_id)
        .execute(&mut tx)
        .await?
        .rows_affected();

        let toggle = if removed > 0 {
            FavoriteToggle::Removed
        } else {
            sqlx::query(&format!(
                "INSERT INTO {} (username, book_id, added_at) VALUES (?1, ?2, ?3)",
                Favorite::TABLE_NAME
            ))
            .bind(username)
            .bind(book_id)
            .bind(Timestamp::now())
            .execute(&mut tx)
            .await?;
            FavoriteToggle::Added
        };
        tx.commit().await?;
        debug!(username, book_id, ?toggle, "Toggled favorite");
        Ok(Some(toggle))
    }

    async fn favorites(&self, username: &str) -> Result<Vec<StoredBook>> {
        Ok(sqlx::query_as::<_, StoredBook>(&format!(
            r#"
            SELECT b.* FROM {books} b
            JOIN {favorites} f ON f.book_id = b.id
            WHERE f.username = ?1
            ORDER BY f.added_at DESC, f.rowid DESC
            "#,
            books = StoredBook::TABLE_NAME,
            favorites = Favorite::TABLE_NAME
        ))
        .bind(username)
        .fetch_all(&self.conn)
        .await?)
    }
}
