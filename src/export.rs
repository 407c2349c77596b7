use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::{store::RecordStore, types::StoredBook};

/// One row of the catalog spreadsheet export.
#[derive(Debug, Default, Serialize)]
pub struct Export {
    #[serde(rename = "Book Id")]
    book_id:           i64,
    #[serde(rename = "Title")]
    title:             String,
    #[serde(rename = "Author")]
    author:            Option<String>,
    #[serde(rename = "Category")]
    category:          Option<String>,
    #[serde(rename = "Original Publication Year")]
    year:              Option<i32>,
    #[serde(rename = "Open Library Id")]
    source_identifier: Option<String>,
    #[serde(rename = "Cover")]
    cover_reference:   Option<String>,
    #[serde(rename = "Date Added")]
    date_added:        String,
}

impl From<StoredBook> for Export {
    fn from(book: StoredBook) -> Self {
        Self {
            book_id:           book.id,
            title:             book.record.title,
            author:            book.record.author,
            category:          book.record.category,
            year:              book.record.first_publication_year,
            source_identifier: book.record.source_identifier.map(|x| x.to_string()),
            cover_reference:   book.record.cover_reference,
            date_added:        book.created_at.0.format("%Y/%m/%d").to_string(),
        }
    }
}

impl Export {
    pub async fn new(store: &dyn RecordStore) -> Result<Vec<Self>> {
        Ok(store.list().await?.into_iter().map(Self::from).collect())
    }

    pub fn export(data: Vec<Self>, writer: impl Write) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for record in data {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
