//! Resolution of search terms and Open Library identifiers into [BookRecord]s.
//!
//! A work carries neither a publication year nor a cover, both come from its
//! editions: the earliest year of any scanned edition, and the cover of the
//! most recently published edition that has one. At most
//! [EDITION_SCAN_CAP] editions are scanned.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    config::UpstreamConfig,
    error::{ResolveError, Result},
    openlib_schema::{edition::Edition, search::SearchDoc, work::Work},
    source::CatalogSource,
    types::{
        edition_candidate::{earliest_year, freshest_cover},
        BookRecord, EditionCandidate, OlClass, OlId,
    },
};

pub const EDITION_SCAN_CAP: usize = 50;
const MAX_AUTHORS: usize = 3;
const MAX_CATEGORIES: usize = 2;

#[derive(Clone)]
pub struct Resolver {
    source:       Arc<dyn CatalogSource>,
    covers_url:   String,
    search_limit: usize,
}

impl Resolver {
    pub fn new(source: Arc<dyn CatalogSource>, config: &UpstreamConfig) -> Self {
        Self {
            source,
            covers_url: config.covers_url.trim_end_matches('/').to_string(),
            search_limit: config.search_limit,
        }
    }

    /// Free text search, results in upstream relevance order.
    pub async fn search(&self, query: &str) -> Result<SearchResults> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResolveError::InvalidQuery);
        }
        let response = self.source.search(query, self.search_limit).await?;
        info!(query, found = ?response.num_found, "Searched upstream catalog");
        Ok(SearchResults {
            docs:       response.docs.into_iter(),
            covers_url: self.covers_url.clone(),
            total:      response.num_found,
        })
    }

    pub async fn resolve(&self, identifier: &str) -> Result<BookRecord> {
        let id: OlId = identifier.parse()?;
        let record = match id.class() {
            OlClass::Work => self.resolve_work(id).await?,
            OlClass::Edition => self.resolve_edition(id).await?,
        };
        info!(%identifier, title = %record.title, "Resolved");
        Ok(record)
    }

    async fn resolve_work(&self, id: OlId) -> Result<BookRecord> {
        let work = self.source.work(&id).await?;
        let author = self.author_names(&work.author_keys()).await?;
        let candidates = self.scan_editions(&id).await;
        Ok(BookRecord {
            author,
            description: work.description.map(|x| x.into_text()).and_then(non_empty),
            category: join_first(work.subjects.as_deref(), MAX_CATEGORIES),
            first_publication_year: earliest_year(&candidates),
            cover_reference: freshest_cover(&candidates),
            title: work.title,
            source_identifier: Some(id),
        })
    }

    async fn resolve_edition(&self, id: OlId) -> Result<BookRecord> {
        let edition = self.source.edition(&id).await?;
        let candidate = self.candidate(&edition);
        let mut record = BookRecord {
            title: edition.title.clone().and_then(non_empty).unwrap_or_default(),
            author: self.author_names(&edition.author_keys()).await?,
            description: edition
                .description
                .clone()
                .map(|x| x.into_text())
                .and_then(non_empty),
            category: join_first(edition.subjects.as_deref(), MAX_CATEGORIES),
            first_publication_year: candidate.publication_year,
            cover_reference: candidate.cover_reference,
            source_identifier: Some(id),
        };

        let incomplete = record.title.is_empty()
            || record.author.is_none()
            || record.category.is_none()
            || record.description.is_none();
        if incomplete {
            if let Some(work) = self.linked_work(&edition).await? {
                self.backfill(&mut record, work).await?;
            }
        }
        if record.title.is_empty() {
            return Err(ResolveError::UpstreamMalformed(format!(
                "{}: edition has no title",
                edition.key.as_deref().unwrap_or("edition")
            )));
        }
        Ok(record)
    }

    async fn backfill(&self, record: &mut BookRecord, work: Work) -> Result<()> {
        if record.author.is_none() {
            record.author = self.author_names(&work.author_keys()).await?;
        }
        if record.category.is_none() {
            record.category = join_first(work.subjects.as_deref(), MAX_CATEGORIES);
        }
        if record.description.is_none() {
            record.description = work.description.map(|x| x.into_text()).and_then(non_empty);
        }
        if record.title.is_empty() {
            record.title = work.title;
        }
        Ok(())
    }

    /// The work an edition belongs to, `None` when the edition links none
    /// or upstream doesn't know it.
    async fn linked_work(&self, edition: &Edition) -> Result<Option<Work>> {
        let Some(id) = edition.work_key().and_then(OlId::from_key) else {
            return Ok(None);
        };
        match self.source.work(&id).await {
            Ok(work) => Ok(Some(work)),
            Err(ResolveError::NotFound(_)) => {
                warn!(%id, "Linked work not found, not backfilling");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn scan_editions(&self, id: &OlId) -> Vec<EditionCandidate> {
        let editions = match self.source.work_editions(id, EDITION_SCAN_CAP).await {
            Ok(list) => list.entries,
            Err(e) => {
                warn!(%id, error = %e, "Edition list unavailable, leaving year and cover empty");
                return vec![];
            }
        };
        let candidates = editions
            .iter()
            .take(EDITION_SCAN_CAP)
            .map(|x| self.candidate(x))
            .collect::<Vec<_>>();
        debug!(%id, reported = editions.len(), scanned = candidates.len(), "Scanned editions");
        candidates
    }

    fn candidate(&self, edition: &Edition) -> EditionCandidate {
        EditionCandidate::new(
            edition.publish_date.as_deref(),
            edition.cover_id().and_then(|x| cover_url(&self.covers_url, x)),
        )
    }

    /// Names of the first few authors. Authors upstream doesn't know are
    /// skipped, any other failure aborts the resolution.
    async fn author_names(&self, keys: &[&str]) -> Result<Option<String>> {
        let mut names = vec![];
        for key in keys.iter().take(MAX_AUTHORS) {
            match self.source.author(key).await {
                Ok(author) => names.extend(author.display_name()),
                Err(ResolveError::NotFound(_)) => warn!(key, "Skipping unknown author"),
                Err(e) => return Err(e),
            }
        }
        Ok(non_empty(names.join(", ")))
    }
}

/// Lazily normalized search hits.
pub struct SearchResults {
    docs:       std::vec::IntoIter<SearchDoc>,
    covers_url: String,
    /// Number of matches upstream reports, not the number of results here
    pub total:  Option<u64>,
}

impl Iterator for SearchResults {
    type Item = BookRecord;

    fn next(&mut self) -> Option<Self::Item> {
        for doc in self.docs.by_ref() {
            let Some(title) = doc.title.and_then(non_empty) else {
                debug!(key = ?doc.key, "Skipping untitled search result");
                continue;
            };
            return Some(BookRecord {
                title,
                author: join_first(doc.author_name.as_deref(), MAX_AUTHORS),
                description: None,
                category: join_first(doc.subject.as_deref(), MAX_CATEGORIES),
                first_publication_year: doc.first_publish_year,
                cover_reference: doc.cover_i.and_then(|x| cover_url(&self.covers_url, x)),
                source_identifier: doc.key.as_deref().and_then(OlId::from_key),
            });
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.docs.size_hint().1)
    }
}

fn cover_url(covers_url: &str, cover_id: i64) -> Option<String> {
    (cover_id > 0).then(|| format!("{covers_url}/b/id/{cover_id}-L.jpg"))
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

fn join_first(values: Option<&[String]>, n: usize) -> Option<String> {
    let joined = values?
        .iter()
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
        .take(n)
        .collect::<Vec<_>>()
        .join(", ");
    non_empty(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cover_urls() {
        assert_eq!(
            cover_url("https://covers.openlibrary.org", 8739161).as_deref(),
            Some("https://covers.openlibrary.org/b/id/8739161-L.jpg")
        );
        assert_eq!(cover_url("https://covers.openlibrary.org", -1), None);
        assert_eq!(cover_url("https://covers.openlibrary.org", 0), None);
    }

    #[test]
    fn joins_first_non_empty_values() {
        let values = vec!["Fantasy".to_string(), " ".into(), "Epic".into(), "Quests".into()];
        assert_eq!(join_first(Some(&values[..]), 2).as_deref(), Some("Fantasy, Epic"));
        assert_eq!(join_first(Some(&[][..]), 2), None);
        assert_eq!(join_first(None, 2), None);
    }
}
