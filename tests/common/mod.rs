#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc, sync::Mutex};

use async_trait::async_trait;
use serde_json::Value;

use libris::{
    config::UpstreamConfig,
    error::{ResolveError, Result},
    openlib_schema::{
        author::Author,
        edition::{Edition, EditionList},
        search::SearchResponse,
        work::Work,
    },
    resolver::Resolver,
    source::CatalogSource,
    types::OlId,
};

/// In-memory upstream that records every call it receives.
///
/// Edition lists are returned in full, whatever limit is asked for.
#[derive(Default)]
pub struct FakeCatalog {
    works:         HashMap<String, Result<Work>>,
    editions:      HashMap<String, Edition>,
    work_editions: HashMap<String, Result<Vec<Edition>>>,
    authors:       HashMap<String, Result<Author>>,
    search:        Option<Result<SearchResponse>>,
    calls:         Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_work(mut self, id: &str, json: Value) -> Self {
        self.works
            .insert(id.into(), Ok(serde_json::from_value(json).unwrap()));
        self
    }

    pub fn with_work_error(mut self, id: &str, error: ResolveError) -> Self {
        self.works.insert(id.into(), Err(error));
        self
    }

    pub fn with_edition(mut self, id: &str, json: Value) -> Self {
        self.editions
            .insert(id.into(), serde_json::from_value(json).unwrap());
        self
    }

    pub fn with_work_editions(mut self, id: &str, editions: Vec<Value>) -> Self {
        let editions = editions
            .into_iter()
            .map(|x| serde_json::from_value(x).unwrap())
            .collect();
        self.work_editions.insert(id.into(), Ok(editions));
        self
    }

    pub fn with_work_editions_error(mut self, id: &str, error: ResolveError) -> Self {
        self.work_editions.insert(id.into(), Err(error));
        self
    }

    pub fn with_author(mut self, key: &str, name: &str) -> Self {
        self.authors.insert(key.into(), Ok(Author {
            key:           Some(key.into()),
            name:          Some(name.into()),
            personal_name: None,
        }));
        self
    }

    pub fn with_author_error(mut self, key: &str, error: ResolveError) -> Self {
        self.authors.insert(key.into(), Err(error));
        self
    }

    pub fn with_search(mut self, json: Value) -> Self {
        self.search = Some(Ok(serde_json::from_value(json).unwrap()));
        self
    }

    pub fn with_search_error(mut self, error: ResolveError) -> Self {
        self.search = Some(Err(error));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn search(&self, query: &str, limit: usize) -> Result<SearchResponse> {
        self.record(format!("search {query} limit={limit}"));
        self.search
            .clone()
            .unwrap_or_else(|| Ok(SearchResponse::default()))
    }

    async fn work(&self, id: &OlId) -> Result<Work> {
        self.record(format!("work {id}"));
        self.works
            .get(id.as_str())
            .cloned()
            .unwrap_or_else(|| Err(ResolveError::NotFound(id.to_string())))
    }

    async fn edition(&self, id: &OlId) -> Result<Edition> {
        self.record(format!("edition {id}"));
        self.editions
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(id.to_string()))
    }

    async fn work_editions(&self, id: &OlId, limit: usize) -> Result<EditionList> {
        self.record(format!("work_editions {id} limit={limit}"));
        match self.work_editions.get(id.as_str()) {
            Some(Ok(entries)) => Ok(EditionList {
                size:    Some(entries.len() as u64),
                entries: entries.clone(),
            }),
            Some(Err(e)) => Err(e.clone()),
            None => Ok(EditionList::default()),
        }
    }

    async fn author(&self, key: &str) -> Result<Author> {
        self.record(format!("author {key}"));
        self.authors
            .get(key)
            .cloned()
            .unwrap_or_else(|| Err(ResolveError::NotFound(key.to_string())))
    }
}

pub fn resolver(catalog: &Arc<FakeCatalog>) -> Resolver {
    Resolver::new(catalog.clone(), &UpstreamConfig::default())
}

pub fn cover(id: i64) -> String {
    format!("https://covers.openlibrary.org/b/id/{id}-L.jpg")
}
