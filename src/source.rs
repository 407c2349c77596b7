use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    config::UpstreamConfig,
    error::{ResolveError, Result},
    openlib_schema::{
        author::Author,
        edition::{Edition, EditionList},
        search::{SearchResponse, SEARCH_FIELDS},
        work::Work,
    },
    types::OlId,
};

/// The upstream catalog, as seen by the resolver.
///
/// Every method is a single read-only request. Implementations map transport
/// problems to [ResolveError::UpstreamUnavailable], a missing record to
/// [ResolveError::NotFound] and a body that doesn't fit the schema to
/// [ResolveError::UpstreamMalformed].
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<SearchResponse>;

    async fn work(&self, id: &OlId) -> Result<Work>;

    async fn edition(&self, id: &OlId) -> Result<Edition>;

    /// Editions of a work in one batched request, at most `limit` of them.
    async fn work_editions(&self, id: &OlId, limit: usize) -> Result<EditionList>;

    /// `key` is an upstream author key like `/authors/OL34184A`.
    async fn author(&self, key: &str) -> Result<Author>;
}

pub struct OpenLibrary {
    client:   reqwest::Client,
    base_url: String,
}

impl OpenLibrary {
    pub fn new(config: &UpstreamConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        subject: &str,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, ?params, "Querying Open Library");
        let resp = self.client.get(&url).query(params).send().await?;
        check_status(resp.status(), subject)?;
        let body = resp.text().await?;
        parse_body(&body)
    }
}

/// Maps an upstream status to the error taxonomy, `Ok` for success.
pub fn check_status(status: StatusCode, subject: &str) -> Result<()> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::NOT_FOUND => Err(ResolveError::NotFound(subject.to_string())),
        s if s == StatusCode::TOO_MANY_REQUESTS || s.is_server_error() => Err(
            ResolveError::UpstreamUnavailable(format!("{subject}: upstream answered {s}")),
        ),
        s => Err(ResolveError::UpstreamMalformed(format!(
            "{subject}: unexpected upstream status {s}"
        ))),
    }
}

pub fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(body);
    Ok(serde_path_to_error::deserialize(de)?)
}

fn author_path(key: &str) -> String {
    if key.starts_with('/') {
        format!("{key}.json")
    } else {
        format!("/authors/{key}.json")
    }
}

#[async_trait]
impl CatalogSource for OpenLibrary {
    async fn search(&self, query: &str, limit: usize) -> Result<SearchResponse> {
        let limit = limit.to_string();
        self.get(
            "/search.json",
            &[("q", query), ("limit", limit.as_str()), ("fields", SEARCH_FIELDS)],
            query,
        )
        .await
    }

    async fn work(&self, id: &OlId) -> Result<Work> {
        self.get(&format!("/works/{id}.json"), &[], id.as_str())
            .await
    }

    async fn edition(&self, id: &OlId) -> Result<Edition> {
        self.get(&format!("/books/{id}.json"), &[], id.as_str())
            .await
    }

    async fn work_editions(&self, id: &OlId, limit: usize) -> Result<EditionList> {
        let limit = limit.to_string();
        self.get(
            &format!("/works/{id}/editions.json"),
            &[("limit", limit.as_str())],
            id.as_str(),
        )
        .await
    }

    async fn author(&self, key: &str) -> Result<Author> {
        self.get(&author_path(key), &[], key).await
    }
}
