use serde::{Deserialize, Serialize};

/// Fields requested from `/search.json`, everything else is left out upstream.
pub const SEARCH_FIELDS: &str = "key,title,author_name,first_publish_year,cover_i,subject";

/// `/search.json`
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "numFound")]
    pub num_found: Option<u64>,
    pub docs:      Vec<SearchDoc>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDoc {
    pub key:                Option<String>,
    pub title:              Option<String>,
    pub author_name:        Option<Vec<String>>,
    pub first_publish_year: Option<i32>,
    pub cover_i:            Option<i64>,
    pub subject:            Option<Vec<String>>,
}
