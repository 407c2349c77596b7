use serde::{Deserialize, Serialize};

use super::work::Description;

/// `/books/{id}.json`, also the entries of `/works/{id}/editions.json`
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edition {
    pub key:          Option<String>,
    pub title:        Option<String>,
    pub publish_date: Option<String>,
    pub authors:      Option<Vec<Author>>,
    pub works:        Option<Vec<Work>>,
    pub covers:       Option<Vec<i64>>,
    pub subjects:     Option<Vec<String>>,
    pub description:  Option<Description>,
}

impl Edition {
    /// Upstream uses `-1` as a "no cover" marker.
    pub fn cover_id(&self) -> Option<i64> {
        self.covers.iter().flatten().copied().find(|x| *x > 0)
    }

    pub fn author_keys(&self) -> Vec<&str> {
        self.authors.iter().flatten().map(|x| x.key.as_str()).collect()
    }

    pub fn work_key(&self) -> Option<&str> {
        self.works
            .as_ref()
            .and_then(|x| x.first())
            .map(|x| x.key.as_str())
    }
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub key: String,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Work {
    pub key: String,
}

/// `/works/{id}/editions.json`
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditionList {
    pub size:    Option<u64>,
    #[serde(default)]
    pub entries: Vec<Edition>,
}
