use serde::{Deserialize, Serialize};

/// `/works/{id}.json`
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Work {
    pub key:         Option<String>,
    pub title:       String,
    pub authors:     Option<Vec<Author>>,
    pub description: Option<Description>,
    pub subjects:    Option<Vec<String>>,
}

impl Work {
    pub fn author_keys(&self) -> Vec<&str> {
        self.authors
            .iter()
            .flatten()
            .map(|x| x.author.key.as_str())
            .collect()
    }
}

/// Either a bare string or a typed text object, depending on the record's age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Description {
    Simple(String),
    Complex(DescriptionComplex),
}

impl Description {
    pub fn into_text(self) -> String {
        match self {
            Description::Simple(s) => s,
            Description::Complex(c) => c.value,
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionComplex {
    pub value: String,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub author: AuthorKey,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorKey {
    pub key: String,
}
