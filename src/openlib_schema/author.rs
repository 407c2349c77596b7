use serde::{Deserialize, Serialize};

/// `/authors/{id}.json`
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub key:           Option<String>,
    pub name:          Option<String>,
    pub personal_name: Option<String>,
}

impl Author {
    /// Older author records only carry `personal_name`.
    pub fn display_name(self) -> Option<String> {
        self.name
            .or(self.personal_name)
            .filter(|x| !x.trim().is_empty())
    }
}
