use std::collections::HashMap;

use async_trait::async_trait;

use crate::config::ApiToken;

/// Who is making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub username: String,
    pub admin:    bool,
}

#[async_trait]
pub trait RequestAuthenticator: Send + Sync {
    /// `None` for unknown credentials.
    async fn authenticate(&self, token: &str) -> Option<Caller>;
}

/// Tokens listed in the configuration file.
pub struct StaticTokens {
    tokens: HashMap<String, Caller>,
}

impl StaticTokens {
    pub fn new(tokens: &[ApiToken]) -> Self {
        Self {
            tokens: tokens
                .iter()
                .map(|x| {
                    (x.token.clone(), Caller {
                        username: x.user.clone(),
                        admin:    x.admin,
                    })
                })
                .collect(),
        }
    }
}

#[async_trait]
impl RequestAuthenticator for StaticTokens {
    async fn authenticate(&self, token: &str) -> Option<Caller> {
        self.tokens.get(token).cloned()
    }
}

/// Extracts the token from an `Authorization` header value.
///
/// Accepts `Token <key>` and `Bearer <key>`.
pub fn token_from_header(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    match scheme {
        s if s.eq_ignore_ascii_case("token") || s.eq_ignore_ascii_case("bearer") => Some(token),
        _ => None,
    }
}
