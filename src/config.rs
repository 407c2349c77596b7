use std::{
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
};

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "config.toml";
pub const ENV_PREFIX: &str = "LIBRIS_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub base_url:     String,
    pub covers_url:   String,
    pub user_agent:   String,
    pub search_limit: usize,
    /// Applied by the callers of the resolver, not by the resolver itself
    pub timeout_secs: Option<u64>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url:     "https://openlibrary.org".into(),
            covers_url:   "https://covers.openlibrary.org".into(),
            user_agent:   concat!("libris/", env!("CARGO_PKG_VERSION")).into(),
            search_limit: 10,
            timeout_secs: Some(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port:    u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port:    3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiToken {
    pub token: String,
    pub user:  String,
    #[serde(default)]
    pub admin: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub database_location: PathBuf,
    pub log_level:         String,
    pub tokens:            Vec<ApiToken>,
    pub upstream:          UpstreamConfig,
    pub server:            ServerConfig,
}

impl Config {
    pub fn default_as_string() -> Result<String> {
        Ok(toml::to_string(&Self::default())?)
    }

    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn read_config() -> Result<Self> {
        Ok(Self::figment().extract()?)
    }

    /// `DATABASE_URL` (from the environment or `.env`) wins over `database_location`.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Ok(url) = dotenvy::var("DATABASE_URL") {
            return Ok(PathBuf::from(url.trim_start_matches("sqlite://")));
        }
        Ok(shellexpand::path::tilde(&self.database_location).into_owned())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_location: PathBuf::from("~/.local/share/libris/database"),
            log_level:         "info".into(),
            tokens:            vec![],
            upstream:          UpstreamConfig::default(),
            server:            ServerConfig::default(),
        }
    }
}
