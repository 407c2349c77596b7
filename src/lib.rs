pub mod auth;
pub mod config;
pub mod error;
pub mod export;
pub mod openlib_schema;
pub mod resolver;
pub mod server;
pub mod source;
pub mod store;
pub mod traits;
pub mod types;
