//! searchindex Core Library
//!
//! This crate provides the request-shaping pieces shared by the search index
//! client, including:
//! - Index identifiers and typed ingest/query payloads
//! - Ordered query parameter bags with per-operation option structs
//! - Path joining for `/v1/index/{index_id}/...` resources
//! - Client configuration

pub mod config;
pub mod models;
pub mod params;
pub mod path;

// Re-export commonly used types
pub use config::ClientConfig;
pub use models::*;
pub use params::{EntryParams, QueryParams, SearchParams};
pub use path::{index_path, join_path};
