//! searchindex Client Library
//!
//! Async HTTP client for the search index REST API. Every operation maps one
//! function call to one request under `/v1/index/{index_id}/...`.
//!
//! ```rust,no_run
//! use searchindex_rs::{AccessTokenAuthorizer, IndexClient, QueryParams, SearchParams};
//!
//! # async fn run() -> searchindex_rs::Result<()> {
//! let client = IndexClient::new(
//!     "https://search.api.globus.org",
//!     AccessTokenAuthorizer::new("my-token"),
//! )?;
//! let results = client
//!     .search("abc-123", "hello", &SearchParams::default(), QueryParams::new())
//!     .await?;
//! for entry in results.items("gmeta") {
//!     println!("{}", entry["subject"]);
//! }
//! # Ok(())
//! # }
//! ```

mod api_error;
mod authorizer;
mod client;
mod observer;
mod response;
mod transport;

pub use api_error::{ApiError, ErrorTranslator, SearchErrorTranslator};
pub use authorizer::{
    AccessTokenAuthorizer, Authorizer, AuthorizerKind, BasicAuthorizer,
    ClientCredentialsAuthorizer, RefreshTokenAuthorizer, TokenEndpoint, TokenResponse,
    EXPIRES_ADJUST_SECONDS,
};
pub use client::{IndexClient, IndexClientBuilder};
pub use observer::{CallObserver, TracingObserver};
pub use response::ApiResponse;
pub use transport::{HttpRequest, RawResponse, ReqwestTransport, Transport};

pub use searchindex_core::{
    ClientConfig, DeleteQuery, EntryParams, Facet, FacetType, Filter, GMetaEntry, GMetaList,
    IndexId, IngestDocument, QueryParams, RangeBound, SearchParams, SearchQuery, SortField,
    SortOrder,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Token request failed ({status}): {message}")]
    TokenRequest { status: u16, message: String },

    #[error("{0} authorizers are not supported by the search API")]
    UnsupportedAuthorizer(AuthorizerKind),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api(err) => Some(err.status),
            ClientError::TokenRequest { status, .. } => Some(*status),
            ClientError::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
