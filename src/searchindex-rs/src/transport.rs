use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client as HttpClient, Method};
use searchindex_core::{ClientConfig, QueryParams};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::{ClientError, Result};

/// A single outbound call, fully shaped by the facade
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub params: QueryParams,
    pub body: Option<serde_json::Value>,
    pub authorization: Option<String>,
}

/// Status and body text of a completed call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs HTTP calls on behalf of the client.
///
/// Implementations return any status the server produced; only failures to
/// get a response at all are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse>;
}

/// Transport backed by a pooled reqwest client
pub struct ReqwestTransport {
    http: HttpClient,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base = config.base_url.trim_end_matches('/');
        if base.is_empty() {
            return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let base_url =
            Url::parse(base).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL for `path` below the base URL. Path and query values are
    /// percent-encoded here.
    pub fn url_for(&self, path: &str, params: &QueryParams) -> Url {
        let mut url = self.base_url.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}{}", prefix, path));

        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params.iter() {
                pairs.append_pair(key, value);
            }
        }
        url
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse> {
        let url = self.url_for(&request.path, &request.params);
        debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = self
            .http
            .request(request.method, url)
            .header(ACCEPT, "application/json");

        if let Some(authorization) = &request.authorization {
            builder = builder.header(AUTHORIZATION, authorization);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(status, bytes = body.len(), "Received response");
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base_url: &str) -> ReqwestTransport {
        ReqwestTransport::new(&ClientConfig::new(base_url)).unwrap()
    }

    #[test]
    fn test_rejects_bad_base_urls() {
        for url in ["", "search.example.org", "ftp://search.example.org"] {
            match ReqwestTransport::new(&ClientConfig::new(url)) {
                Err(ClientError::InvalidUrl(_)) => {}
                Err(e) => panic!("Expected InvalidUrl for {:?}, got: {:?}", url, e),
                Ok(_) => panic!("Expected InvalidUrl for {:?}", url),
            }
        }
    }

    #[test]
    fn test_url_for_trims_trailing_slashes() {
        let t = transport("https://search.example.org///");
        let url = t.url_for("/v1/index/abc-123", &QueryParams::new());
        assert_eq!(url.as_str(), "https://search.example.org/v1/index/abc-123");
    }

    #[test]
    fn test_url_for_keeps_base_path_prefix() {
        let t = transport("http://localhost:8080/api/");
        let url = t.url_for("/v1/index/abc-123/search", &QueryParams::new());
        assert_eq!(url.path(), "/api/v1/index/abc-123/search");
    }

    #[test]
    fn test_url_for_preserves_param_order() {
        let t = transport("https://search.example.org");
        let params = QueryParams::new()
            .with("q", "hello")
            .with("offset", 0)
            .with("limit", 10)
            .with("advanced", false);

        let url = t.url_for("/v1/index/abc-123/search", &params);
        assert_eq!(url.query(), Some("q=hello&offset=0&limit=10&advanced=false"));
    }

    #[test]
    fn test_url_for_percent_encodes_subject() {
        let t = transport("https://search.example.org");
        let params = QueryParams::new().with("subject", "https://example.com/a b?c=d");

        let url = t.url_for("/v1/index/abc-123/subject", &params);
        assert_eq!(
            url.query(),
            Some("subject=https%3A%2F%2Fexample.com%2Fa+b%3Fc%3Dd")
        );

        let decoded: Vec<_> = url.query_pairs().collect();
        assert_eq!(decoded[0].1, "https://example.com/a b?c=d");
    }
}
