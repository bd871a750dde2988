//! Authorization header providers.
//!
//! The search API only accepts bearer tokens. [`BasicAuthorizer`] exists for
//! services that take client credentials directly and is refused by
//! [`crate::IndexClient`].

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client as HttpClient;
use searchindex_core::ClientConfig;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{ClientError, Result};

/// Tokens expiring within this many seconds are refreshed before use
pub const EXPIRES_ADJUST_SECONDS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizerKind {
    AccessToken,
    RefreshToken,
    ClientCredentials,
    Basic,
}

impl AuthorizerKind {
    pub fn is_token_based(self) -> bool {
        !matches!(self, AuthorizerKind::Basic)
    }
}

impl fmt::Display for AuthorizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthorizerKind::AccessToken => "access token",
            AuthorizerKind::RefreshToken => "refresh token",
            AuthorizerKind::ClientCredentials => "client credentials",
            AuthorizerKind::Basic => "basic auth",
        };
        f.write_str(name)
    }
}

/// Supplies the `Authorization` header value for each request
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorization_header(&self) -> Result<String>;
    fn kind(&self) -> AuthorizerKind;
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Sends a fixed access token
pub struct AccessTokenAuthorizer {
    access_token: String,
}

impl AccessTokenAuthorizer {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }
}

#[async_trait]
impl Authorizer for AccessTokenAuthorizer {
    async fn authorization_header(&self) -> Result<String> {
        Ok(bearer(&self.access_token))
    }

    fn kind(&self) -> AuthorizerKind {
        AuthorizerKind::AccessToken
    }
}

/// HTTP basic auth from a username and password
pub struct BasicAuthorizer {
    encoded: String,
}

impl BasicAuthorizer {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            encoded: STANDARD.encode(format!("{}:{}", username, password)),
        }
    }
}

#[async_trait]
impl Authorizer for BasicAuthorizer {
    async fn authorization_header(&self) -> Result<String> {
        Ok(format!("Basic {}", self.encoded))
    }

    fn kind(&self) -> AuthorizerKind {
        AuthorizerKind::Basic
    }
}

/// Token endpoint reply
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64, // seconds
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub resource_server: Option<String>,
}

/// OAuth2 token endpoint used by the refreshing authorizers.
///
/// Confidential clients authenticate with their secret over basic auth;
/// native clients send only `client_id` in the form.
#[derive(Clone)]
pub struct TokenEndpoint {
    http: HttpClient,
    token_url: String,
    client_id: String,
    client_secret: Option<String>,
}

impl TokenEndpoint {
    pub fn new(token_url: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(),
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: None,
        }
    }

    pub fn from_config(config: &ClientConfig, client_id: impl Into<String>) -> Self {
        Self::new(config.token_url(), client_id)
    }

    pub fn with_client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// POST a grant to the token endpoint
    pub async fn grant(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let mut fields = form.to_vec();
        let mut builder = self.http.post(&self.token_url);

        match &self.client_secret {
            Some(secret) => builder = builder.basic_auth(&self.client_id, Some(secret)),
            None => fields.push(("client_id", self.client_id.as_str())),
        }

        debug!(url = %self.token_url, "Requesting token");
        let response = builder.form(&fields).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = %status, "Token request rejected");
            return Err(ClientError::TokenRequest {
                status: status.as_u16(),
                message,
            });
        }

        response.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("Failed to parse token response: {}", e))
        })
    }
}

type RefreshCallback = Arc<dyn Fn(&TokenResponse) + Send + Sync>;

struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Fails when `expires_in` does not describe a representable instant
    fn from_response(response: &TokenResponse, now: DateTime<Utc>) -> Result<Self> {
        let expires_at = Duration::try_seconds(response.expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                ClientError::InvalidResponse(format!(
                    "token expires_in out of range: {}",
                    response.expires_in
                ))
            })?;

        Ok(Self {
            access_token: response.access_token.clone(),
            expires_at,
        })
    }

    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        Duration::try_seconds(EXPIRES_ADJUST_SECONDS)
            .and_then(|margin| self.expires_at.checked_sub_signed(margin))
            .is_some_and(|refresh_at| refresh_at > now)
    }
}

struct RefreshState {
    refresh_token: String,
    current: Option<CachedToken>,
}

/// Exchanges a refresh token for access tokens as they expire.
///
/// A rotated refresh token in the reply replaces the stored one.
pub struct RefreshTokenAuthorizer {
    endpoint: TokenEndpoint,
    state: Mutex<RefreshState>,
    on_refresh: Option<RefreshCallback>,
}

impl RefreshTokenAuthorizer {
    pub fn new(refresh_token: impl Into<String>, endpoint: TokenEndpoint) -> Self {
        Self {
            endpoint,
            state: Mutex::new(RefreshState {
                refresh_token: refresh_token.into(),
                current: None,
            }),
            on_refresh: None,
        }
    }

    /// Seed with a token obtained earlier, used until it nears expiry
    pub fn with_access_token(
        mut self,
        access_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        self.state.get_mut().current = Some(CachedToken {
            access_token: access_token.into(),
            expires_at,
        });
        self
    }

    /// Called with every new token, e.g. to persist it
    pub fn with_on_refresh(
        mut self,
        callback: impl Fn(&TokenResponse) + Send + Sync + 'static,
    ) -> Self {
        self.on_refresh = Some(Arc::new(callback));
        self
    }
}

#[async_trait]
impl Authorizer for RefreshTokenAuthorizer {
    async fn authorization_header(&self) -> Result<String> {
        let mut state = self.state.lock().await;
        let now = Utc::now();

        if let Some(token) = state.current.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(bearer(&token.access_token));
        }

        info!("Access token missing or expiring, refreshing");
        let response = self
            .endpoint
            .grant(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", state.refresh_token.as_str()),
            ])
            .await?;

        if let Some(rotated) = &response.refresh_token {
            state.refresh_token = rotated.clone();
        }
        let token = CachedToken::from_response(&response, now)?;
        let header = bearer(&token.access_token);
        state.current = Some(token);

        if let Some(callback) = &self.on_refresh {
            callback(&response);
        }
        Ok(header)
    }

    fn kind(&self) -> AuthorizerKind {
        AuthorizerKind::RefreshToken
    }
}

/// Obtains tokens for a confidential client with the client credentials grant
pub struct ClientCredentialsAuthorizer {
    endpoint: TokenEndpoint,
    scopes: String,
    current: Mutex<Option<CachedToken>>,
    on_refresh: Option<RefreshCallback>,
}

impl ClientCredentialsAuthorizer {
    /// `scopes` is a space separated scope string
    pub fn new(endpoint: TokenEndpoint, scopes: impl Into<String>) -> Self {
        Self {
            endpoint,
            scopes: scopes.into(),
            current: Mutex::new(None),
            on_refresh: None,
        }
    }

    pub fn with_on_refresh(
        mut self,
        callback: impl Fn(&TokenResponse) + Send + Sync + 'static,
    ) -> Self {
        self.on_refresh = Some(Arc::new(callback));
        self
    }
}

#[async_trait]
impl Authorizer for ClientCredentialsAuthorizer {
    async fn authorization_header(&self) -> Result<String> {
        let mut current = self.current.lock().await;
        let now = Utc::now();

        if let Some(token) = current.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(bearer(&token.access_token));
        }

        info!(scopes = %self.scopes, "Requesting client credentials token");
        let response = self
            .endpoint
            .grant(&[
                ("grant_type", "client_credentials"),
                ("scope", self.scopes.as_str()),
            ])
            .await?;

        let token = CachedToken::from_response(&response, now)?;
        let header = bearer(&token.access_token);
        *current = Some(token);

        if let Some(callback) = &self.on_refresh {
            callback(&response);
        }
        Ok(header)
    }

    fn kind(&self) -> AuthorizerKind {
        AuthorizerKind::ClientCredentials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_basic_is_rejected() {
        assert!(AuthorizerKind::AccessToken.is_token_based());
        assert!(AuthorizerKind::RefreshToken.is_token_based());
        assert!(AuthorizerKind::ClientCredentials.is_token_based());
        assert!(!AuthorizerKind::Basic.is_token_based());
    }

    #[tokio::test]
    async fn test_static_headers() {
        let token = AccessTokenAuthorizer::new("abc");
        assert_eq!(token.authorization_header().await.unwrap(), "Bearer abc");

        let basic = BasicAuthorizer::new("client", "secret");
        assert_eq!(
            basic.authorization_header().await.unwrap(),
            "Basic Y2xpZW50OnNlY3JldA=="
        );
    }

    #[test]
    fn test_token_freshness_margin() {
        let now = Utc::now();
        let fresh = CachedToken {
            access_token: "a".into(),
            expires_at: now + Duration::seconds(EXPIRES_ADJUST_SECONDS + 5),
        };
        let expiring = CachedToken {
            access_token: "b".into(),
            expires_at: now + Duration::seconds(EXPIRES_ADJUST_SECONDS - 5),
        };

        assert!(fresh.is_fresh(now));
        assert!(!expiring.is_fresh(now));
    }

    #[test]
    fn test_out_of_range_expiry_is_an_error() {
        let now = Utc::now();
        let response = TokenResponse {
            access_token: "t".into(),
            expires_in: i64::MAX,
            token_type: None,
            refresh_token: None,
            scope: None,
            resource_server: None,
        };

        match CachedToken::from_response(&response, now) {
            Err(ClientError::InvalidResponse(msg)) => assert!(msg.contains("expires_in")),
            Err(e) => panic!("Expected InvalidResponse, got: {:?}", e),
            Ok(_) => panic!("Expected InvalidResponse"),
        }

        let response = TokenResponse {
            expires_in: 3600,
            ..response
        };
        let token = CachedToken::from_response(&response, now).unwrap();
        assert!(token.is_fresh(now));
    }

    #[tokio::test]
    async fn test_seeded_token_is_used_without_refresh() {
        let endpoint = TokenEndpoint::new("http://127.0.0.1:9/v2/oauth2/token", "client");
        let authorizer = RefreshTokenAuthorizer::new("refresh", endpoint)
            .with_access_token("seeded", Utc::now() + Duration::hours(1));

        assert_eq!(
            authorizer.authorization_header().await.unwrap(),
            "Bearer seeded"
        );
    }
}
