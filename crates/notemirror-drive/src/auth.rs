//! Service-account authorization for the Drive API
//!
//! Implements the OAuth 2.0 JWT bearer grant (RFC 7523) used by Google
//! service accounts: an RS256-signed assertion is exchanged at the token
//! endpoint for a short-lived access token.
//!
//! ## Components
//!
//! - [`ServiceAccountKey`] - The identity and key from a JSON key file
//! - [`sign_assertion`] - Builds and signs the assertion
//! - [`exchange_assertion`] - Trades an assertion for an [`AccessToken`]
//! - [`DriveAuthorizer`] - `IAuthorizer` implementation with a per-identity token cache

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use notemirror_core::domain::credentials::Credentials;
use notemirror_core::domain::errors::AuthError;
use notemirror_core::ports::authorizer::IAuthorizer;
use notemirror_core::ports::remote_store::IRemoteStore;

use crate::client::{DriveClient, DRIVE_BASE_URL};
use crate::provider::DriveRemoteStore;

/// Default Google OAuth2 token endpoint
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Full read/write access to Drive
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Grant type for the assertion exchange
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion, in seconds
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// A cached token is renewed once it is this close to expiry
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

// ============================================================================
// ServiceAccountKey
// ============================================================================

/// The fields of a Google service-account JSON key file that matter here
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
}

impl ServiceAccountKey {
    /// Parses a key file's JSON content
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse service-account key JSON")
    }
}

// ============================================================================
// Assertion
// ============================================================================

/// JWT claims of the bearer assertion
#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Accepts keys pasted with literal `\n` sequences in place of newlines
fn normalize_pem(pem: &str) -> Cow<'_, str> {
    if !pem.contains('\n') && pem.contains("\\n") {
        Cow::Owned(pem.replace("\\n", "\n"))
    } else {
        Cow::Borrowed(pem)
    }
}

/// Checks the identity and parses the PEM key
///
/// # Errors
/// [`AuthError::MalformedCredentials`] if the identity is empty or the key
/// cannot be parsed
fn signing_key(client_identity: &str, private_key_pem: &str) -> Result<EncodingKey, AuthError> {
    if client_identity.trim().is_empty() {
        return Err(AuthError::MalformedCredentials(
            "client identity is empty".to_string(),
        ));
    }
    if private_key_pem.trim().is_empty() {
        return Err(AuthError::MalformedCredentials(
            "private key is empty".to_string(),
        ));
    }

    EncodingKey::from_rsa_pem(normalize_pem(private_key_pem).as_bytes())
        .map_err(|e| AuthError::MalformedCredentials(format!("unparsable private key: {e}")))
}

/// Builds and signs the RS256 assertion for `client_identity`
///
/// # Errors
/// [`AuthError::MalformedCredentials`] if the identity is empty or the key
/// cannot be parsed or used for signing
pub fn sign_assertion(
    client_identity: &str,
    private_key_pem: &str,
    token_url: &str,
    issued_at: DateTime<Utc>,
) -> Result<String, AuthError> {
    let key = signing_key(client_identity, private_key_pem)?;
    sign_with_key(client_identity, &key, token_url, issued_at)
}

fn sign_with_key(
    client_identity: &str,
    key: &EncodingKey,
    token_url: &str,
    issued_at: DateTime<Utc>,
) -> Result<String, AuthError> {
    let iat = issued_at.timestamp();
    let claims = AssertionClaims {
        iss: client_identity.to_string(),
        scope: DRIVE_SCOPE.to_string(),
        aud: token_url.to_string(),
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    };

    encode(&Header::new(Algorithm::RS256), &claims, key)
        .map_err(|e| AuthError::MalformedCredentials(format!("failed to sign assertion: {e}")))
}

// ============================================================================
// Token exchange
// ============================================================================

/// An access token and the instant it stops being valid
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Returns true if the token will expire within the given duration
    pub fn expires_within(&self, duration: chrono::Duration) -> bool {
        Utc::now() + duration >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

/// Exchanges a signed assertion for an access token
pub async fn exchange_assertion(
    http: &Client,
    token_url: &str,
    assertion: &str,
) -> Result<AccessToken> {
    let response = http
        .post(token_url)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion)])
        .send()
        .await
        .context("Failed to reach token endpoint")?;

    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read token response")?;

    if !status.is_success() {
        let detail = match serde_json::from_str::<TokenErrorResponse>(&body) {
            Ok(err) => match err.error_description {
                Some(desc) => format!("{}: {}", err.error, desc),
                None => err.error,
            },
            Err(_) => body.trim().to_string(),
        };
        anyhow::bail!("Token endpoint returned {status}: {detail}");
    }

    let token: TokenResponse =
        serde_json::from_str(&body).context("Failed to parse token response JSON")?;

    Ok(AccessToken {
        token: token.access_token,
        expires_at: Utc::now() + chrono::Duration::seconds(token.expires_in),
    })
}

// ============================================================================
// Token cache
// ============================================================================

/// Access tokens keyed by client identity, shared with the stores handed out
#[derive(Debug, Clone, Default)]
struct TokenCache {
    tokens: Arc<Mutex<HashMap<String, AccessToken>>>,
}

impl TokenCache {
    async fn remove(&self, client_identity: &str) {
        self.tokens.lock().await.remove(client_identity);
    }
}

/// Handle a store uses to drop its token once the API rejects it
///
/// Only the leased token is evicted; a newer token for the same identity
/// is left alone.
#[derive(Debug, Clone)]
pub struct TokenLease {
    cache: TokenCache,
    client_identity: String,
    token: String,
}

impl TokenLease {
    pub async fn revoke(&self) {
        let mut tokens = self.cache.tokens.lock().await;
        if tokens
            .get(&self.client_identity)
            .is_some_and(|cached| cached.token == self.token)
        {
            tokens.remove(&self.client_identity);
            info!(identity = %self.client_identity, "Dropped rejected access token");
        }
    }
}

// ============================================================================
// DriveAuthorizer
// ============================================================================

/// Authorizer that produces [`DriveRemoteStore`] clients
///
/// Access tokens are cached per client identity and reused until they are
/// within a minute of expiry, or until a store reports a 401 with them.
/// The key is parsed on every call, so a malformed key fails even while a
/// token for the identity is cached.
pub struct DriveAuthorizer {
    http: Client,
    token_url: String,
    api_base_url: String,
    cache: TokenCache,
}

impl DriveAuthorizer {
    /// Creates an authorizer against the public Google endpoints
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_endpoints(TOKEN_URL, DRIVE_BASE_URL, timeout)
    }

    /// Creates an authorizer with custom endpoints (useful for testing)
    pub fn with_endpoints(
        token_url: impl Into<String>,
        api_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            token_url: token_url.into(),
            api_base_url: api_base_url.into(),
            cache: TokenCache::default(),
        })
    }

    /// Returns a valid access token for `credentials`, exchanging a new
    /// assertion only when the cached one is missing or about to expire
    pub async fn access_token(&self, credentials: &Credentials) -> Result<AccessToken, AuthError> {
        let identity = credentials.client_identity.as_str();
        let key = signing_key(identity, &credentials.private_key)?;
        let mut cache = self.cache.tokens.lock().await;

        if let Some(cached) = cache.get(identity) {
            if !cached.expires_within(chrono::Duration::seconds(TOKEN_REFRESH_MARGIN_SECS)) {
                debug!(identity, "Reusing cached access token");
                return Ok(cached.clone());
            }
        }

        let assertion = sign_with_key(identity, &key, &self.token_url, Utc::now())?;
        let token = exchange_assertion(&self.http, &self.token_url, &assertion)
            .await
            .map_err(AuthError::ExchangeRejected)?;

        info!(identity, expires_at = %token.expires_at, "Obtained access token");
        cache.insert(identity.to_string(), token.clone());
        Ok(token)
    }

    /// Drops any cached token for `client_identity`
    pub async fn forget(&self, client_identity: &str) {
        self.cache.remove(client_identity).await;
    }
}

#[async_trait]
impl IAuthorizer for DriveAuthorizer {
    async fn authorize(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<dyn IRemoteStore>, AuthError> {
        let token = self.access_token(credentials).await?;
        let lease = TokenLease {
            cache: self.cache.clone(),
            client_identity: credentials.client_identity.clone(),
            token: token.token.clone(),
        };
        let client = DriveClient::from_parts(self.http.clone(), &self.api_base_url, token.token);
        Ok(Arc::new(DriveRemoteStore::with_lease(client, lease)))
    }
}
