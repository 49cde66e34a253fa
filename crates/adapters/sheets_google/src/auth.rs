//! OAuth2 access tokens for the Sheets API.
//!
//! [`ServiceAccountTokenSource`] implements the JWT-bearer grant: it signs
//! an RS256 assertion with the service account's private key and trades it
//! at the token endpoint for a short-lived access token, which is reused
//! until shortly before it expires.

use std::fmt;
use std::future::Future;
use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::SheetsError;

/// OAuth scope for reading and writing spreadsheets.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME: TimeDelta = TimeDelta::hours(1);
const REFRESH_MARGIN: TimeDelta = TimeDelta::minutes(1);

/// Supplies bearer tokens for Sheets requests.
pub trait AccessTokenSource {
    fn access_token(&self) -> impl Future<Output = Result<String, SheetsError>> + Send;
}

/// A fixed token, for tests and externally managed credentials.
#[derive(Clone)]
pub struct StaticToken(pub String);

impl AccessTokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, SheetsError> {
        Ok(self.0.clone())
    }
}

/// The fields of a service-account key file that the grant needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Read a key file downloaded from the cloud console.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::KeyFile`] if the file cannot be read and
    /// [`SheetsError::KeyFormat`] if it is not a service-account key.
    pub fn from_file(path: &Path) -> Result<Self, SheetsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SheetsError::KeyFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    value: String,
    refresh_at: DateTime<Utc>,
}

/// Exchanges signed assertions for access tokens and caches the result.
pub struct ServiceAccountTokenSource {
    http: reqwest::Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    /// # Errors
    ///
    /// Returns [`SheetsError::Signing`] if the private key is not a valid
    /// RSA PEM key.
    pub fn new(http: reqwest::Client, key: ServiceAccountKey) -> Result<Self, SheetsError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        Ok(Self {
            http,
            key,
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String, SheetsError> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: SPREADSHEETS_SCOPE,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: (now + ASSERTION_LIFETIME).timestamp(),
        };
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    async fn exchange(&self) -> Result<CachedToken, SheetsError> {
        let now = Utc::now();
        let assertion = self.assertion(now)?;
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SheetsError::Status {
                context: "token exchange",
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let token: TokenResponse = response.json().await?;
        tracing::debug!(expires_in = token.expires_in, "obtained access token");
        Ok(CachedToken {
            value: token.access_token,
            refresh_at: now + TimeDelta::seconds(token.expires_in) - REFRESH_MARGIN,
        })
    }
}

impl AccessTokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<String, SheetsError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| Utc::now() < t.refresh_at) {
            return Ok(token.value.clone());
        }
        let token = self.exchange().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }
}
