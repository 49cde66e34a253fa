//! # cardtrail-adapter-trello-reqwest
//!
//! [`TrackerApi`] implementation for the Trello REST API.
//!
//! Every request carries the `key` and `token` query parameters. A 401
//! response maps to [`TrackerError::Unauthorized`]; any other non-success
//! status, transport failure or undecodable body maps to
//! [`TrackerError::Remote`]. Requests are not retried.
//!
//! The request URL carries the credentials, so it is stripped from transport
//! errors before they leave the adapter.

mod error;

use std::fmt;
use std::time::Duration;

use cardtrail_app::ports::{ApiRequest, TrackerApi};
use cardtrail_domain::error::TrackerError;

pub use error::TrelloError;

/// Public Trello API root.
pub const DEFAULT_BASE_URL: &str = "https://api.trello.com/1";

/// Connection settings for [`TrelloClient`].
#[derive(Clone)]
pub struct TrelloConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_token: String,
    pub timeout: Duration,
}

impl TrelloConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            api_token: api_token.into(),
            timeout: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

// Credentials stay out of logs.
impl fmt::Debug for TrelloConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrelloConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("api_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Authenticated Trello client.
#[derive(Debug, Clone)]
pub struct TrelloClient {
    http: reqwest::Client,
    config: TrelloConfig,
}

impl TrelloClient {
    /// Build a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TrelloError::Http`] if the HTTP client cannot be built.
    pub fn new(config: TrelloConfig) -> Result<Self, TrelloError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }
}

impl TrackerApi for TrelloClient {
    async fn get(&self, request: &ApiRequest) -> Result<serde_json::Value, TrackerError> {
        tracing::debug!(path = %request.path, "GET");
        let response = self
            .http
            .get(self.url(&request.path))
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("token", self.config.api_token.as_str()),
            ])
            .query(&request.params)
            .send()
            .await
            .map_err(TrelloError::transport)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::error!(path = %request.path, "credentials rejected");
            return Err(TrackerError::Unauthorized);
        }
        if !status.is_success() {
            return Err(TrelloError::Status {
                status: status.as_u16(),
                path: request.path.clone(),
            }
            .into());
        }

        let body = response.json().await.map_err(TrelloError::transport)?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use super::*;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: &str) -> TrelloClient {
        TrelloClient::new(TrelloConfig::new("k", "t").with_base_url(base_url)).unwrap()
    }

    #[tokio::test]
    async fn should_send_credentials_and_params() {
        let router = Router::new().route(
            "/cards/{id}/actions",
            get(|Query(query): Query<HashMap<String, String>>| async move {
                Json(json!({
                    "key": query.get("key"),
                    "token": query.get("token"),
                    "filter": query.get("filter"),
                    "limit": query.get("limit"),
                }))
            }),
        );
        let base_url = serve(router).await;
        let card_id = "c1".parse().unwrap();

        let body = client(&base_url)
            .get(&ApiRequest::card_actions(&card_id))
            .await
            .unwrap();

        assert_eq!(
            body,
            json!({
                "key": "k",
                "token": "t",
                "filter": "updateCard,createCard,moveCardToBoard",
                "limit": "1000",
            })
        );
    }

    #[tokio::test]
    async fn should_map_401_to_unauthorized() {
        let router = Router::new().route(
            "/members/me/boards",
            get(|| async { (StatusCode::UNAUTHORIZED, "invalid token") }),
        );
        let base_url = serve(router).await;

        let result = client(&base_url).get(&ApiRequest::member_boards()).await;

        assert!(matches!(result, Err(TrackerError::Unauthorized)));
    }

    #[tokio::test]
    async fn should_map_other_statuses_to_remote() {
        let router = Router::new().route(
            "/members/me/boards",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base_url = serve(router).await;

        let result = client(&base_url).get(&ApiRequest::member_boards()).await;

        let Err(TrackerError::Remote(source)) = result else {
            panic!("expected remote error");
        };
        assert_eq!(
            source.to_string(),
            "GET /members/me/boards returned status 429"
        );
    }

    #[tokio::test]
    async fn should_map_invalid_body_to_remote() {
        let router = Router::new().route("/members/me/boards", get(|| async { "not json" }));
        let base_url = serve(router).await;

        let result = client(&base_url).get(&ApiRequest::member_boards()).await;

        assert!(matches!(result, Err(TrackerError::Remote(_))));
    }

    #[tokio::test]
    async fn should_tolerate_trailing_slash_in_base_url() {
        let router = Router::new().route(
            "/members/me/boards",
            get(|| async { Json(json!([{"id": "b1", "name": "Sprint"}])) }),
        );
        let base_url = serve(router).await;

        let body: Value = client(&format!("{base_url}/"))
            .get(&ApiRequest::member_boards())
            .await
            .unwrap();

        assert_eq!(body[0]["name"], "Sprint");
    }

    #[tokio::test]
    async fn should_keep_credentials_out_of_transport_errors() {
        let config =
            TrelloConfig::new("SECRETKEY", "SECRETTOKEN").with_base_url("http://127.0.0.1:1");
        let client = TrelloClient::new(config).unwrap();

        let result = client.get(&ApiRequest::member_boards()).await;

        let Err(err) = result else {
            panic!("expected connection failure");
        };
        assert!(matches!(err, TrackerError::Remote(_)));
        let debug = format!("{err:?}");
        let rendered = format!("{debug}\n{:?}", anyhow::Error::from(err));
        assert!(!rendered.contains("SECRETKEY"), "{rendered}");
        assert!(!rendered.contains("SECRETTOKEN"), "{rendered}");
    }

    #[test]
    fn should_redact_credentials_in_debug_output() {
        let rendered = format!("{:?}", TrelloConfig::new("secret-key", "secret-token"));

        assert!(!rendered.contains("secret"));
    }
}
