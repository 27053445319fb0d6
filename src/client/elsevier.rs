// Elsevier API client
// Authenticates with an API key (and optional institutional token) sent as headers.
// API Reference: https://dev.elsevier.com/api_docs.html

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::provider::ApiClient;
use crate::config::ApiConfig;
use crate::types::ClientError;

const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-els-apikey");
const INST_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-els-insttoken");
const USER_AGENT: &str = concat!("elsevier-search/", env!("CARGO_PKG_VERSION"));

pub struct ElsevierClient {
    client: Client,
}

impl ElsevierClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_str(&config.api_key)?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.inst_token {
            headers.insert(INST_TOKEN_HEADER, HeaderValue::from_str(token)?);
        }

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client })
    }

    /// Shorthand for a client with only an API key and default settings.
    pub fn with_api_key(api_key: &str) -> Result<Self, ClientError> {
        Self::new(&ApiConfig::new(api_key))
    }
}

#[async_trait]
impl ApiClient for ElsevierClient {
    async fn exec_request(&self, uri: &str) -> Result<Value, ClientError> {
        debug!(uri = %uri, "Sending API request");

        let response = self.client.get(uri).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(uri = %uri, status = %status, "API request rejected");
            return Err(ClientError::Status { status, body });
        }

        let body = response.json::<Value>().await?;
        debug!(uri = %uri, status = %status, "API response received");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_user_agent() {
        assert!(USER_AGENT.starts_with("elsevier-search/"));
    }

    #[test]
    fn test_rejects_invalid_api_key() {
        let result = ElsevierClient::with_api_key("bad\nkey");
        assert!(matches!(result, Err(ClientError::InvalidHeader(_))));
    }

    #[tokio::test]
    async fn test_sends_auth_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/scopus")
            .match_query(Matcher::UrlEncoded("query".into(), "heart attack".into()))
            .match_header("x-els-apikey", "test-key")
            .match_header("x-els-insttoken", "inst-token")
            .match_header("accept", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"search-results": {"opensearch:totalResults": "0"}}"#)
            .create_async()
            .await;

        let mut config = ApiConfig::new("test-key");
        config.inst_token = Some("inst-token".to_string());
        let client = ElsevierClient::new(&config).unwrap();

        let uri = format!("{}/scopus?query=heart+attack", server.url());
        let body = client.exec_request(&uri).await.unwrap();

        assert_eq!(body["search-results"]["opensearch:totalResults"], "0");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/scopus")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("invalid api key")
            .create_async()
            .await;

        let client = ElsevierClient::with_api_key("wrong-key").unwrap();
        let uri = format!("{}/scopus?query=x", server.url());
        let err = client.exec_request(&uri).await.unwrap_err();

        match err {
            ClientError::Status { status, body } => {
                assert_eq!(status.as_u16(), 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
