//! Synonym lookup backed by the Datamuse word-finding API.
//!
//! `GET /words?ml=<word>` returns candidates ranked by semantic closeness;
//! the generator caps how deep into the ranking it will reach.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use lingbot_core::error::ServiceError;
use lingbot_core::traits::SynonymLookup;

const DEFAULT_BASE_URL: &str = "https://api.datamuse.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub struct DatamuseClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct DatamuseEntry {
    word: String,
}

impl DatamuseClient {
    pub fn new(base_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

#[async_trait]
impl SynonymLookup for DatamuseClient {
    #[instrument(skip(self))]
    async fn synonyms(&self, word: &str) -> anyhow::Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/words", self.base_url))
            .query(&[("ml", word)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    ServiceError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.text().await.unwrap_or_default();
            return Err(ServiceError::ApiError { status, message }.into());
        }

        let entries: Vec<DatamuseEntry> = response
            .json()
            .await
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;
        Ok(entries.into_iter().map(|e| e.word).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_candidates_in_rank_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/words"))
            .and(query_param("ml", "cat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"word": "feline", "score": 90},
                {"word": "kitty", "score": 70},
                {"word": "tomcat", "score": 50},
            ])))
            .mount(&server)
            .await;

        let client = DatamuseClient::new(Some(server.uri()));
        let synonyms = client.synonyms("cat").await.unwrap();
        assert_eq!(synonyms, vec!["feline", "kitty", "tomcat"]);
    }

    #[tokio::test]
    async fn empty_result_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/words"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = DatamuseClient::new(Some(server.uri()));
        assert!(client.synonyms("zxqj").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn server_error_surfaces_as_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/words"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = DatamuseClient::new(Some(server.uri()));
        let err = client.synonyms("cat").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::ApiError { status: 500, .. })
        ));
    }
}
