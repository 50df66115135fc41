pub mod shapes;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::multipart::Form;
use reqwest::{RequestBuilder, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::TransportError;

/// HTTP transport to the document backend. Knows nothing about documents;
/// returns parsed JSON or a typed failure.
///
/// Endpoints are given as path segments. Each segment is percent-encoded, so
/// an opaque id can never spill into the query or a sibling path.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
    fetch_timeout: Duration,
    upload_timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("API_BASE_URL is not a valid URL: {:?}", config.base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("API_BASE_URL must be an http(s) URL, got {:?}", config.base_url);
        }

        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            fetch_timeout: config.fetch_timeout,
            upload_timeout: config.upload_timeout,
        })
    }

    /// Append segments to the base URL. A trailing empty segment keeps a
    /// trailing slash.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn get_json(&self, segments: &[&str]) -> Result<Value, TransportError> {
        let url = self.url(segments);
        let req = self.client.get(url.clone()).timeout(self.fetch_timeout);
        self.send(&url, req).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
        body: &B,
    ) -> Result<Value, TransportError> {
        let url = self.url(segments);
        let req = self
            .client
            .post(url.clone())
            .query(query)
            .json(body)
            .timeout(self.fetch_timeout);
        self.send(&url, req).await
    }

    pub async fn delete(&self, segments: &[&str]) -> Result<(), TransportError> {
        let url = self.url(segments);
        let req = self.client.delete(url.clone()).timeout(self.fetch_timeout);
        self.send(&url, req).await.map(|_| ())
    }

    pub async fn post_multipart(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
        form: Form,
    ) -> Result<Value, TransportError> {
        let url = self.url(segments);
        let req = self
            .client
            .post(url.clone())
            .query(query)
            .multipart(form)
            .timeout(self.upload_timeout);
        self.send(&url, req).await
    }

    /// Send, require a 2xx status, and parse the body. A body that isn't JSON is
    /// returned as a bare string; an empty body is `null`.
    async fn send(&self, url: &Url, req: RequestBuilder) -> Result<Value, TransportError> {
        let url = url.as_str();
        let resp = req
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            debug!(url, status = status.as_u16(), "non-success response");
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let text = resp
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(url, e))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> ApiClient {
        let config = ClientConfig::default()
            .with_base_url(format!("{}/", server.uri()))
            .with_fetch_timeout(Duration::from_millis(200));
        ApiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_get_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/documents"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let value = client.get_json(&["documents"]).await.unwrap();
        assert_eq!(value, json!([{"id": 1}]));
    }

    #[tokio::test]
    async fn test_plain_text_body_is_bare_string() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nlp/summary/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("A plain summary"))
            .mount(&server)
            .await;

        let value = client_for(&server).get_json(&["nlp", "summary", "1"]).await.unwrap();
        assert_eq!(value, Value::String("A plain summary".into()));
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server).get_json(&["documents"]).await.unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"summary": "late"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).get_json(&["nlp", "summary", "1"]).await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_post_json_sends_body_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/nlp/qa"))
            .and(query_param("top_k", "5"))
            .and(body_json(json!({"question": "why?", "doc_id": "3"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "because"})))
            .expect(1)
            .mount(&server)
            .await;

        let value = client_for(&server)
            .post_json(
                &["nlp", "qa"],
                &[("top_k", "5".to_string())],
                &json!({"question": "why?", "doc_id": "3"}),
            )
            .await
            .unwrap();
        assert_eq!(value["answer"], "because");
    }

    #[tokio::test]
    async fn test_delete_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/documents/4"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).delete(&["documents", "4"]).await.unwrap();
    }

    #[tokio::test]
    async fn test_segments_are_percent_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/documents/1%3Fx%2Fy%23z"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/documents/1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        client_for(&server)
            .delete(&["documents", "1?x/y#z"])
            .await
            .unwrap();
    }

    #[test]
    fn test_url_joins_under_base_path() {
        let config = ClientConfig::default().with_base_url("http://backend:8000/api/");
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(
            client.url(&["upload", ""]).as_str(),
            "http://backend:8000/api/upload/"
        );
        assert_eq!(
            client.url(&["nlp", "summary", "a b"]).as_str(),
            "http://backend:8000/api/nlp/summary/a%20b"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = ClientConfig::default().with_base_url("localhost 8000");
        assert!(ApiClient::new(&config).is_err());
    }
}
