//! Gateway client for the FICS Mortgage Servicer REST endpoints.
//!
//! One request per invocation, no retry or backoff. The vendor expects a
//! JSON body on every verb, including GET.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{GatewayError, Result};

/// HTTP request timeout in seconds.
/// The batch endpoints render whole reports server-side before answering,
/// so this has to be generous, but a hung gateway must not block the
/// calling process indefinitely.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// The verbs the gateway supports. Anything else is a caller error, caught
/// before a request is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "post" => Ok(HttpMethod::Post),
            "put" => Ok(HttpMethod::Put),
            "delete" => Ok(HttpMethod::Delete),
            other => Err(GatewayError::Configuration(format!(
                "Invalid API method '{other}'"
            ))),
        }
    }
}

/// Client for one gateway base URL.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
}

impl GatewayClient {
    /// Create a client with the default request timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join the base URL and an endpoint suffix with exactly one slash.
    /// The deployed playbooks pass base URLs both with and without a
    /// trailing slash, and endpoints both with and without a leading one.
    fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Send one request and parse the 200 response as JSON.
    ///
    /// The body is sent as a JSON payload on every verb, GET included; the
    /// vendor reads request parameters from the body regardless of verb.
    /// Any non-200 status becomes a `Status` error carrying the raw
    /// response text.
    pub async fn send<B>(&self, method: HttpMethod, endpoint: &str, body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint_url(endpoint);
        debug!(method = %method, url = %url, "Sending gateway request");

        let request = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };

        let response = request
            .header(header::CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), url = %url, "Gateway returned error status");
            Err(GatewayError::from_status(status, &body))
        }
    }
}

/// Gate an envelope on its `ApiCallSuccessful` flag.
///
/// Anything other than an explicit `true` is a failure, regardless of the
/// HTTP status that delivered the envelope.
pub fn require_successful(envelope: Value) -> Result<Value> {
    match envelope.get("ApiCallSuccessful").and_then(Value::as_bool) {
        Some(true) => Ok(envelope),
        _ => Err(GatewayError::Unsuccessful { envelope }),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_method_parse_case_insensitive() {
        assert_eq!("post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert_eq!("GET".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("Put".parse::<HttpMethod>().unwrap(), HttpMethod::Put);
        assert_eq!("delete".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
    }

    #[test]
    fn test_method_parse_rejects_unknown_verb() {
        let err = "patch".parse::<HttpMethod>().unwrap_err();
        match err {
            GatewayError::Configuration(msg) => assert!(msg.contains("patch")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_endpoint_url_normalizes_slashes() {
        let cases = [
            ("http://ms.fics/BatchService.svc/REST", "GetTrialBalanceReport"),
            ("http://ms.fics/BatchService.svc/REST/", "GetTrialBalanceReport"),
            ("http://ms.fics/BatchService.svc/REST", "/GetTrialBalanceReport"),
            ("http://ms.fics/BatchService.svc/REST/", "/GetTrialBalanceReport"),
        ];
        for (base, endpoint) in cases {
            let client = GatewayClient::new(base).unwrap();
            assert_eq!(
                client.endpoint_url(endpoint),
                "http://ms.fics/BatchService.svc/REST/GetTrialBalanceReport",
                "base={base} endpoint={endpoint}"
            );
        }
    }

    #[test]
    fn test_require_successful() {
        assert!(require_successful(json!({"ApiCallSuccessful": true})).is_ok());

        for envelope in [
            json!({"ApiCallSuccessful": false}),
            json!({"ApiCallSuccessful": "true"}),
            json!({}),
        ] {
            match require_successful(envelope.clone()) {
                Err(GatewayError::Unsuccessful { envelope: kept }) => {
                    assert_eq!(kept, envelope)
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_send_dispatches_each_verb_with_body() {
        let mut server = mockito::Server::new_async().await;

        for (method, verb) in [
            (HttpMethod::Get, "GET"),
            (HttpMethod::Post, "POST"),
            (HttpMethod::Put, "PUT"),
            (HttpMethod::Delete, "DELETE"),
        ] {
            let mock = server
                .mock(verb, "/Echo")
                .match_header("content-type", "application/json")
                .match_body(mockito::Matcher::Json(json!({"Message": {"Token": "t"}})))
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(r#"{"ApiCallSuccessful": true}"#)
                .create_async()
                .await;

            let client = GatewayClient::new(server.url()).unwrap();
            let envelope = client
                .send(method, "Echo", &json!({"Message": {"Token": "t"}}))
                .await
                .unwrap();

            assert_eq!(envelope, json!({"ApiCallSuccessful": true}));
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_send_non_200_carries_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/Boom")
            .with_status(500)
            .with_body("server exploded")
            .create_async()
            .await;

        let client = GatewayClient::new(server.url()).unwrap();
        let err = client
            .send(HttpMethod::Post, "Boom", &json!({}))
            .await
            .unwrap_err();

        match err {
            GatewayError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "server exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
