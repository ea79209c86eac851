//! HTTP client for the Phare REST API.
//!
//! [`PhareClient`] holds the immutable connection settings (base URL, token,
//! timeout) and exposes one method per resource operation. Every call goes
//! through a single request primitive that injects bearer authentication and
//! JSON headers, surfaces `>= 400` responses as [`ApiError`]s, and returns
//! the raw body for the caller to decode.
//!
//! The client never retries. Clones share the underlying connection pool, so
//! a single client can be constructed once and handed to every resource
//! handler.
//!
//! ```no_run
//! use phare_provider::client::PhareClient;
//!
//! # async fn run() -> Result<(), phare_provider::ClientError> {
//! let client = PhareClient::new("token", None)?;
//! for monitor in client.list_monitors().await? {
//!     println!("{}", monitor.name);
//! }
//! # Ok(())
//! # }
//! ```

mod alert_rules;
mod incidents;
mod monitors;
mod status_pages;

pub use alert_rules::{AlertEvent, AlertEventSettings, AlertRule};
pub use incidents::Incident;
pub use monitors::{
    HttpRequest, Monitor, MonitorRequest, RequestHeader, SuccessAssertion, TcpRequest,
};
pub use status_pages::{StatusComponent, StatusPage, StatusPageColors};

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{ApiError, ClientError};

/// The production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.phare.io";

/// Timeout applied to every request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The `{"data": [...]}` envelope used by list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// The listed entities, in server order.
    pub data: Vec<T>,
}

/// Client for the Phare API.
#[derive(Debug, Clone)]
pub struct PhareClient {
    base_url: String,
    api_token: String,
    http: reqwest::Client,
    cancellation: Option<CancellationToken>,
}

impl PhareClient {
    /// Create a new client.
    ///
    /// `base_url` defaults to [`DEFAULT_BASE_URL`] when `None` or empty and is
    /// otherwise used verbatim. Fails if `api_token` is empty.
    pub fn new(api_token: impl Into<String>, base_url: Option<&str>) -> Result<Self, ClientError> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(ClientError::Configuration("api_token is required".to_string()));
        }

        let base_url = match base_url {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => DEFAULT_BASE_URL.to_string(),
        };

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| {
                ClientError::Configuration(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            base_url,
            api_token,
            http,
            cancellation: None,
        })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[cfg(test)]
    pub(crate) fn api_token(&self) -> &str {
        &self.api_token
    }

    /// Return a client whose requests abort once `token` is cancelled.
    ///
    /// The returned client shares this client's connection pool.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            cancellation: Some(token),
            ..self.clone()
        }
    }

    fn headers(&self) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.api_token))
            .map_err(|_| {
                ClientError::Request("api token is not a valid header value".to_string())
            })?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Perform one authenticated exchange and return the raw success body.
    pub(crate) async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Vec<u8>, ClientError> {
        let url = format!("{}{}", self.base_url, path);

        let mut builder = self.http.request(method.clone(), &url).headers(self.headers()?);
        if let Some(body) = body {
            let payload = serde_json::to_vec(body)
                .map_err(|e| {
                    ClientError::Request(format!("failed to encode request body: {}", e))
                })?;
            builder = builder.body(payload);
        }
        let request = builder
            .build()
            .map_err(|e| ClientError::Request(e.to_string()))?;

        debug!(method = %method, path = %path, "Sending Phare API request");

        let exchange = async {
            let response = self.http.execute(request).await.map_err(ClientError::Transport)?;
            let status = response.status();
            let bytes = response.bytes().await.map_err(ClientError::Transport)?;
            Ok::<_, ClientError>((status, bytes))
        };

        let (status, bytes) = match &self.cancellation {
            Some(token) => {
                tokio::select! {
                    biased;

                    _ = token.cancelled() => {
                        debug!(method = %method, path = %path, "Phare API request cancelled");
                        return Err(ClientError::Cancelled);
                    }
                    result = exchange => result?,
                }
            },
            None => exchange.await?,
        };

        debug!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            "Received Phare API response"
        );

        if status.as_u16() >= 400 {
            return Err(ClientError::Api(ApiError::from_response(status.as_u16(), &bytes)));
        }

        Ok(bytes.to_vec())
    }

    /// Request with no body and discard the response.
    pub(crate) async fn execute(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
    ) -> Result<(), ClientError> {
        self.request::<()>(method, path, None)
            .await
            .map(|_| ())
            .map_err(|e| e.during(operation))
    }

    /// Request and decode a single entity.
    pub(crate) async fn fetch<B, T>(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let bytes = self
            .request(method, path, body)
            .await
            .map_err(|e| e.during(operation))?;
        decode_single(&bytes).map_err(|e| e.during(operation))
    }

    /// Request and decode a `{"data": [...]}` list.
    pub(crate) async fn fetch_list<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
    ) -> Result<Vec<T>, ClientError> {
        let bytes = self
            .request::<()>(Method::GET, path, None)
            .await
            .map_err(|e| e.during(operation))?;
        let list: ListResponse<T> = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Decode(e).during(operation))?;
        Ok(list.data)
    }
}

/// Deserialize an explicit `null` as the type's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Decode a single entity, accepting both `{"data": {...}}` and a bare object.
pub(crate) fn decode_single<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ClientError> {
    let value: serde_json::Value = serde_json::from_slice(bytes).map_err(ClientError::Decode)?;
    let inner = match value {
        serde_json::Value::Object(mut map) if map.get("data").is_some_and(|d| d.is_object()) => {
            map.remove("data").unwrap_or_default()
        },
        other => other,
    };
    serde_json::from_value(inner).map_err(ClientError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Thing {
        id: i64,
        name: String,
    }

    #[test]
    fn test_new_client_with_url() {
        let client = PhareClient::new("test-token", Some("https://api.example.com")).unwrap();
        assert_eq!(client.base_url(), "https://api.example.com");
        assert_eq!(client.api_token(), "test-token");
    }

    #[test]
    fn test_new_client_default_url() {
        let client = PhareClient::new("test-token", None).unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);

        let client = PhareClient::new("test-token", Some("")).unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_new_client_keeps_url_verbatim() {
        let client = PhareClient::new("test-token", Some("http://localhost:8080/v1/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/v1/");
    }

    #[test]
    fn test_new_client_without_token() {
        let err = PhareClient::new("", Some("https://api.example.com")).unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
        assert!(err.to_string().contains("api_token"));
    }

    #[test]
    fn test_headers() {
        let client = PhareClient::new("secret", None).unwrap();
        let headers = client.headers().unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer secret");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[ACCEPT], "application/json");
    }

    #[test]
    fn test_decode_single_enveloped_and_bare() {
        let wrapped: Thing = decode_single(br#"{"data":{"id":42,"name":"api"}}"#).unwrap();
        assert_eq!(wrapped, Thing { id: 42, name: "api".to_string() });

        let bare: Thing = decode_single(br#"{"id":7,"name":"web"}"#).unwrap();
        assert_eq!(bare.id, 7);
    }

    #[test]
    fn test_decode_single_rejects_invalid_json() {
        let err = decode_single::<Thing>(b"not json").unwrap_err();
        assert!(err.is_decode());

        let err = decode_single::<Thing>(br#"{"data":{"id":"x"}}"#).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_list_envelope() {
        let list: ListResponse<Thing> = serde_json::from_value(json!({
            "data": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]
        }))
        .unwrap();
        assert_eq!(list.data.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);
    }
}
