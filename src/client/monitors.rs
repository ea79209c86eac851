//! Uptime monitors: `/uptime/monitors`.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{null_as_default, PhareClient};
use crate::error::ClientError;

/// A Phare uptime monitor.
///
/// On the wire the protocol is a plain `protocol` string next to a flat
/// `request` object; here the two are folded into [`MonitorRequest`] so a
/// monitor can never carry both HTTP and TCP settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MonitorWire", into = "MonitorWire")]
pub struct Monitor {
    /// Server-assigned id.
    pub id: Option<i64>,
    /// Display name.
    pub name: String,
    /// Protocol-specific request settings.
    pub request: MonitorRequest,
    /// Check interval in seconds.
    pub interval: i64,
    /// Request timeout in milliseconds.
    pub timeout: i64,
    /// Failed checks required to open an incident.
    pub incident_confirmations: i64,
    /// Successful checks required to resolve an incident.
    pub recovery_confirmations: i64,
    /// Regions the monitor runs from.
    pub regions: Vec<String>,
    /// Conditions a response must satisfy.
    pub success_assertions: Vec<SuccessAssertion>,
    /// Whether the monitor is paused.
    pub paused: Option<bool>,
    /// Creation timestamp, server-owned.
    pub created_at: Option<String>,
    /// Last update timestamp, server-owned.
    pub updated_at: Option<String>,
}

impl Monitor {
    /// The wire name of the monitor's protocol.
    pub fn protocol(&self) -> &'static str {
        self.request.protocol()
    }
}

/// Request settings, keyed by protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorRequest {
    /// `protocol = "http"`.
    Http(HttpRequest),
    /// `protocol = "tcp"`.
    Tcp(TcpRequest),
}

impl MonitorRequest {
    /// The wire name of the protocol.
    pub fn protocol(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Tcp(_) => "tcp",
        }
    }
}

/// HTTP check settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HttpRequest {
    /// HTTP method (`GET`, `HEAD`, ...).
    pub method: String,
    /// Target URL.
    pub url: String,
    /// Skip TLS certificate verification.
    pub tls_skip_verify: Option<bool>,
    /// Request body.
    pub body: Option<String>,
    /// Follow redirects.
    pub follow_redirects: Option<bool>,
    /// Secret appended to the user agent.
    pub user_agent_secret: Option<String>,
    /// Extra request headers, in order.
    pub headers: Vec<RequestHeader>,
}

/// TCP check settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TcpRequest {
    /// Target host.
    pub host: String,
    /// Target port; the API transports it as a string.
    pub port: String,
    /// `plain` or `tls`.
    pub connection: String,
    /// Skip TLS certificate verification.
    pub tls_skip_verify: Option<bool>,
}

/// A single HTTP header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestHeader {
    /// Header name.
    pub name: String,
    /// Header value.
    pub value: String,
}

/// A success assertion evaluated against each check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessAssertion {
    /// `status_code`, `response_header` or `response_body`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Comparison operator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// Expected value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Header name for `response_header` assertions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
}

// Flat wire shape: the `request` object holds both field sets.
#[derive(Serialize, Deserialize)]
struct MonitorWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    name: String,
    protocol: String,
    request: RequestWire,
    interval: i64,
    timeout: i64,
    incident_confirmations: i64,
    recovery_confirmations: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    regions: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    success_assertions: Vec<SuccessAssertion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    paused: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
}

#[derive(Default, Serialize, Deserialize)]
struct RequestWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tls_skip_verify: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    follow_redirects: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_agent_secret: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    headers: Vec<RequestHeader>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    connection: Option<String>,
}

fn required(value: Option<String>, protocol: &str, field: &str) -> Result<String, String> {
    value.ok_or_else(|| format!("{} monitor request is missing '{}'", protocol, field))
}

impl TryFrom<MonitorWire> for Monitor {
    type Error = String;

    fn try_from(wire: MonitorWire) -> Result<Self, Self::Error> {
        let req = wire.request;
        let request = match wire.protocol.as_str() {
            "http" => MonitorRequest::Http(HttpRequest {
                method: required(req.method, "http", "method")?,
                url: required(req.url, "http", "url")?,
                tls_skip_verify: req.tls_skip_verify,
                body: req.body,
                follow_redirects: req.follow_redirects,
                user_agent_secret: req.user_agent_secret,
                headers: req.headers,
            }),
            "tcp" => MonitorRequest::Tcp(TcpRequest {
                host: required(req.host, "tcp", "host")?,
                port: required(req.port, "tcp", "port")?,
                connection: required(req.connection, "tcp", "connection")?,
                tls_skip_verify: req.tls_skip_verify,
            }),
            other => return Err(format!("unsupported monitor protocol '{}'", other)),
        };

        Ok(Self {
            id: wire.id,
            name: wire.name,
            request,
            interval: wire.interval,
            timeout: wire.timeout,
            incident_confirmations: wire.incident_confirmations,
            recovery_confirmations: wire.recovery_confirmations,
            regions: wire.regions,
            success_assertions: wire.success_assertions,
            paused: wire.paused,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        })
    }
}

impl From<Monitor> for MonitorWire {
    fn from(monitor: Monitor) -> Self {
        let protocol = monitor.protocol().to_string();
        let request = match monitor.request {
            MonitorRequest::Http(http) => RequestWire {
                method: Some(http.method),
                url: Some(http.url),
                tls_skip_verify: http.tls_skip_verify,
                body: http.body,
                follow_redirects: http.follow_redirects,
                user_agent_secret: http.user_agent_secret,
                headers: http.headers,
                ..Default::default()
            },
            MonitorRequest::Tcp(tcp) => RequestWire {
                host: Some(tcp.host),
                port: Some(tcp.port),
                connection: Some(tcp.connection),
                tls_skip_verify: tcp.tls_skip_verify,
                ..Default::default()
            },
        };

        Self {
            id: monitor.id,
            name: monitor.name,
            protocol,
            request,
            interval: monitor.interval,
            timeout: monitor.timeout,
            incident_confirmations: monitor.incident_confirmations,
            recovery_confirmations: monitor.recovery_confirmations,
            regions: monitor.regions,
            success_assertions: monitor.success_assertions,
            paused: monitor.paused,
            created_at: monitor.created_at,
            updated_at: monitor.updated_at,
        }
    }
}

impl PhareClient {
    /// Create a new uptime monitor.
    pub async fn create_monitor(&self, monitor: &Monitor) -> Result<Monitor, ClientError> {
        self.fetch("create monitor", Method::POST, "/uptime/monitors", Some(monitor)).await
    }

    /// Retrieve a monitor by id.
    pub async fn get_monitor(&self, id: i64) -> Result<Monitor, ClientError> {
        self.fetch::<(), _>(
            "get monitor",
            Method::GET,
            &format!("/uptime/monitors/{}", id),
            None,
        )
        .await
    }

    /// Update an existing monitor.
    pub async fn update_monitor(&self, id: i64, monitor: &Monitor) -> Result<Monitor, ClientError> {
        self.fetch(
            "update monitor",
            Method::POST,
            &format!("/uptime/monitors/{}", id),
            Some(monitor),
        )
        .await
    }

    /// Delete a monitor.
    pub async fn delete_monitor(&self, id: i64) -> Result<(), ClientError> {
        self.execute("delete monitor", Method::DELETE, &format!("/uptime/monitors/{}", id)).await
    }

    /// Pause a monitor.
    pub async fn pause_monitor(&self, id: i64) -> Result<(), ClientError> {
        self.execute("pause monitor", Method::POST, &format!("/uptime/monitors/{}/pause", id)).await
    }

    /// Resume a paused monitor.
    pub async fn resume_monitor(&self, id: i64) -> Result<(), ClientError> {
        self.execute("resume monitor", Method::POST, &format!("/uptime/monitors/{}/resume", id))
            .await
    }

    /// List all monitors.
    pub async fn list_monitors(&self) -> Result<Vec<Monitor>, ClientError> {
        self.fetch_list("list monitors", "/uptime/monitors").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn http_monitor() -> Monitor {
        Monitor {
            id: None,
            name: "API".to_string(),
            request: MonitorRequest::Http(HttpRequest {
                method: "GET".to_string(),
                url: "https://example.com/health".to_string(),
                tls_skip_verify: Some(false),
                follow_redirects: Some(true),
                headers: vec![RequestHeader {
                    name: "X-Check".to_string(),
                    value: "1".to_string(),
                }],
                ..Default::default()
            }),
            interval: 60,
            timeout: 7000,
            incident_confirmations: 1,
            recovery_confirmations: 1,
            regions: vec!["na-usa-iad".to_string()],
            success_assertions: Vec::new(),
            paused: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_http_monitor_wire_shape() {
        let value = serde_json::to_value(http_monitor()).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "API",
                "protocol": "http",
                "request": {
                    "method": "GET",
                    "url": "https://example.com/health",
                    "tls_skip_verify": false,
                    "follow_redirects": true,
                    "headers": [{"name": "X-Check", "value": "1"}]
                },
                "interval": 60,
                "timeout": 7000,
                "incident_confirmations": 1,
                "recovery_confirmations": 1,
                "regions": ["na-usa-iad"]
            })
        );
    }

    #[test]
    fn test_tcp_monitor_from_wire() {
        let monitor: Monitor = serde_json::from_value(json!({
            "id": 9,
            "name": "DB",
            "protocol": "tcp",
            "request": {"host": "db.example.com", "port": "5432", "connection": "tls"},
            "interval": 30,
            "timeout": 1000,
            "incident_confirmations": 2,
            "recovery_confirmations": 2,
            "regions": ["eu-deu-fra"],
            "paused": true,
            "created_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(monitor.id, Some(9));
        assert_eq!(monitor.protocol(), "tcp");
        match &monitor.request {
            MonitorRequest::Tcp(tcp) => {
                assert_eq!(tcp.port, "5432");
                assert_eq!(tcp.connection, "tls");
                assert_eq!(tcp.tls_skip_verify, None);
            },
            other => panic!("expected tcp request, got {:?}", other),
        }
        assert_eq!(monitor.paused, Some(true));
    }

    #[test]
    fn test_tcp_wire_never_carries_http_fields() {
        let mut monitor = http_monitor();
        monitor.request = MonitorRequest::Tcp(TcpRequest {
            host: "db".to_string(),
            port: "5432".to_string(),
            connection: "plain".to_string(),
            tls_skip_verify: None,
        });
        let value = serde_json::to_value(monitor).unwrap();
        assert_eq!(value["protocol"], "tcp");
        assert_eq!(
            value["request"],
            json!({"host": "db", "port": "5432", "connection": "plain"})
        );
    }

    #[test]
    fn test_unknown_protocol_is_rejected() {
        let result: Result<Monitor, _> = serde_json::from_value(json!({
            "name": "x",
            "protocol": "icmp",
            "request": {},
            "interval": 60,
            "timeout": 1000,
            "incident_confirmations": 1,
            "recovery_confirmations": 1
        }));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("icmp"));
    }

    #[test]
    fn test_http_request_missing_url_is_rejected() {
        let result: Result<Monitor, _> = serde_json::from_value(json!({
            "name": "x",
            "protocol": "http",
            "request": {"method": "GET"},
            "interval": 60,
            "timeout": 1000,
            "incident_confirmations": 1,
            "recovery_confirmations": 1
        }));
        assert!(result.unwrap_err().to_string().contains("url"));
    }

    #[test]
    fn test_success_assertion_wire_shape() {
        let assertion = SuccessAssertion {
            kind: "status_code".to_string(),
            operator: Some("in".to_string()),
            value: Some("2xx,30x".to_string()),
            property: None,
        };
        assert_eq!(
            serde_json::to_value(&assertion).unwrap(),
            json!({"type": "status_code", "operator": "in", "value": "2xx,30x"})
        );
    }

    #[test]
    fn test_null_lists_decode_as_empty() {
        let monitor: Monitor = serde_json::from_value(json!({
            "id": 4,
            "name": "API",
            "protocol": "http",
            "request": {"method": "GET", "url": "https://example.com", "headers": null},
            "interval": 60,
            "timeout": 7000,
            "incident_confirmations": 1,
            "recovery_confirmations": 1,
            "regions": null,
            "success_assertions": null
        }))
        .unwrap();
        assert!(monitor.regions.is_empty());
        assert!(monitor.success_assertions.is_empty());
        match &monitor.request {
            MonitorRequest::Http(http) => assert!(http.headers.is_empty()),
            other => panic!("expected http request, got {:?}", other),
        }
    }
}
