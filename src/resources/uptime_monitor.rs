//! `phare_uptime_monitor`: HTTP and TCP uptime monitors.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{carry_id, decode_snapshot, encode_snapshot, parse_id, ResourceHandler};
use crate::client::{
    HttpRequest, Monitor, MonitorRequest, PhareClient, RequestHeader, SuccessAssertion, TcpRequest,
};
use crate::error::ProviderError;
use crate::value::AttrValue;

/// Declarative snapshot of an uptime monitor.
///
/// Exactly one of `http_request` and `tcp_request` is set, matching
/// `protocol`; after a refresh the other one is `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UptimeMonitorModel {
    /// Server-assigned id, as a decimal string.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub id: AttrValue<String>,
    /// Display name.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub name: AttrValue<String>,
    /// `http` or `tcp`.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub protocol: AttrValue<String>,
    /// HTTP settings; required when `protocol = "http"`.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub http_request: AttrValue<HttpRequestModel>,
    /// TCP settings; required when `protocol = "tcp"`.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub tcp_request: AttrValue<TcpRequestModel>,
    /// Check interval in seconds.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub interval: AttrValue<i64>,
    /// Request timeout in milliseconds.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub timeout: AttrValue<i64>,
    /// Failed checks required to open an incident.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub incident_confirmations: AttrValue<i64>,
    /// Successful checks required to resolve an incident.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub recovery_confirmations: AttrValue<i64>,
    /// Regions the monitor runs from.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub regions: AttrValue<Vec<String>>,
    /// Conditions a response must satisfy.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub success_assertions: AttrValue<Vec<SuccessAssertionModel>>,
    /// Whether checks are suspended.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub paused: AttrValue<bool>,
    /// Creation timestamp, server-owned.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub created_at: AttrValue<String>,
    /// Last update timestamp, server-owned.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub updated_at: AttrValue<String>,
}

/// The `http_request` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpRequestModel {
    /// HTTP method.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub method: AttrValue<String>,
    /// Target URL.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub url: AttrValue<String>,
    /// Skip TLS certificate verification.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub tls_skip_verify: AttrValue<bool>,
    /// Request body.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub body: AttrValue<String>,
    /// Follow redirects.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub follow_redirects: AttrValue<bool>,
    /// Secret appended to the user agent. Never echoed by the API.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub user_agent_secret: AttrValue<String>,
    /// Extra request headers, in order.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub headers: AttrValue<Vec<RequestHeaderModel>>,
}

/// The `tcp_request` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TcpRequestModel {
    /// Target host.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub host: AttrValue<String>,
    /// Target port.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub port: AttrValue<String>,
    /// `plain` or `tls`.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub connection: AttrValue<String>,
    /// Skip TLS certificate verification.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub tls_skip_verify: AttrValue<bool>,
}

/// One entry of `http_request.headers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestHeaderModel {
    /// Header name.
    pub name: String,
    /// Header value.
    pub value: String,
}

/// One entry of `success_assertions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessAssertionModel {
    /// Assertion type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Comparison operator.
    #[serde(default, skip_serializing_if = "AttrValue::is_unset")]
    pub operator: AttrValue<String>,
    /// Expected value.
    #[serde(default, skip_serializing_if = "AttrValue::is_unset")]
    pub value: AttrValue<String>,
    /// Header name for `response_header` assertions.
    #[serde(default, skip_serializing_if = "AttrValue::is_unset")]
    pub property: AttrValue<String>,
}

impl UptimeMonitorModel {
    /// Convert the snapshot into an API entity.
    pub fn to_entity(&self) -> Result<Monitor, ProviderError> {
        let protocol = self.protocol.required("protocol")?;
        let request = match protocol.as_str() {
            "http" => {
                if self.tcp_request.is_known() {
                    return Err(ProviderError::Conversion(
                        "tcp_request must not be set when protocol is 'http'".to_string(),
                    ));
                }
                let block = self.http_request.value().ok_or_else(|| {
                    ProviderError::Conversion(
                        "http_request is required when protocol is 'http'".to_string(),
                    )
                })?;
                MonitorRequest::Http(block.to_entity()?)
            },
            "tcp" => {
                if self.http_request.is_known() {
                    return Err(ProviderError::Conversion(
                        "http_request must not be set when protocol is 'tcp'".to_string(),
                    ));
                }
                let block = self.tcp_request.value().ok_or_else(|| {
                    ProviderError::Conversion(
                        "tcp_request is required when protocol is 'tcp'".to_string(),
                    )
                })?;
                MonitorRequest::Tcp(block.to_entity()?)
            },
            other => {
                return Err(ProviderError::Conversion(format!(
                    "protocol must be 'http' or 'tcp', got '{}'",
                    other
                )))
            },
        };

        let success_assertions = self
            .success_assertions
            .value()
            .map(|assertions| {
                assertions
                    .iter()
                    .map(SuccessAssertionModel::to_entity)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Ok(Monitor {
            id: None,
            name: self.name.required("name")?.clone(),
            request,
            interval: *self.interval.required("interval")?,
            timeout: *self.timeout.required("timeout")?,
            incident_confirmations: *self
                .incident_confirmations
                .required("incident_confirmations")?,
            recovery_confirmations: *self
                .recovery_confirmations
                .required("recovery_confirmations")?,
            regions: self.regions.required("regions")?.clone(),
            success_assertions,
            paused: None,
            created_at: None,
            updated_at: None,
        })
    }

    /// Fold an API entity back into the snapshot.
    pub fn apply_entity(&mut self, monitor: &Monitor) {
        if let Some(id) = monitor.id {
            self.id = AttrValue::Value(id.to_string());
        }
        self.name = monitor.name.clone().into();
        self.protocol = monitor.protocol().to_string().into();
        self.interval = monitor.interval.into();
        self.timeout = monitor.timeout.into();
        self.incident_confirmations = monitor.incident_confirmations.into();
        self.recovery_confirmations = monitor.recovery_confirmations.into();
        self.regions = monitor.regions.clone().into();
        self.paused = monitor.paused.unwrap_or(false).into();
        self.created_at.refresh_preserving(monitor.created_at.clone());
        self.updated_at.refresh_preserving(monitor.updated_at.clone());

        match &monitor.request {
            MonitorRequest::Http(http) => {
                let mut block = self.http_request.cloned().unwrap_or_default();
                block.apply_entity(http);
                self.http_request = AttrValue::Value(block);
                self.tcp_request = AttrValue::Null;
            },
            MonitorRequest::Tcp(tcp) => {
                let mut block = self.tcp_request.cloned().unwrap_or_default();
                block.apply_entity(tcp);
                self.tcp_request = AttrValue::Value(block);
                self.http_request = AttrValue::Null;
            },
        }

        let prior = self.success_assertions.cloned().unwrap_or_default();
        let assertions = monitor
            .success_assertions
            .iter()
            .enumerate()
            .map(|(i, assertion)| SuccessAssertionModel::refreshed(prior.get(i), assertion))
            .collect::<Vec<_>>();
        self.success_assertions.refresh_list(assertions);
    }
}

impl HttpRequestModel {
    fn to_entity(&self) -> Result<HttpRequest, ProviderError> {
        let headers = self
            .headers
            .value()
            .map(|headers| {
                headers
                    .iter()
                    .map(|h| RequestHeader {
                        name: h.name.clone(),
                        value: h.value.clone(),
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Ok(HttpRequest {
            method: self.method.required("http_request.method")?.clone(),
            url: self.url.required("http_request.url")?.clone(),
            tls_skip_verify: self.tls_skip_verify.cloned(),
            body: self.body.cloned(),
            follow_redirects: self.follow_redirects.cloned(),
            user_agent_secret: self.user_agent_secret.cloned(),
            headers,
        })
    }

    fn apply_entity(&mut self, http: &HttpRequest) {
        self.method = http.method.clone().into();
        self.url = http.url.clone().into();
        self.tls_skip_verify.refresh_nullable(http.tls_skip_verify);
        self.body.refresh_nullable(http.body.clone());
        self.follow_redirects.refresh_nullable(http.follow_redirects);
        // Secrets may be withheld from responses.
        self.user_agent_secret.refresh_preserving(http.user_agent_secret.clone());
        self.headers.refresh_list(
            http.headers
                .iter()
                .map(|h| RequestHeaderModel {
                    name: h.name.clone(),
                    value: h.value.clone(),
                })
                .collect(),
        );
    }
}

impl TcpRequestModel {
    fn to_entity(&self) -> Result<TcpRequest, ProviderError> {
        Ok(TcpRequest {
            host: self.host.required("tcp_request.host")?.clone(),
            port: self.port.required("tcp_request.port")?.clone(),
            connection: self.connection.required("tcp_request.connection")?.clone(),
            tls_skip_verify: self.tls_skip_verify.cloned(),
        })
    }

    fn apply_entity(&mut self, tcp: &TcpRequest) {
        self.host = tcp.host.clone().into();
        self.port = tcp.port.clone().into();
        self.connection = tcp.connection.clone().into();
        self.tls_skip_verify.refresh_nullable(tcp.tls_skip_verify);
    }
}

impl SuccessAssertionModel {
    fn to_entity(&self) -> SuccessAssertion {
        SuccessAssertion {
            kind: self.kind.clone(),
            operator: self.operator.cloned(),
            value: self.value.cloned(),
            property: self.property.cloned(),
        }
    }

    fn refreshed(prior: Option<&Self>, assertion: &SuccessAssertion) -> Self {
        let mut model = prior.cloned().unwrap_or_else(|| Self {
            kind: assertion.kind.clone(),
            operator: AttrValue::Unset,
            value: AttrValue::Unset,
            property: AttrValue::Unset,
        });
        model.kind = assertion.kind.clone();
        model.operator.refresh_nullable(assertion.operator.clone());
        model.value.refresh_nullable(assertion.value.clone());
        model.property.refresh_nullable(assertion.property.clone());
        model
    }
}

/// Handler for `phare_uptime_monitor`.
#[derive(Debug, Clone)]
pub struct UptimeMonitorResource {
    client: PhareClient,
}

impl UptimeMonitorResource {
    /// Resource type name.
    pub const TYPE_NAME: &'static str = "phare_uptime_monitor";

    /// Create a handler backed by `client`.
    pub fn new(client: PhareClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ResourceHandler for UptimeMonitorResource {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    async fn create(&self, planned_state: Value) -> Result<Value, ProviderError> {
        let mut model: UptimeMonitorModel = decode_snapshot(planned_state)?;
        let monitor = model.to_entity()?;

        debug!(name = %monitor.name, protocol = monitor.protocol(), "Creating uptime monitor");

        let created = self.client.create_monitor(&monitor).await?;
        let id = created.id.ok_or_else(|| {
            ProviderError::InvalidResponse("API did not return a monitor id".to_string())
        })?;

        if model.paused.value() == Some(&true) {
            debug!(id, "Pausing new uptime monitor");
            self.client.pause_monitor(id).await?;
        }

        // Read back for server-assigned fields.
        let full = self.client.get_monitor(id).await?;
        model.apply_entity(&full);
        encode_snapshot(&model)
    }

    async fn read(&self, current_state: Value) -> Result<Value, ProviderError> {
        let mut model: UptimeMonitorModel = decode_snapshot(current_state)?;
        let id = parse_id(&model.id)?;

        debug!(id, "Reading uptime monitor");

        let monitor = self.client.get_monitor(id).await?;
        model.apply_entity(&monitor);
        encode_snapshot(&model)
    }

    async fn update(
        &self,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let prior: UptimeMonitorModel = decode_snapshot(prior_state)?;
        let mut model: UptimeMonitorModel = decode_snapshot(planned_state)?;
        carry_id(&mut model.id, &prior.id)?;

        let monitor = model.to_entity()?;
        let id = parse_id(&model.id)?;

        debug!(id, "Updating uptime monitor");

        let mut updated = self.client.update_monitor(id, &monitor).await?;

        let was_paused = prior.paused.value() == Some(&true);
        let pause = model.paused.value() == Some(&true);
        if pause && !was_paused {
            debug!(id, "Pausing uptime monitor");
            self.client.pause_monitor(id).await?;
            updated.paused = Some(true);
        } else if !pause && was_paused {
            debug!(id, "Resuming uptime monitor");
            self.client.resume_monitor(id).await?;
            updated.paused = Some(false);
        }

        model.apply_entity(&updated);
        encode_snapshot(&model)
    }

    async fn delete(&self, current_state: Value) -> Result<(), ProviderError> {
        let model: UptimeMonitorModel = decode_snapshot(current_state)?;
        let id = parse_id(&model.id)?;

        debug!(id, "Deleting uptime monitor");

        self.client.delete_monitor(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn http_snapshot() -> Value {
        json!({
            "name": "API health",
            "protocol": "http",
            "http_request": {
                "method": "GET",
                "url": "https://example.com/health",
                "user_agent_secret": "s3cret",
                "headers": [{"name": "X-Env", "value": "prod"}]
            },
            "interval": 60,
            "timeout": 7000,
            "incident_confirmations": 1,
            "recovery_confirmations": 2,
            "regions": ["na-usa-iad", "eu-deu-fra"],
            "success_assertions": [
                {"type": "status_code", "operator": "in", "value": "2xx"}
            ]
        })
    }

    fn model(snapshot: Value) -> UptimeMonitorModel {
        serde_json::from_value(snapshot).unwrap()
    }

    #[test]
    fn test_forward_http_monitor() {
        let monitor = model(http_snapshot()).to_entity().unwrap();
        assert_eq!(monitor.protocol(), "http");
        assert_eq!(monitor.regions, vec!["na-usa-iad", "eu-deu-fra"]);
        match &monitor.request {
            MonitorRequest::Http(http) => {
                assert_eq!(http.method, "GET");
                // Unset optionals stay absent.
                assert_eq!(http.tls_skip_verify, None);
                assert_eq!(http.follow_redirects, None);
                assert_eq!(http.headers.len(), 1);
            },
            other => panic!("expected http request, got {:?}", other),
        }
        assert_eq!(monitor.success_assertions[0].operator.as_deref(), Some("in"));
        assert_eq!(monitor.success_assertions[0].property, None);
    }

    #[test]
    fn test_forward_requires_matching_block() {
        let mut snapshot = http_snapshot();
        snapshot["protocol"] = json!("tcp");
        let err = model(snapshot).to_entity().unwrap_err();
        assert!(err.to_string().contains("http_request must not be set"));

        let mut snapshot = http_snapshot();
        snapshot.as_object_mut().unwrap().remove("http_request");
        let err = model(snapshot).to_entity().unwrap_err();
        assert!(err.to_string().contains("http_request is required"));

        let mut snapshot = http_snapshot();
        snapshot["protocol"] = json!("icmp");
        assert!(matches!(model(snapshot).to_entity(), Err(ProviderError::Conversion(_))));
    }

    #[test]
    fn test_forward_missing_required_field() {
        let mut snapshot = http_snapshot();
        snapshot["interval"] = Value::Null;
        let err = model(snapshot).to_entity().unwrap_err();
        assert!(err.to_string().contains("interval"));

        let mut snapshot = http_snapshot();
        snapshot["http_request"].as_object_mut().unwrap().remove("url");
        let err = model(snapshot).to_entity().unwrap_err();
        assert!(err.to_string().contains("http_request.url"));
    }

    #[test]
    fn test_round_trip_preserves_declared_values() {
        let mut m = model(http_snapshot());
        let mut echoed = m.to_entity().unwrap();
        echoed.id = Some(42);
        echoed.created_at = Some("2025-03-01T00:00:00Z".to_string());
        if let MonitorRequest::Http(http) = &mut echoed.request {
            // The API withholds the secret.
            http.user_agent_secret = None;
        }

        m.apply_entity(&echoed);
        let out = serde_json::to_value(&m).unwrap();

        assert_eq!(out["id"], "42");
        assert_eq!(out["name"], "API health");
        assert_eq!(out["regions"], json!(["na-usa-iad", "eu-deu-fra"]));
        assert_eq!(out["http_request"]["user_agent_secret"], "s3cret");
        assert_eq!(out["http_request"]["headers"], json!([{"name": "X-Env", "value": "prod"}]));
        assert!(out["http_request"].get("tls_skip_verify").is_none());
        assert_eq!(out["tcp_request"], Value::Null);
        assert_eq!(out["paused"], false);
        assert_eq!(out["created_at"], "2025-03-01T00:00:00Z");
        assert_eq!(
            out["success_assertions"],
            json!([{"type": "status_code", "operator": "in", "value": "2xx"}])
        );
    }

    #[test]
    fn test_tcp_monitor_nulls_http_block() {
        let mut m = model(json!({
            "name": "DB",
            "protocol": "tcp",
            "tcp_request": {"host": "db.internal", "port": "5432", "connection": "plain"},
            "interval": 30,
            "timeout": 1000,
            "incident_confirmations": 1,
            "recovery_confirmations": 1,
            "regions": ["eu-deu-fra"]
        }));
        let mut entity = m.to_entity().unwrap();
        entity.id = Some(5);
        m.apply_entity(&entity);

        assert!(m.http_request.is_null());
        let tcp = m.tcp_request.value().unwrap();
        assert_eq!(tcp.port.value().map(String::as_str), Some("5432"));
        assert!(m.success_assertions.is_unset());
    }

    #[test]
    fn test_protocol_switch_replaces_blocks() {
        let mut m = model(http_snapshot());
        let entity = Monitor {
            request: MonitorRequest::Tcp(TcpRequest {
                host: "example.com".to_string(),
                port: "443".to_string(),
                connection: "tls".to_string(),
                tls_skip_verify: Some(false),
            }),
            ..m.to_entity().unwrap()
        };
        m.apply_entity(&entity);
        assert_eq!(m.protocol.value().map(String::as_str), Some("tcp"));
        assert!(m.http_request.is_null());
        assert!(m.tcp_request.is_known());
    }

    #[test]
    fn test_removed_assertions_become_null() {
        let mut m = model(http_snapshot());
        let mut entity = m.to_entity().unwrap();
        entity.success_assertions.clear();
        m.apply_entity(&entity);
        assert!(m.success_assertions.is_null());
    }
}
