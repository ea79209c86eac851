//! Alert rules: `/alert-rules`.

use std::fmt;
use std::str::FromStr;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::PhareClient;
use crate::error::ClientError;

/// A Phare alert rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRule {
    /// Server-assigned id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Wire name of the event that triggers the rule.
    ///
    /// Kept as a string so rules for events added after [`AlertEvent`]
    /// still decode; see [`AlertRule::known_event`].
    pub event: String,
    /// The integration notified when the rule fires.
    pub integration_id: i64,
    /// Minimum minutes between two notifications.
    pub rate_limit: i64,
    /// Trigger settings. The API does not echo this field back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_settings: Option<AlertEventSettings>,
    /// Optional project scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    /// Creation timestamp, server-owned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp, server-owned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl AlertRule {
    /// The rule's event, if it is one of [`AlertEvent::ALL`].
    pub fn known_event(&self) -> Option<AlertEvent> {
        self.event.parse().ok()
    }
}

/// Settings controlling when an alert rule fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEventSettings {
    /// Trigger type, e.g. `all`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Platform events an alert rule can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertEvent {
    /// `uptime.monitor.created`
    #[serde(rename = "uptime.monitor.created")]
    MonitorCreated,
    /// `uptime.monitor.updated`
    #[serde(rename = "uptime.monitor.updated")]
    MonitorUpdated,
    /// `uptime.monitor.deleted`
    #[serde(rename = "uptime.monitor.deleted")]
    MonitorDeleted,
    /// `uptime.incident.created`
    #[serde(rename = "uptime.incident.created")]
    IncidentCreated,
    /// `uptime.incident.acknowledged`
    #[serde(rename = "uptime.incident.acknowledged")]
    IncidentAcknowledged,
    /// `uptime.incident.resolved`
    #[serde(rename = "uptime.incident.resolved")]
    IncidentResolved,
    /// `uptime.status_page.created`
    #[serde(rename = "uptime.status_page.created")]
    StatusPageCreated,
    /// `uptime.status_page.updated`
    #[serde(rename = "uptime.status_page.updated")]
    StatusPageUpdated,
    /// `uptime.status_page.deleted`
    #[serde(rename = "uptime.status_page.deleted")]
    StatusPageDeleted,
    /// `platform.integration.health.unhealthy`
    #[serde(rename = "platform.integration.health.unhealthy")]
    IntegrationUnhealthy,
}

impl AlertEvent {
    /// Every supported event.
    pub const ALL: [AlertEvent; 10] = [
        Self::MonitorCreated,
        Self::MonitorUpdated,
        Self::MonitorDeleted,
        Self::IncidentCreated,
        Self::IncidentAcknowledged,
        Self::IncidentResolved,
        Self::StatusPageCreated,
        Self::StatusPageUpdated,
        Self::StatusPageDeleted,
        Self::IntegrationUnhealthy,
    ];

    /// The event's wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MonitorCreated => "uptime.monitor.created",
            Self::MonitorUpdated => "uptime.monitor.updated",
            Self::MonitorDeleted => "uptime.monitor.deleted",
            Self::IncidentCreated => "uptime.incident.created",
            Self::IncidentAcknowledged => "uptime.incident.acknowledged",
            Self::IncidentResolved => "uptime.incident.resolved",
            Self::StatusPageCreated => "uptime.status_page.created",
            Self::StatusPageUpdated => "uptime.status_page.updated",
            Self::StatusPageDeleted => "uptime.status_page.deleted",
            Self::IntegrationUnhealthy => "platform.integration.health.unhealthy",
        }
    }
}

impl fmt::Display for AlertEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| format!("unknown alert event '{}'", s))
    }
}

impl PhareClient {
    /// Create a new alert rule.
    pub async fn create_alert_rule(&self, rule: &AlertRule) -> Result<AlertRule, ClientError> {
        self.fetch("create alert rule", Method::POST, "/alert-rules", Some(rule)).await
    }

    /// Retrieve an alert rule by id.
    pub async fn get_alert_rule(&self, id: i64) -> Result<AlertRule, ClientError> {
        self.fetch::<(), _>("get alert rule", Method::GET, &format!("/alert-rules/{}", id), None)
            .await
    }

    /// Update an existing alert rule.
    pub async fn update_alert_rule(
        &self,
        id: i64,
        rule: &AlertRule,
    ) -> Result<AlertRule, ClientError> {
        self.fetch(
            "update alert rule",
            Method::POST,
            &format!("/alert-rules/{}", id),
            Some(rule),
        )
        .await
    }

    /// Delete an alert rule.
    pub async fn delete_alert_rule(&self, id: i64) -> Result<(), ClientError> {
        self.execute("delete alert rule", Method::DELETE, &format!("/alert-rules/{}", id)).await
    }

    /// List all alert rules.
    pub async fn list_alert_rules(&self) -> Result<Vec<AlertRule>, ClientError> {
        self.fetch_list("list alert rules", "/alert-rules").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_names_round_trip() {
        for event in AlertEvent::ALL {
            assert_eq!(event.as_str().parse::<AlertEvent>().unwrap(), event);
            assert_eq!(serde_json::to_value(event).unwrap(), json!(event.as_str()));
        }
        assert!("uptime.monitor.exploded".parse::<AlertEvent>().is_err());
    }

    #[test]
    fn test_rule_without_event_settings() {
        let rule: AlertRule = serde_json::from_value(json!({
            "id": 3,
            "event": "uptime.incident.created",
            "integration_id": 12,
            "rate_limit": 5,
            "project_id": null,
            "created_at": "2025-02-01T10:00:00Z",
            "updated_at": "2025-02-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(rule.known_event(), Some(AlertEvent::IncidentCreated));
        assert!(rule.event_settings.is_none());
        assert!(rule.project_id.is_none());
    }

    #[test]
    fn test_rule_wire_shape() {
        let rule = AlertRule {
            id: None,
            event: AlertEvent::MonitorDeleted.to_string(),
            integration_id: 1,
            rate_limit: 0,
            event_settings: Some(AlertEventSettings { kind: "all".to_string() }),
            project_id: None,
            created_at: None,
            updated_at: None,
        };
        assert_eq!(
            serde_json::to_value(&rule).unwrap(),
            json!({
                "event": "uptime.monitor.deleted",
                "integration_id": 1,
                "rate_limit": 0,
                "event_settings": {"type": "all"}
            })
        );
    }

    #[test]
    fn test_unrecognized_event_still_decodes() {
        let rule: AlertRule = serde_json::from_value(json!({
            "id": 8,
            "event": "uptime.monitor.paused",
            "integration_id": 12,
            "rate_limit": 0
        }))
        .unwrap();
        assert_eq!(rule.event, "uptime.monitor.paused");
        assert_eq!(rule.known_event(), None);
    }
}
