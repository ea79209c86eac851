//! `phare_alert_rule`: notifications fired on platform events.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{carry_id, decode_snapshot, encode_snapshot, parse_id, ResourceHandler};
use crate::client::{AlertEvent, AlertEventSettings, AlertRule, PhareClient};
use crate::error::ProviderError;
use crate::value::AttrValue;

/// Declarative snapshot of an alert rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertRuleModel {
    /// Server-assigned id, as a decimal string.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub id: AttrValue<String>,
    /// Platform event that triggers the rule.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub event: AttrValue<String>,
    /// Integration notified when the rule fires.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub integration_id: AttrValue<i64>,
    /// Minimum minutes between two notifications.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub rate_limit: AttrValue<i64>,
    /// Trigger settings. Kept from the plan when the API omits them.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub event_settings: AttrValue<AlertEventSettingsModel>,
    /// Optional project scope.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub project_id: AttrValue<i64>,
    /// Creation timestamp, server-owned.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub created_at: AttrValue<String>,
    /// Last update timestamp, server-owned.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub updated_at: AttrValue<String>,
}

/// The `event_settings` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEventSettingsModel {
    /// Trigger type, e.g. `all`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl AlertRuleModel {
    /// Convert the snapshot into an API entity.
    pub fn to_entity(&self) -> Result<AlertRule, ProviderError> {
        let event = self
            .event
            .required("event")?
            .parse::<AlertEvent>()
            .map_err(ProviderError::Conversion)?
            .to_string();
        let settings = self.event_settings.required("event_settings")?;

        Ok(AlertRule {
            id: None,
            event,
            integration_id: *self.integration_id.required("integration_id")?,
            rate_limit: *self.rate_limit.required("rate_limit")?,
            event_settings: Some(AlertEventSettings {
                kind: settings.kind.clone(),
            }),
            project_id: self.project_id.cloned(),
            created_at: None,
            updated_at: None,
        })
    }

    /// Fold an API entity back into the snapshot.
    ///
    /// `event_settings` is kept from the snapshot unless the API reports a
    /// non-empty trigger type.
    pub fn apply_entity(&mut self, rule: &AlertRule) {
        if let Some(id) = rule.id {
            self.id = AttrValue::Value(id.to_string());
        }
        self.event = rule.event.clone().into();
        self.integration_id = rule.integration_id.into();
        self.rate_limit = rule.rate_limit.into();
        self.event_settings.refresh_preserving(
            rule.event_settings
                .as_ref()
                .filter(|settings| !settings.kind.is_empty())
                .map(|settings| AlertEventSettingsModel {
                    kind: settings.kind.clone(),
                }),
        );
        self.project_id.refresh_nullable(rule.project_id);
        self.created_at.refresh_preserving(rule.created_at.clone());
        self.updated_at.refresh_preserving(rule.updated_at.clone());
    }
}

/// Handler for `phare_alert_rule`.
#[derive(Debug, Clone)]
pub struct AlertRuleResource {
    client: PhareClient,
}

impl AlertRuleResource {
    /// Resource type name.
    pub const TYPE_NAME: &'static str = "phare_alert_rule";

    /// Create a handler backed by `client`.
    pub fn new(client: PhareClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ResourceHandler for AlertRuleResource {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    async fn create(&self, planned_state: Value) -> Result<Value, ProviderError> {
        let mut model: AlertRuleModel = decode_snapshot(planned_state)?;
        let rule = model.to_entity()?;

        debug!(event = %rule.event, "Creating alert rule");

        let created = self.client.create_alert_rule(&rule).await?;
        let id = created.id.ok_or_else(|| {
            ProviderError::InvalidResponse("API did not return an alert rule id".to_string())
        })?;

        let full = self.client.get_alert_rule(id).await?;
        model.apply_entity(&full);
        encode_snapshot(&model)
    }

    async fn read(&self, current_state: Value) -> Result<Value, ProviderError> {
        let mut model: AlertRuleModel = decode_snapshot(current_state)?;
        let id = parse_id(&model.id)?;

        debug!(id, "Reading alert rule");

        let rule = self.client.get_alert_rule(id).await?;
        model.apply_entity(&rule);
        encode_snapshot(&model)
    }

    async fn update(
        &self,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let prior: AlertRuleModel = decode_snapshot(prior_state)?;
        let mut model: AlertRuleModel = decode_snapshot(planned_state)?;
        carry_id(&mut model.id, &prior.id)?;

        let rule = model.to_entity()?;
        let id = parse_id(&model.id)?;

        debug!(id, "Updating alert rule");

        let updated = self.client.update_alert_rule(id, &rule).await?;
        model.apply_entity(&updated);
        encode_snapshot(&model)
    }

    async fn delete(&self, current_state: Value) -> Result<(), ProviderError> {
        let model: AlertRuleModel = decode_snapshot(current_state)?;
        let id = parse_id(&model.id)?;

        debug!(id, "Deleting alert rule");

        self.client.delete_alert_rule(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model(snapshot: Value) -> AlertRuleModel {
        serde_json::from_value(snapshot).unwrap()
    }

    fn planned() -> Value {
        json!({
            "event": "uptime.incident.created",
            "integration_id": 12,
            "rate_limit": 30,
            "event_settings": {"type": "all"}
        })
    }

    #[test]
    fn test_forward() {
        let rule = model(planned()).to_entity().unwrap();
        assert_eq!(rule.known_event(), Some(AlertEvent::IncidentCreated));
        assert_eq!(rule.rate_limit, 30);
        assert_eq!(rule.event_settings.unwrap().kind, "all");
        assert_eq!(rule.project_id, None);
    }

    #[test]
    fn test_unknown_event_rejected() {
        let mut snapshot = planned();
        snapshot["event"] = json!("uptime.monitor.exploded");
        let err = model(snapshot).to_entity().unwrap_err();
        assert!(matches!(err, ProviderError::Conversion(_)));
        assert!(err.to_string().contains("uptime.monitor.exploded"));
    }

    #[test]
    fn test_event_settings_required() {
        let mut snapshot = planned();
        snapshot.as_object_mut().unwrap().remove("event_settings");
        let err = model(snapshot).to_entity().unwrap_err();
        assert!(err.to_string().contains("event_settings"));
    }

    #[test]
    fn test_event_settings_preserved_when_not_echoed() {
        let mut m = model(planned());
        let mut echoed = m.to_entity().unwrap();
        echoed.id = Some(3);
        echoed.event_settings = None;
        m.apply_entity(&echoed);

        assert_eq!(m.id.value().map(String::as_str), Some("3"));
        assert_eq!(m.event_settings.value().map(|s| s.kind.as_str()), Some("all"));
        assert!(m.project_id.is_unset());

        echoed.event_settings = Some(AlertEventSettings {
            kind: "first".to_string(),
        });
        m.apply_entity(&echoed);
        assert_eq!(m.event_settings.value().map(|s| s.kind.as_str()), Some("first"));
    }

    #[test]
    fn test_cleared_project_becomes_null() {
        let mut snapshot = planned();
        snapshot["project_id"] = json!(4);
        let mut m = model(snapshot);
        let mut echoed = m.to_entity().unwrap();
        echoed.project_id = None;
        m.apply_entity(&echoed);
        assert!(m.project_id.is_null());

        let out = serde_json::to_value(&m).unwrap();
        assert_eq!(out["project_id"], Value::Null);
    }
}
