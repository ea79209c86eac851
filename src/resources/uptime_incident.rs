//! `phare_uptime_incident` data source.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{decode_snapshot, encode_snapshot, parse_id, DataSourceHandler};
use crate::client::{Incident, PhareClient};
use crate::error::ProviderError;
use crate::value::AttrValue;

/// Snapshot of an uptime incident. Only `id` is supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UptimeIncidentModel {
    /// Incident id to look up.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub id: AttrValue<String>,
    /// Owning project.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub project_id: AttrValue<i64>,
    /// Incident title.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub title: AttrValue<String>,
    /// URL slug.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub slug: AttrValue<String>,
    /// Impact level.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub impact: AttrValue<String>,
    /// Lifecycle state.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub state: AttrValue<String>,
    /// Free-form description.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub description: AttrValue<String>,
    /// Whether the incident is excluded from downtime statistics.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub exclude_from_downtime: AttrValue<bool>,
    /// `ongoing` or `resolved`.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub status: AttrValue<String>,
    /// When the incident started.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub incident_at: AttrValue<String>,
    /// When the incident recovered.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub recovery_at: AttrValue<String>,
    /// Creation timestamp, server-owned.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub created_at: AttrValue<String>,
    /// Last update timestamp, server-owned.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub updated_at: AttrValue<String>,
}

impl UptimeIncidentModel {
    /// Fold an API entity into the snapshot.
    ///
    /// Every attribute except `id` is computed, so absent optionals are
    /// written as `null`.
    pub fn apply_entity(&mut self, incident: &Incident) {
        if let Some(id) = incident.id {
            self.id = AttrValue::Value(id.to_string());
        }
        self.project_id = AttrValue::from_option(incident.project_id);
        self.title = incident.title.clone().into();
        self.slug = incident.slug.clone().into();
        self.impact = incident.impact.clone().into();
        self.state = incident.state.clone().into();
        self.description = incident.description.clone().into();
        self.exclude_from_downtime = incident.exclude_from_downtime.into();
        self.status = incident.status.clone().into();
        self.incident_at = incident.incident_at.clone().into();
        self.recovery_at = AttrValue::from_option(incident.recovery_at.clone());
        self.created_at.refresh_preserving(incident.created_at.clone());
        self.updated_at.refresh_preserving(incident.updated_at.clone());
    }
}

/// Handler for the `phare_uptime_incident` data source.
#[derive(Debug, Clone)]
pub struct UptimeIncidentDataSource {
    client: PhareClient,
}

impl UptimeIncidentDataSource {
    /// Data source type name.
    pub const TYPE_NAME: &'static str = "phare_uptime_incident";

    /// Create a handler backed by `client`.
    pub fn new(client: PhareClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl DataSourceHandler for UptimeIncidentDataSource {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    async fn read(&self, config: Value) -> Result<Value, ProviderError> {
        let mut model: UptimeIncidentModel = decode_snapshot(config)?;
        let id = parse_id(&model.id)?;

        debug!(id, "Reading uptime incident");

        let incident = self.client.get_incident(id).await?;
        model.apply_entity(&incident);
        encode_snapshot(&model)
    }
}
