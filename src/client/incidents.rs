//! Uptime incidents: `/uptime/incidents`. Read and delete only.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{null_as_default, PhareClient};
use crate::error::ClientError;

/// An uptime incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    /// Server-assigned id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Owning project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    /// Incident title.
    pub title: String,
    /// URL slug.
    pub slug: String,
    /// Impact level.
    pub impact: String,
    /// Lifecycle state.
    pub state: String,
    /// Free-form description.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Whether the incident is excluded from downtime statistics.
    #[serde(default, deserialize_with = "null_as_default")]
    pub exclude_from_downtime: bool,
    /// `ongoing` or `resolved`.
    pub status: String,
    /// When the incident started.
    pub incident_at: String,
    /// When the incident recovered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_at: Option<String>,
    /// Creation timestamp, server-owned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp, server-owned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl PhareClient {
    /// Retrieve an incident by id.
    pub async fn get_incident(&self, id: i64) -> Result<Incident, ClientError> {
        self.fetch::<(), _>(
            "get incident",
            Method::GET,
            &format!("/uptime/incidents/{}", id),
            None,
        )
        .await
    }

    /// Delete an incident.
    pub async fn delete_incident(&self, id: i64) -> Result<(), ClientError> {
        self.execute("delete incident", Method::DELETE, &format!("/uptime/incidents/{}", id)).await
    }

    /// List all incidents.
    pub async fn list_incidents(&self) -> Result<Vec<Incident>, ClientError> {
        self.fetch_list("list incidents", "/uptime/incidents").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_description_decodes_as_empty() {
        let incident: Incident = serde_json::from_value(json!({
            "id": 11,
            "project_id": null,
            "title": "API down",
            "slug": "api-down",
            "impact": "major_outage",
            "state": "investigating",
            "description": null,
            "exclude_from_downtime": null,
            "status": "ongoing",
            "incident_at": "2025-03-01T10:00:00Z",
            "recovery_at": null
        }))
        .unwrap();
        assert_eq!(incident.description, "");
        assert!(!incident.exclude_from_downtime);
        assert_eq!(incident.recovery_at, None);
    }
}
