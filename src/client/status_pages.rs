//! Status pages: `/uptime/status-pages`.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{null_as_default, PhareClient};
use crate::error::ClientError;

/// A public status page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPage {
    /// Server-assigned id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Internal name.
    pub name: String,
    /// Public title.
    pub title: String,
    /// Public description.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Whether search engines may index the page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub search_engine_indexed: bool,
    /// Link back to the owner's website.
    #[serde(default, deserialize_with = "null_as_default")]
    pub website_url: String,
    /// Subdomain under the Phare status domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    /// Custom domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// History window in days (30, 60 or 90).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<i64>,
    /// One color per component state.
    pub colors: StatusPageColors,
    /// Components shown on the page, in display order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub components: Vec<StatusComponent>,
    /// Logo reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Favicon reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    /// Creation timestamp, server-owned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp, server-owned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Status page palette. Keys are camelCase on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPageColors {
    /// All systems operational.
    pub operational: String,
    /// Degraded performance.
    pub degraded_performance: String,
    /// Partial outage.
    pub partial_outage: String,
    /// Major outage.
    pub major_outage: String,
    /// Under maintenance.
    pub maintenance: String,
    /// No data.
    pub empty: String,
}

/// A monitorable entity embedded in a status page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusComponent {
    /// Entity type, e.g. `uptime/monitor`.
    pub componentable_type: String,
    /// Entity id.
    pub componentable_id: i64,
}

impl PhareClient {
    /// Create a new status page.
    pub async fn create_status_page(&self, page: &StatusPage) -> Result<StatusPage, ClientError> {
        self.fetch("create status page", Method::POST, "/uptime/status-pages", Some(page)).await
    }

    /// Retrieve a status page by id.
    pub async fn get_status_page(&self, id: i64) -> Result<StatusPage, ClientError> {
        self.fetch::<(), _>(
            "get status page",
            Method::GET,
            &format!("/uptime/status-pages/{}", id),
            None,
        )
        .await
    }

    /// Update an existing status page.
    pub async fn update_status_page(
        &self,
        id: i64,
        page: &StatusPage,
    ) -> Result<StatusPage, ClientError> {
        self.fetch(
            "update status page",
            Method::POST,
            &format!("/uptime/status-pages/{}", id),
            Some(page),
        )
        .await
    }

    /// Delete a status page.
    pub async fn delete_status_page(&self, id: i64) -> Result<(), ClientError> {
        self.execute(
            "delete status page",
            Method::DELETE,
            &format!("/uptime/status-pages/{}", id),
        )
        .await
    }

    /// List all status pages.
    pub async fn list_status_pages(&self) -> Result<Vec<StatusPage>, ClientError> {
        self.fetch_list("list status pages", "/uptime/status-pages").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_colors_use_camel_case() {
        let colors = StatusPageColors {
            operational: "#16a34a".to_string(),
            degraded_performance: "#fbbf24".to_string(),
            partial_outage: "#f59e0b".to_string(),
            major_outage: "#ef4444".to_string(),
            maintenance: "#6366f1".to_string(),
            empty: "#d3d3d3".to_string(),
        };
        let value = serde_json::to_value(&colors).unwrap();
        assert_eq!(value["degradedPerformance"], "#fbbf24");
        assert_eq!(value["partialOutage"], "#f59e0b");
        assert_eq!(value["majorOutage"], "#ef4444");
    }

    #[test]
    fn test_components_keep_order() {
        let page: StatusPage = serde_json::from_value(json!({
            "id": 7,
            "name": "public",
            "title": "Status",
            "description": "Our services",
            "search_engine_indexed": true,
            "website_url": "https://example.com",
            "subdomain": "example",
            "timeframe": 90,
            "colors": {
                "operational": "a", "degradedPerformance": "b", "partialOutage": "c",
                "majorOutage": "d", "maintenance": "e", "empty": "f"
            },
            "components": [
                {"componentable_type": "uptime/monitor", "componentable_id": 3},
                {"componentable_type": "uptime/monitor", "componentable_id": 1}
            ]
        }))
        .unwrap();

        let ids: Vec<i64> = page.components.iter().map(|c| c.componentable_id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(page.colors.empty, "f");
        assert!(page.domain.is_none());
    }

    #[test]
    fn test_null_fields_decode_as_empty() {
        let page: StatusPage = serde_json::from_value(json!({
            "id": 7,
            "name": "public",
            "title": "Status",
            "description": null,
            "search_engine_indexed": null,
            "website_url": null,
            "colors": {
                "operational": "a", "degradedPerformance": "b", "partialOutage": "c",
                "majorOutage": "d", "maintenance": "e", "empty": "f"
            },
            "components": null
        }))
        .unwrap();
        assert!(page.components.is_empty());
        assert_eq!(page.description, "");
        assert!(!page.search_engine_indexed);
    }
}
