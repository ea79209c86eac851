//! `phare_status_page`: public status pages.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{carry_id, decode_snapshot, encode_snapshot, parse_id, ResourceHandler};
use crate::client::{PhareClient, StatusComponent, StatusPage, StatusPageColors};
use crate::error::ProviderError;
use crate::value::AttrValue;

/// History windows, in days, a status page can display.
pub const STATUS_PAGE_TIMEFRAMES: [i64; 3] = [30, 60, 90];

/// Declarative snapshot of a status page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusPageModel {
    /// Server-assigned id, as a decimal string.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub id: AttrValue<String>,
    /// Internal name.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub name: AttrValue<String>,
    /// Public title.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub title: AttrValue<String>,
    /// Public description.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub description: AttrValue<String>,
    /// Whether search engines may index the page.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub search_engine_indexed: AttrValue<bool>,
    /// Link back to the owner's website.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub website_url: AttrValue<String>,
    /// Subdomain under the Phare status domain.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub subdomain: AttrValue<String>,
    /// Custom domain.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub domain: AttrValue<String>,
    /// History window in days, one of [`STATUS_PAGE_TIMEFRAMES`].
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub timeframe: AttrValue<i64>,
    /// One color per component state.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub colors: AttrValue<StatusPageColorsModel>,
    /// Components shown on the page, in display order.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub components: AttrValue<Vec<StatusComponentModel>>,
    /// Logo reference.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub logo: AttrValue<String>,
    /// Favicon reference.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub favicon: AttrValue<String>,
    /// Creation timestamp, server-owned.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub created_at: AttrValue<String>,
    /// Last update timestamp, server-owned.
    #[serde(skip_serializing_if = "AttrValue::is_unset")]
    pub updated_at: AttrValue<String>,
}

/// The `colors` block. Snake case here, camel case on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPageColorsModel {
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

/// One entry of `components`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusComponentModel {
    /// Entity type, e.g. `uptime/monitor`.
    pub componentable_type: String,
    /// Entity id.
    pub componentable_id: i64,
}

impl From<&StatusPageColors> for StatusPageColorsModel {
    fn from(colors: &StatusPageColors) -> Self {
        Self {
            operational: colors.operational.clone(),
            degraded_performance: colors.degraded_performance.clone(),
            partial_outage: colors.partial_outage.clone(),
            major_outage: colors.major_outage.clone(),
            maintenance: colors.maintenance.clone(),
            empty: colors.empty.clone(),
        }
    }
}

impl From<&StatusPageColorsModel> for StatusPageColors {
    fn from(colors: &StatusPageColorsModel) -> Self {
        Self {
            operational: colors.operational.clone(),
            degraded_performance: colors.degraded_performance.clone(),
            partial_outage: colors.partial_outage.clone(),
            major_outage: colors.major_outage.clone(),
            maintenance: colors.maintenance.clone(),
            empty: colors.empty.clone(),
        }
    }
}

impl StatusPageModel {
    /// Convert the snapshot into an API entity.
    pub fn to_entity(&self) -> Result<StatusPage, ProviderError> {
        let timeframe = self.timeframe.cloned();
        if let Some(days) = timeframe {
            if !STATUS_PAGE_TIMEFRAMES.contains(&days) {
                return Err(ProviderError::Conversion(format!(
                    "timeframe must be one of 30, 60 or 90 days, got {}",
                    days
                )));
            }
        }

        let components = self
            .components
            .value()
            .map(|components| {
                components
                    .iter()
                    .map(|c| StatusComponent {
                        componentable_type: c.componentable_type.clone(),
                        componentable_id: c.componentable_id,
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Ok(StatusPage {
            id: None,
            name: self.name.required("name")?.clone(),
            title: self.title.required("title")?.clone(),
            description: self.description.required("description")?.clone(),
            search_engine_indexed: *self.search_engine_indexed.required("search_engine_indexed")?,
            website_url: self.website_url.required("website_url")?.clone(),
            subdomain: self.subdomain.cloned(),
            domain: self.domain.cloned(),
            timeframe,
            colors: self.colors.required("colors")?.into(),
            components,
            logo: self.logo.cloned(),
            favicon: self.favicon.cloned(),
            created_at: None,
            updated_at: None,
        })
    }

    /// Fold an API entity back into the snapshot.
    pub fn apply_entity(&mut self, page: &StatusPage) {
        if let Some(id) = page.id {
            self.id = AttrValue::Value(id.to_string());
        }
        self.name = page.name.clone().into();
        self.title = page.title.clone().into();
        self.description = page.description.clone().into();
        self.search_engine_indexed = page.search_engine_indexed.into();
        self.website_url = page.website_url.clone().into();
        self.subdomain.refresh_nullable(page.subdomain.clone());
        self.domain.refresh_nullable(page.domain.clone());
        self.timeframe.refresh_nullable(page.timeframe);
        self.logo.refresh_nullable(page.logo.clone());
        self.favicon.refresh_nullable(page.favicon.clone());
        self.colors = StatusPageColorsModel::from(&page.colors).into();
        self.components = page
            .components
            .iter()
            .map(|c| StatusComponentModel {
                componentable_type: c.componentable_type.clone(),
                componentable_id: c.componentable_id,
            })
            .collect::<Vec<_>>()
            .into();
        self.created_at.refresh_preserving(page.created_at.clone());
        self.updated_at.refresh_preserving(page.updated_at.clone());
    }
}

/// Handler for `phare_status_page`.
#[derive(Debug, Clone)]
pub struct StatusPageResource {
    client: PhareClient,
}

impl StatusPageResource {
    /// Resource type name.
    pub const TYPE_NAME: &'static str = "phare_status_page";

    /// Create a handler backed by `client`.
    pub fn new(client: PhareClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ResourceHandler for StatusPageResource {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    async fn create(&self, planned_state: Value) -> Result<Value, ProviderError> {
        let mut model: StatusPageModel = decode_snapshot(planned_state)?;
        let page = model.to_entity()?;

        debug!(name = %page.name, "Creating status page");

        let created = self.client.create_status_page(&page).await?;
        let id = created.id.ok_or_else(|| {
            ProviderError::InvalidResponse("API did not return a status page id".to_string())
        })?;

        let full = self.client.get_status_page(id).await?;
        model.apply_entity(&full);
        encode_snapshot(&model)
    }

    async fn read(&self, current_state: Value) -> Result<Value, ProviderError> {
        let mut model: StatusPageModel = decode_snapshot(current_state)?;
        let id = parse_id(&model.id)?;

        debug!(id, "Reading status page");

        let page = self.client.get_status_page(id).await?;
        model.apply_entity(&page);
        encode_snapshot(&model)
    }

    async fn update(
        &self,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let prior: StatusPageModel = decode_snapshot(prior_state)?;
        let mut model: StatusPageModel = decode_snapshot(planned_state)?;
        carry_id(&mut model.id, &prior.id)?;

        let page = model.to_entity()?;
        let id = parse_id(&model.id)?;

        debug!(id, "Updating status page");

        let updated = self.client.update_status_page(id, &page).await?;
        model.apply_entity(&updated);
        encode_snapshot(&model)
    }

    async fn delete(&self, current_state: Value) -> Result<(), ProviderError> {
        let model: StatusPageModel = decode_snapshot(current_state)?;
        let id = parse_id(&model.id)?;

        debug!(id, "Deleting status page");

        self.client.delete_status_page(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn planned() -> Value {
        json!({
            "name": "public",
            "title": "Acme Status",
            "description": "Live status of Acme services",
            "search_engine_indexed": true,
            "website_url": "https://acme.example",
            "subdomain": "acme",
            "timeframe": 90,
            "colors": {
                "operational": "#16a34a",
                "degraded_performance": "#fbbf24",
                "partial_outage": "#f59e0b",
                "major_outage": "#ef4444",
                "maintenance": "#6366f1",
                "empty": "#d3d3d3"
            },
            "components": [
                {"componentable_type": "uptime/monitor", "componentable_id": 42}
            ]
        })
    }

    fn model(snapshot: Value) -> StatusPageModel {
        serde_json::from_value(snapshot).unwrap()
    }

    #[test]
    fn test_forward_uses_camel_case_colors_on_the_wire() {
        let page = model(planned()).to_entity().unwrap();
        let wire = serde_json::to_value(&page).unwrap();
        assert_eq!(wire["colors"]["degradedPerformance"], "#fbbf24");
        assert_eq!(wire["components"][0]["componentable_id"], 42);
        assert!(wire.get("domain").is_none());
    }

    #[test]
    fn test_timeframe_must_be_supported() {
        for days in STATUS_PAGE_TIMEFRAMES {
            let mut snapshot = planned();
            snapshot["timeframe"] = json!(days);
            assert!(model(snapshot).to_entity().is_ok());
        }

        let mut snapshot = planned();
        snapshot["timeframe"] = json!(45);
        let err = model(snapshot).to_entity().unwrap_err();
        assert!(err.to_string().contains("45"));

        let mut snapshot = planned();
        snapshot["timeframe"] = Value::Null;
        assert_eq!(model(snapshot).to_entity().unwrap().timeframe, None);
    }

    #[test]
    fn test_colors_required() {
        let mut snapshot = planned();
        snapshot.as_object_mut().unwrap().remove("colors");
        let err = model(snapshot).to_entity().unwrap_err();
        assert!(err.to_string().contains("colors"));
    }

    #[test]
    fn test_reverse_nulls_cleared_optionals() {
        let mut m = model(planned());
        let mut echoed = m.to_entity().unwrap();
        echoed.id = Some(7);
        echoed.subdomain = None;
        echoed.timeframe = None;
        m.apply_entity(&echoed);

        let out = serde_json::to_value(&m).unwrap();
        assert_eq!(out["id"], "7");
        assert_eq!(out["subdomain"], Value::Null);
        assert_eq!(out["timeframe"], Value::Null);
        // Never declared, so it stays absent.
        assert!(out.get("domain").is_none());
        assert_eq!(out["colors"]["major_outage"], "#ef4444");
        assert_eq!(out["components"][0]["componentable_type"], "uptime/monitor");
    }
}
