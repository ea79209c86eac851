//! Resource and data source handlers.
//!
//! Each handler owns a clone of the shared [`PhareClient`] and translates
//! between declarative snapshots (`serde_json::Value`, see [`AttrValue`]) and
//! API entities:
//!
//! 1. decode the snapshot into a typed model,
//! 2. convert the model to an entity (`to_entity`), failing before any
//!    network call if the snapshot is incomplete or inconsistent,
//! 3. call the API,
//! 4. fold the returned entity back into the model (`apply_entity`), which
//!    keeps values the API does not echo,
//! 5. encode the model as the new snapshot.
//!
//! [`PhareClient`]: crate::client::PhareClient

mod alert_rule;
mod status_page;
mod uptime_incident;
mod uptime_monitor;

pub use alert_rule::{AlertEventSettingsModel, AlertRuleModel, AlertRuleResource};
pub use status_page::{
    StatusComponentModel, StatusPageColorsModel, StatusPageModel, StatusPageResource,
    STATUS_PAGE_TIMEFRAMES,
};
pub use uptime_incident::{UptimeIncidentDataSource, UptimeIncidentModel};
pub use uptime_monitor::{
    HttpRequestModel, RequestHeaderModel, SuccessAssertionModel, TcpRequestModel,
    UptimeMonitorModel, UptimeMonitorResource,
};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ProviderError;
use crate::value::AttrValue;

/// CRUD handler for one managed resource type.
#[async_trait::async_trait]
pub trait ResourceHandler: Send + Sync {
    /// The resource type name, e.g. `phare_uptime_monitor`.
    fn type_name(&self) -> &'static str;

    /// Create the resource from the planned snapshot and return the new state.
    async fn create(&self, planned_state: Value) -> Result<Value, ProviderError>;

    /// Refresh the current snapshot from the API.
    async fn read(&self, current_state: Value) -> Result<Value, ProviderError>;

    /// Apply the planned snapshot to an existing resource.
    async fn update(
        &self,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete the resource described by the current snapshot.
    async fn delete(&self, current_state: Value) -> Result<(), ProviderError>;

    /// Import an existing resource by id.
    async fn import(&self, id: &str) -> Result<Value, ProviderError> {
        self.read(serde_json::json!({ "id": id })).await
    }
}

/// Read-only handler for one data source type.
#[async_trait::async_trait]
pub trait DataSourceHandler: Send + Sync {
    /// The data source type name, e.g. `phare_uptime_incident`.
    fn type_name(&self) -> &'static str;

    /// Read the data source described by `config`.
    async fn read(&self, config: Value) -> Result<Value, ProviderError>;
}

/// Decode a declarative snapshot into a typed model.
pub(crate) fn decode_snapshot<T: DeserializeOwned>(state: Value) -> Result<T, ProviderError> {
    serde_json::from_value(state).map_err(|e| ProviderError::Conversion(e.to_string()))
}

/// Encode a typed model as a declarative snapshot.
pub(crate) fn encode_snapshot<T: Serialize>(model: &T) -> Result<Value, ProviderError> {
    Ok(serde_json::to_value(model)?)
}

/// Parse the string id of a snapshot into the API's numeric id.
pub(crate) fn parse_id(id: &AttrValue<String>) -> Result<i64, ProviderError> {
    let raw = id.value().ok_or_else(|| ProviderError::InvalidId {
        id: String::new(),
        reason: "id is not set".to_string(),
    })?;
    raw.parse::<i64>().map_err(|e| ProviderError::InvalidId {
        id: raw.clone(),
        reason: e.to_string(),
    })
}

/// Carry the prior state's id into the plan.
///
/// A resource's id never changes after creation; a plan naming another id is
/// rejected.
pub(crate) fn carry_id(
    planned: &mut AttrValue<String>,
    prior: &AttrValue<String>,
) -> Result<(), ProviderError> {
    if let (Some(planned_id), Some(prior_id)) = (planned.value(), prior.value()) {
        if planned_id != prior_id {
            return Err(ProviderError::Conversion(format!(
                "id cannot change from '{}' to '{}'",
                prior_id, planned_id
            )));
        }
    }
    *planned = prior.clone();
    Ok(())
}
