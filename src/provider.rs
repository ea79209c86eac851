//! The provider surface driven by the orchestrator.
//!
//! [`ProviderService`] is the set of calls an orchestrator makes. [`PhareProvider`]
//! implements it by dispatching on the type name to the handlers in
//! [`crate::resources`]. All handlers share the single [`PhareClient`] built
//! by [`ProviderService::configure`].

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::PhareClient;
use crate::config::ProviderConfig;
use crate::diagnostics::Diagnostic;
use crate::error::ProviderError;
use crate::resources::{
    AlertRuleResource, DataSourceHandler, ResourceHandler, StatusPageResource,
    UptimeIncidentDataSource, UptimeMonitorResource,
};
use crate::types::{ImportedResource, ProviderMetadata};

/// The trait a provider implements.
///
/// Resource and data source calls name the target type and carry declarative
/// snapshots as JSON.
#[async_trait::async_trait]
pub trait ProviderService: Send + Sync + 'static {
    /// Return the resource and data source type names this provider serves.
    fn metadata(&self) -> ProviderMetadata;

    /// Configure the provider with credentials and settings.
    /// Returns diagnostics (errors and warnings).
    async fn configure(&self, config: serde_json::Value) -> Result<Vec<Diagnostic>, ProviderError>;

    /// Create a new resource.
    async fn create(
        &self,
        resource_type: &str,
        planned_state: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError>;

    /// Read the current state of a resource.
    async fn read(
        &self,
        resource_type: &str,
        current_state: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError>;

    /// Update an existing resource.
    async fn update(
        &self,
        resource_type: &str,
        prior_state: serde_json::Value,
        planned_state: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError>;

    /// Delete a resource.
    async fn delete(
        &self,
        resource_type: &str,
        current_state: serde_json::Value,
    ) -> Result<(), ProviderError>;

    /// Import existing infrastructure into management.
    async fn import_resource(
        &self,
        resource_type: &str,
        _id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        Err(ProviderError::UnknownResource(format!(
            "Import not supported for resource type: {}",
            resource_type
        )))
    }

    /// Read data from an external source.
    async fn read_data_source(
        &self,
        data_source_type: &str,
        _config: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        Err(ProviderError::UnknownResource(format!(
            "Unknown data source type: {}",
            data_source_type
        )))
    }
}

/// Handlers bound to one configured client.
struct Registry {
    resources: BTreeMap<&'static str, Arc<dyn ResourceHandler>>,
    data_sources: BTreeMap<&'static str, Arc<dyn DataSourceHandler>>,
}

impl Registry {
    fn new(client: PhareClient) -> Self {
        let resources: Vec<Arc<dyn ResourceHandler>> = vec![
            Arc::new(UptimeMonitorResource::new(client.clone())),
            Arc::new(AlertRuleResource::new(client.clone())),
            Arc::new(StatusPageResource::new(client.clone())),
        ];
        let data_sources: Vec<Arc<dyn DataSourceHandler>> =
            vec![Arc::new(UptimeIncidentDataSource::new(client))];

        Self {
            resources: resources.into_iter().map(|h| (h.type_name(), h)).collect(),
            data_sources: data_sources.into_iter().map(|h| (h.type_name(), h)).collect(),
        }
    }
}

/// The Phare provider.
///
/// ```no_run
/// use phare_provider::{PhareProvider, ProviderService};
/// use serde_json::json;
///
/// # async fn run() -> Result<(), phare_provider::ProviderError> {
/// let provider = PhareProvider::new();
/// let diagnostics = provider.configure(json!({"api_token": "token"})).await?;
/// assert!(diagnostics.is_empty());
///
/// let state = provider
///     .read("phare_uptime_monitor", json!({"id": "42"}))
///     .await?;
/// println!("{}", state["name"]);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct PhareProvider {
    registry: RwLock<Option<Arc<Registry>>>,
    cancellation: Option<CancellationToken>,
}

impl PhareProvider {
    /// Create an unconfigured provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort in-flight and future API calls when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Returns `true` once [`ProviderService::configure`] has succeeded.
    pub async fn is_configured(&self) -> bool {
        self.registry.read().await.is_some()
    }

    async fn registry(&self) -> Result<Arc<Registry>, ProviderError> {
        self.registry.read().await.clone().ok_or_else(|| {
            ProviderError::Configuration("provider has not been configured".to_string())
        })
    }

    async fn resource(
        &self,
        resource_type: &str,
    ) -> Result<Arc<dyn ResourceHandler>, ProviderError> {
        let registry = self.registry().await?;
        registry
            .resources
            .get(resource_type)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }

    async fn data_source(
        &self,
        data_source_type: &str,
    ) -> Result<Arc<dyn DataSourceHandler>, ProviderError> {
        let registry = self.registry().await?;
        registry
            .data_sources
            .get(data_source_type)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownResource(data_source_type.to_string()))
    }
}

impl std::fmt::Debug for PhareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhareProvider")
            .field("cancellation", &self.cancellation.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl ProviderService for PhareProvider {
    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            resources: vec![
                AlertRuleResource::TYPE_NAME.to_string(),
                StatusPageResource::TYPE_NAME.to_string(),
                UptimeMonitorResource::TYPE_NAME.to_string(),
            ],
            data_sources: vec![UptimeIncidentDataSource::TYPE_NAME.to_string()],
        }
    }

    async fn configure(&self, config: serde_json::Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let settings = match ProviderConfig::from_value(config).and_then(|c| c.resolve()) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(error = %err, "Provider configuration rejected");
                return Ok(vec![Diagnostic::from(&err)]);
            },
        };

        let mut client = settings.build_client()?;
        if let Some(token) = &self.cancellation {
            client = client.with_cancellation(token.clone());
        }

        *self.registry.write().await = Some(Arc::new(Registry::new(client)));
        info!(base_url = %settings.base_url, "Phare provider configured");
        Ok(vec![])
    }

    async fn create(
        &self,
        resource_type: &str,
        planned_state: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        debug!(resource_type, "Create");
        self.resource(resource_type).await?.create(planned_state).await
    }

    async fn read(
        &self,
        resource_type: &str,
        current_state: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        debug!(resource_type, "Read");
        self.resource(resource_type).await?.read(current_state).await
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: serde_json::Value,
        planned_state: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        debug!(resource_type, "Update");
        self.resource(resource_type)
            .await?
            .update(prior_state, planned_state)
            .await
    }

    async fn delete(
        &self,
        resource_type: &str,
        current_state: serde_json::Value,
    ) -> Result<(), ProviderError> {
        debug!(resource_type, "Delete");
        self.resource(resource_type).await?.delete(current_state).await
    }

    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        debug!(resource_type, id, "Import");
        let state = self.resource(resource_type).await?.import(id).await?;
        Ok(vec![ImportedResource::new(resource_type, state)])
    }

    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        debug!(data_source_type, "Read data source");
        self.data_source(data_source_type).await?.read(config).await
    }
}
