//! Convenience types returned by [`ProviderService`](crate::ProviderService).

use serde::{Deserialize, Serialize};

/// An imported resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    /// The resource type.
    pub resource_type: String,
    /// The imported state.
    pub state: serde_json::Value,
}

impl ImportedResource {
    /// Create a new imported resource.
    pub fn new(resource_type: impl Into<String>, state: serde_json::Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// Type names served by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// List of resource type names.
    pub resources: Vec<String>,
    /// List of data source type names.
    pub data_sources: Vec<String>,
}

impl ProviderMetadata {
    /// Returns `true` if `name` is a managed resource type.
    pub fn has_resource(&self, name: &str) -> bool {
        self.resources.iter().any(|r| r == name)
    }

    /// Returns `true` if `name` is a data source type.
    pub fn has_data_source(&self, name: &str) -> bool {
        self.data_sources.iter().any(|d| d == name)
    }
}
