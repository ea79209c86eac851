//! Testing utilities for provider implementations.
//!
//! [`ProviderTester`] drives a [`ProviderService`] through the same sequence
//! of calls an orchestrator would make, so lifecycle tests read top to bottom.
//!
//! # Example
//!
//! ```no_run
//! use phare_provider::testing::ProviderTester;
//! use phare_provider::PhareProvider;
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let tester = ProviderTester::new(PhareProvider::new());
//! tester
//!     .configure(json!({"api_token": "test", "base_url": "http://127.0.0.1:8080"}))
//!     .await?;
//!
//! let state = tester
//!     .lifecycle_crud(
//!         "phare_alert_rule",
//!         json!({"event": "uptime.incident.created", "integration_id": 1,
//!                "rate_limit": 0, "event_settings": {"type": "all"}}),
//!         json!({"event": "uptime.incident.created", "integration_id": 1,
//!                "rate_limit": 5, "event_settings": {"type": "all"}}),
//!     )
//!     .await?;
//! assert_eq!(state["rate_limit"], 5);
//! # Ok(())
//! # }
//! ```

use serde_json::Value;

use crate::diagnostics::Diagnostic;
use crate::error::ProviderError;
use crate::provider::ProviderService;
use crate::types::ImportedResource;

/// A test harness for provider implementations.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Get the list of resource type names.
    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    /// Get the list of data source type names.
    pub fn data_source_types(&self) -> Vec<String> {
        self.provider.metadata().data_sources
    }

    /// Configure the provider, failing on any error diagnostic.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Create a new resource.
    pub async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.create(resource_type, planned_state).await
    }

    /// Read the current state of a resource.
    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.read(resource_type, current_state).await
    }

    /// Update an existing resource.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .update(resource_type, prior_state, planned_state)
            .await
    }

    /// Delete a resource.
    pub async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, current_state).await
    }

    /// Import an existing resource.
    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    /// Read data from a data source.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .read_data_source(data_source_type, config)
            .await
    }

    /// Create, then read back. Returns the state after read.
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let created = self.create(resource_type, planned).await?;
        self.read(resource_type, created).await
    }

    /// Update, then read back. Returns the state after read.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let updated = self.update(resource_type, prior_state, planned).await?;
        self.read(resource_type, updated).await
    }

    /// Import by id and return the single imported state.
    pub async fn lifecycle_import(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Value, TestError> {
        let mut imported = self.import_resource(resource_type, id).await?;
        match imported.len() {
            1 => Ok(imported.remove(0).state),
            n => Err(TestError::Unexpected(format!(
                "expected exactly one imported resource, got {}",
                n
            ))),
        }
    }

    /// Run a full CRUD lifecycle: create → read → update → read → delete.
    ///
    /// Returns the state after the update (before delete).
    pub async fn lifecycle_crud(
        &self,
        resource_type: &str,
        initial: Value,
        updated: Value,
    ) -> Result<Value, ProviderError> {
        let created = self.lifecycle_create(resource_type, initial).await?;
        let updated = self.lifecycle_update(resource_type, created, updated).await?;
        self.delete(resource_type, updated.clone()).await?;
        Ok(updated)
    }
}

/// Error type for test operations that may fail with diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum TestError {
    /// The operation failed with diagnostics.
    #[error("{}", render_diagnostics(.0))]
    Diagnostics(Vec<Diagnostic>),
    /// The operation failed with a provider error.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
    /// The operation returned something the harness did not expect.
    #[error("Unexpected result: {0}")]
    Unexpected(String),
}

fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut out = format!("Operation failed with {} diagnostic(s):\n", diagnostics.len());
    for diag in diagnostics {
        out.push_str(&format!("  [{:?}] {}", diag.severity, diag.summary));
        if let Some(detail) = &diag.detail {
            out.push_str(&format!(": {}", detail));
        }
        if let Some(attr) = &diag.attribute {
            out.push_str(&format!(" (at {})", attr));
        }
        out.push('\n');
    }
    out
}

/// Check diagnostics and return an error if there are any errors.
fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics.into_iter().filter(Diagnostic::is_error).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();

    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain an error whose summary or detail contains `substring`.
///
/// # Panics
///
/// Panics if no error diagnostic matches.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let matches = diagnostics.iter().any(|d| {
        d.is_error()
            && (d.summary.contains(substring)
                || d.detail.as_deref().is_some_and(|detail| detail.contains(substring)))
    });

    assert!(
        matches,
        "Expected an error containing '{}', but no matching error found. Errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| &d.summary)
            .collect::<Vec<_>>()
    );
}

/// Assert that the attribute at JSON `pointer` in `state` equals `expected`.
///
/// # Panics
///
/// Panics if the attribute is missing or differs.
pub fn assert_attribute(state: &Value, pointer: &str, expected: &Value) {
    match state.pointer(pointer) {
        Some(actual) => assert_eq!(
            actual, expected,
            "Attribute '{}' is {}, expected {}",
            pointer, actual, expected
        ),
        None => panic!("Attribute '{}' is absent from state {}", pointer, state),
    }
}

/// Assert that the attribute at JSON `pointer` is absent from `state`.
///
/// # Panics
///
/// Panics if the attribute is present, even as `null`.
pub fn assert_attribute_absent(state: &Value, pointer: &str) {
    assert!(
        state.pointer(pointer).is_none(),
        "Expected attribute '{}' to be absent from state {}",
        pointer,
        state
    );
}
