//! Phare Provider
//!
//! Declarative management of [Phare](https://phare.io) uptime monitoring
//! resources over the Phare REST API.
//!
//! # Overview
//!
//! The crate provides:
//!
//! - **API client** ([`PhareClient`]): authenticated JSON calls for monitors,
//!   alert rules, status pages and incidents, with per-operation error context
//! - **Resource handlers**: `phare_uptime_monitor`, `phare_alert_rule` and
//!   `phare_status_page`, plus the `phare_uptime_incident` data source, each
//!   converting between declarative snapshots and API entities
//! - **ProviderService trait**: the surface an orchestrator drives, implemented
//!   by [`PhareProvider`]
//! - **Error types** and [`Diagnostic`]s for reporting failures
//! - **Logging**: integration with `tracing` for structured logging
//! - **Testing**: [`testing::ProviderTester`] for lifecycle tests
//!
//! # Quick Start
//!
//! ```no_run
//! use phare_provider::{init_logging, PhareProvider, ProviderService};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging();
//!
//!     let provider = PhareProvider::new();
//!     // Falls back to PHARE_API_TOKEN / PHARE_BASE_URL.
//!     let diagnostics = provider.configure(json!({})).await?;
//!     assert!(diagnostics.is_empty());
//!
//!     let state = provider
//!         .create(
//!             "phare_uptime_monitor",
//!             json!({
//!                 "name": "API health",
//!                 "protocol": "http",
//!                 "http_request": {"method": "GET", "url": "https://example.com/health"},
//!                 "interval": 60,
//!                 "timeout": 7000,
//!                 "incident_confirmations": 1,
//!                 "recovery_confirmations": 1,
//!                 "regions": ["eu-deu-fra"]
//!             }),
//!         )
//!         .await?;
//!     tracing::info!(id = %state["id"], "Monitor created");
//!     Ok(())
//! }
//! ```
//!
//! # Snapshots
//!
//! Resource state travels as JSON objects. An absent key, an explicit `null`
//! and a concrete value are three different states (see [`AttrValue`]), and
//! ids are decimal strings.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod provider;
pub mod resources;
pub mod testing;
pub mod types;
pub mod value;

// Re-export main types at crate root
pub use client::PhareClient;
pub use config::{ClientSettings, ProviderConfig, API_TOKEN_ENV, BASE_URL_ENV};
pub use diagnostics::{Diagnostic, DiagnosticSeverity};
pub use error::{ApiError, ClientError, ProviderError};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::{PhareProvider, ProviderService};
pub use resources::{DataSourceHandler, ResourceHandler};
pub use types::{ImportedResource, ProviderMetadata};
pub use value::AttrValue;

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tokio_util::sync::CancellationToken;
pub use tracing;
