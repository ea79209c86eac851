//! Structured diagnostics reported back to the orchestrator.

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ProviderError};

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// An error that prevents the operation from completing.
    Error,
    /// A warning that doesn't prevent the operation but should be addressed.
    Warning,
}

/// A diagnostic message from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity of the diagnostic.
    pub severity: DiagnosticSeverity,
    /// A short summary of the issue.
    pub summary: String,
    /// A detailed description of the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// The attribute path where the issue occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Add detail to this diagnostic.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the attribute path for this diagnostic.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Returns `true` for error diagnostics.
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl From<&ProviderError> for Diagnostic {
    fn from(err: &ProviderError) -> Self {
        let summary = match err {
            ProviderError::Configuration(_) => "Invalid provider configuration",
            ProviderError::Conversion(_) => "Invalid resource configuration",
            ProviderError::InvalidId { .. } => "Invalid resource id",
            ProviderError::InvalidResponse(_) => "Unexpected API response",
            ProviderError::UnknownResource(_) => "Unknown resource type",
            ProviderError::Serialization(_) => "Unable to encode state",
            ProviderError::Client(client) => match client.root() {
                ClientError::Configuration(_) => "Unable to create Phare API client",
                ClientError::Decode(_) => "Unable to decode Phare API response",
                ClientError::Api(_) => "Phare API request failed",
                _ => "Unable to reach Phare API",
            },
        };

        let diagnostic = Self::error(summary).with_detail(err.to_string());
        match err {
            ProviderError::InvalidId { .. } => diagnostic.with_attribute("id"),
            _ => diagnostic,
        }
    }
}

impl From<ProviderError> for Diagnostic {
    fn from(err: ProviderError) -> Self {
        Self::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn test_builders() {
        let diag = Diagnostic::warning("deprecated")
            .with_detail("use base_url instead")
            .with_attribute("endpoint");
        assert!(!diag.is_error());
        assert_eq!(diag.detail.as_deref(), Some("use base_url instead"));
        assert_eq!(diag.attribute.as_deref(), Some("endpoint"));
    }

    #[test]
    fn test_from_provider_error() {
        let err = ProviderError::InvalidId {
            id: "x1".to_string(),
            reason: "invalid digit found in string".to_string(),
        };
        let diag = Diagnostic::from(&err);
        assert!(diag.is_error());
        assert_eq!(diag.summary, "Invalid resource id");
        assert_eq!(diag.attribute.as_deref(), Some("id"));

        let body = br#"{"message":"invalid","errors":{"name":["taken"]}}"#;
        let api = ApiError::from_response(422, body);
        let err = ProviderError::Client(ClientError::Api(api).during("create monitor"));
        let diag = Diagnostic::from(err);
        assert_eq!(diag.summary, "Phare API request failed");
        let detail = diag.detail.unwrap();
        assert!(detail.contains("create monitor"));
        assert!(detail.contains("taken"));
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let json = serde_json::to_value(Diagnostic::error("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"severity": "error", "summary": "boom"}));
    }
}
