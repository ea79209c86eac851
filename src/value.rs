//! Tri-state attribute values for declarative snapshots.
//!
//! A declarative snapshot distinguishes three states for every attribute:
//!
//! - **Unset**: the key is absent from the snapshot.
//! - **Null**: the key is present with an explicit `null`.
//! - **Value**: the key is present with a concrete value.
//!
//! The Phare API treats an omitted field differently from an explicitly
//! cleared one, so the distinction has to survive every conversion. Use
//! `AttrValue` together with `#[serde(default)]` and
//! `#[serde(skip_serializing_if = "AttrValue::is_unset")]`:
//!
//! ```
//! use phare_provider::AttrValue;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! #[serde(default)]
//! struct Model {
//!     #[serde(skip_serializing_if = "AttrValue::is_unset")]
//!     domain: AttrValue<String>,
//! }
//!
//! let model: Model = serde_json::from_str(r#"{"domain": null}"#).unwrap();
//! assert!(model.domain.is_null());
//!
//! let model: Model = serde_json::from_str("{}").unwrap();
//! assert!(model.domain.is_unset());
//! assert_eq!(serde_json::to_string(&model).unwrap(), "{}");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ProviderError;

/// An attribute value that may be unset, explicitly null, or known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue<T> {
    /// The attribute is absent from the snapshot.
    Unset,
    /// The attribute is present and explicitly null.
    Null,
    /// The attribute holds a value.
    Value(T),
}

impl<T> AttrValue<T> {
    /// Returns `true` if the attribute is absent.
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Returns `true` if the attribute is explicitly null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if the attribute holds a value.
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Borrow the value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Unset | Self::Null => None,
        }
    }

    /// Convert into an `Option`, collapsing `Unset` and `Null` to `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Unset | Self::Null => None,
        }
    }

    /// Build a value from an `Option`, mapping `None` to `Null`.
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Value)
    }

    /// Borrow the value of a required attribute.
    ///
    /// Returns a conversion error naming `attribute` when it is unset or null.
    pub fn required(&self, attribute: &str) -> Result<&T, ProviderError> {
        match self {
            Self::Value(v) => Ok(v),
            Self::Unset => Err(ProviderError::Conversion(format!(
                "attribute '{}' is required but not set",
                attribute
            ))),
            Self::Null => Err(ProviderError::Conversion(format!(
                "attribute '{}' is required but null",
                attribute
            ))),
        }
    }

    /// Refresh from a field the API may omit from its responses.
    ///
    /// `Some` replaces the current state; `None` keeps whatever was there.
    pub fn refresh_preserving(&mut self, reported: Option<T>) {
        if let Some(v) = reported {
            *self = Self::Value(v);
        }
    }

    /// Refresh from a field the API always reports, where absence means cleared.
    ///
    /// `Some` replaces the current state. `None` turns a known value into
    /// `Null` and leaves `Unset` or `Null` untouched.
    pub fn refresh_nullable(&mut self, reported: Option<T>) {
        match reported {
            Some(v) => *self = Self::Value(v),
            None => {
                if self.is_known() {
                    *self = Self::Null;
                }
            },
        }
    }
}

impl<T: Clone> AttrValue<T> {
    /// Clone the value out, if any.
    pub fn cloned(&self) -> Option<T> {
        self.value().cloned()
    }
}

impl<T> AttrValue<Vec<T>> {
    /// Refresh a list the API reports as empty when it has no entries.
    ///
    /// A non-empty list replaces the current state. An empty report turns a
    /// non-empty known list into `Null` and leaves everything else alone, so
    /// an explicitly empty list stays empty.
    pub fn refresh_list(&mut self, reported: Vec<T>) {
        if !reported.is_empty() {
            *self = Self::Value(reported);
        } else if self.value().is_some_and(|current| !current.is_empty()) {
            *self = Self::Null;
        }
    }
}

impl<T> Default for AttrValue<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T> From<T> for AttrValue<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T: Serialize> Serialize for AttrValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Only reached when the field lacks `skip_serializing_if`.
            Self::Unset | Self::Null => serializer.serialize_none(),
            Self::Value(v) => serializer.serialize_some(v),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for AttrValue<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Absent keys never reach this point; they fall back to `Default`.
        Option::<T>::deserialize(deserializer).map(Self::from_option)
    }
}
