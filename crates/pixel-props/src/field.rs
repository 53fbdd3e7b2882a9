//! Identity fields
//!
//! The closed set of build identity fields a profile may override, together
//! with their storage type. Field names are resolved once, when profiles and
//! keep rules are built, so the hot path never looks fields up by string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PropsError, Result};

/// A build identity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildField {
    Brand,
    Manufacturer,
    Id,
    Device,
    Product,
    Model,
    Fingerprint,
    Type,
    Tags,
    Time,
    Incremental,
    Release,
    SdkInt,
    SecurityPatch,
}

/// Storage type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
}

impl BuildField {
    /// Every field, in declaration order.
    pub const ALL: [BuildField; 14] = [
        BuildField::Brand,
        BuildField::Manufacturer,
        BuildField::Id,
        BuildField::Device,
        BuildField::Product,
        BuildField::Model,
        BuildField::Fingerprint,
        BuildField::Type,
        BuildField::Tags,
        BuildField::Time,
        BuildField::Incremental,
        BuildField::Release,
        BuildField::SdkInt,
        BuildField::SecurityPatch,
    ];

    /// Canonical upper-case name, e.g. `FINGERPRINT`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Brand => "BRAND",
            Self::Manufacturer => "MANUFACTURER",
            Self::Id => "ID",
            Self::Device => "DEVICE",
            Self::Product => "PRODUCT",
            Self::Model => "MODEL",
            Self::Fingerprint => "FINGERPRINT",
            Self::Type => "TYPE",
            Self::Tags => "TAGS",
            Self::Time => "TIME",
            Self::Incremental => "INCREMENTAL",
            Self::Release => "RELEASE",
            Self::SdkInt => "SDK_INT",
            Self::SecurityPatch => "SECURITY_PATCH",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Time | Self::SdkInt => FieldKind::Integer,
            _ => FieldKind::Text,
        }
    }
}

impl fmt::Display for BuildField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuildField {
    type Err = PropsError;

    fn from_str(s: &str) -> Result<Self> {
        BuildField::ALL
            .iter()
            .copied()
            .find(|field| field.name() == s)
            .ok_or_else(|| PropsError::UnknownField(s.to_string()))
    }
}

/// A value destined for a field: either a native integer or text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
}

impl FieldValue {
    /// Render as text. Integers are stringified.
    pub fn to_text(&self) -> String {
        match self {
            Self::Integer(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Coerce to an integer for `field`, parsing numeric text.
    pub fn to_integer(&self, field: BuildField) -> Result<i64> {
        match self {
            Self::Integer(n) => Ok(*n),
            Self::Text(s) => s.parse().map_err(|_| PropsError::TypeCoercion {
                field: field.name().to_string(),
                value: s.clone(),
            }),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}
