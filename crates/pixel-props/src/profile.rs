//! Spoof profiles
//!
//! An [`IdentityProfile`] is an immutable set of field overrides derived from a
//! model name and a fingerprint. The [`ProfileRegistry`] builds the four named
//! profiles once and hands out shared references afterwards.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{ProfileDefinition, ProfileDefinitions};
use crate::field::{BuildField, FieldValue};
use crate::fingerprint::{parse_build_id, parse_device_name};

/// Named profile slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    /// Current flagship phone
    RecentFlagship,
    Tablet,
    /// Compact phone used for everything not otherwise matched
    Baseline,
    /// Old phone kept for the photos app
    Legacy,
}

impl ProfileKind {
    pub const ALL: [ProfileKind; 4] = [
        ProfileKind::RecentFlagship,
        ProfileKind::Tablet,
        ProfileKind::Baseline,
        ProfileKind::Legacy,
    ];
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RecentFlagship => "recent-flagship",
            Self::Tablet => "tablet",
            Self::Baseline => "baseline",
            Self::Legacy => "legacy",
        };
        f.write_str(name)
    }
}

/// Immutable field overrides presented to a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityProfile {
    name: String,
    fields: BTreeMap<BuildField, FieldValue>,
}

/// Build a Google-branded profile from a model and fingerprint.
///
/// `ID` comes from the fingerprint's build id; `DEVICE` and `PRODUCT` from its
/// device segment.
pub fn build_profile(model: &str, fingerprint: &str) -> IdentityProfile {
    let device = parse_device_name(fingerprint);

    let mut fields = BTreeMap::new();
    fields.insert(BuildField::Brand, FieldValue::from("google"));
    fields.insert(BuildField::Manufacturer, FieldValue::from("Google"));
    fields.insert(BuildField::Id, FieldValue::from(parse_build_id(fingerprint)));
    fields.insert(BuildField::Device, FieldValue::from(device.clone()));
    fields.insert(BuildField::Product, FieldValue::from(device));
    fields.insert(BuildField::Model, FieldValue::from(model));
    fields.insert(BuildField::Fingerprint, FieldValue::from(fingerprint));
    fields.insert(BuildField::Type, FieldValue::from("user"));
    fields.insert(BuildField::Tags, FieldValue::from("release-keys"));

    IdentityProfile {
        name: model.to_string(),
        fields,
    }
}

impl IdentityProfile {
    /// Build a profile from its configured definition.
    ///
    /// Extra overrides naming a field outside the closed set are logged and
    /// dropped; the rest of the profile is unaffected.
    pub fn from_definition(definition: &ProfileDefinition) -> Self {
        let mut profile = build_profile(&definition.model, &definition.fingerprint);
        for (name, value) in &definition.extra {
            match name.parse::<BuildField>() {
                Ok(field) => {
                    profile.fields.insert(field, FieldValue::from(value.as_str()));
                }
                Err(e) => warn!(
                    profile = definition.model.as_str(),
                    error = %e,
                    "Ignoring extra profile override"
                ),
            }
        }
        profile
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, field: BuildField) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    /// Overrides in field order.
    pub fn fields(&self) -> impl Iterator<Item = (BuildField, &FieldValue)> {
        self.fields.iter().map(|(field, value)| (*field, value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The named profiles, built once at startup.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    recent_flagship: IdentityProfile,
    tablet: IdentityProfile,
    baseline: IdentityProfile,
    legacy: IdentityProfile,
}

impl ProfileRegistry {
    pub fn from_definitions(definitions: &ProfileDefinitions) -> Self {
        Self {
            recent_flagship: IdentityProfile::from_definition(&definitions.recent_flagship),
            tablet: IdentityProfile::from_definition(&definitions.tablet),
            baseline: IdentityProfile::from_definition(&definitions.baseline),
            legacy: IdentityProfile::from_definition(&definitions.legacy),
        }
    }

    pub fn get(&self, kind: ProfileKind) -> &IdentityProfile {
        match kind {
            ProfileKind::RecentFlagship => &self.recent_flagship,
            ProfileKind::Tablet => &self.tablet,
            ProfileKind::Baseline => &self.baseline,
            ProfileKind::Legacy => &self.legacy,
        }
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::from_definitions(&ProfileDefinitions::default())
    }
}
