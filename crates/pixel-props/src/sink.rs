//! Identity field sink
//!
//! The process-wide build identity the policy writes into. Hosts implement
//! [`IdentitySink`] over their real storage; [`BuildIdentity`] is the plain
//! in-memory identity used by hosts without one and by tests.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::field::{BuildField, FieldKind, FieldValue};

/// Typed writer for build identity fields.
pub trait IdentitySink {
    /// Write one field. Integer fields accept native integers or numeric
    /// text; text fields accept any value, stringified.
    fn set_field(&mut self, field: BuildField, value: &FieldValue) -> Result<()>;

    /// Current value of one field.
    fn field(&self, field: BuildField) -> FieldValue;
}

/// In-memory build identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildIdentity {
    pub brand: String,
    pub manufacturer: String,
    pub id: String,
    pub device: String,
    pub product: String,
    pub model: String,
    pub fingerprint: String,
    pub build_type: String,
    pub tags: String,
    /// Build time in milliseconds
    pub time: i64,
    pub incremental: String,
    pub release: String,
    pub sdk_int: i64,
    pub security_patch: String,
}

impl BuildIdentity {
    fn text_slot(&mut self, field: BuildField) -> Option<&mut String> {
        let slot = match field {
            BuildField::Brand => &mut self.brand,
            BuildField::Manufacturer => &mut self.manufacturer,
            BuildField::Id => &mut self.id,
            BuildField::Device => &mut self.device,
            BuildField::Product => &mut self.product,
            BuildField::Model => &mut self.model,
            BuildField::Fingerprint => &mut self.fingerprint,
            BuildField::Type => &mut self.build_type,
            BuildField::Tags => &mut self.tags,
            BuildField::Incremental => &mut self.incremental,
            BuildField::Release => &mut self.release,
            BuildField::SecurityPatch => &mut self.security_patch,
            BuildField::Time | BuildField::SdkInt => return None,
        };
        Some(slot)
    }

    fn integer_slot(&mut self, field: BuildField) -> Option<&mut i64> {
        match field {
            BuildField::Time => Some(&mut self.time),
            BuildField::SdkInt => Some(&mut self.sdk_int),
            _ => None,
        }
    }
}

impl IdentitySink for BuildIdentity {
    fn set_field(&mut self, field: BuildField, value: &FieldValue) -> Result<()> {
        match field.kind() {
            FieldKind::Integer => {
                let parsed = value.to_integer(field)?;
                if let Some(slot) = self.integer_slot(field) {
                    *slot = parsed;
                }
            }
            FieldKind::Text => {
                if let Some(slot) = self.text_slot(field) {
                    *slot = value.to_text();
                }
            }
        }
        Ok(())
    }

    fn field(&self, field: BuildField) -> FieldValue {
        match field {
            BuildField::Brand => FieldValue::from(self.brand.as_str()),
            BuildField::Manufacturer => FieldValue::from(self.manufacturer.as_str()),
            BuildField::Id => FieldValue::from(self.id.as_str()),
            BuildField::Device => FieldValue::from(self.device.as_str()),
            BuildField::Product => FieldValue::from(self.product.as_str()),
            BuildField::Model => FieldValue::from(self.model.as_str()),
            BuildField::Fingerprint => FieldValue::from(self.fingerprint.as_str()),
            BuildField::Type => FieldValue::from(self.build_type.as_str()),
            BuildField::Tags => FieldValue::from(self.tags.as_str()),
            BuildField::Time => FieldValue::from(self.time),
            BuildField::Incremental => FieldValue::from(self.incremental.as_str()),
            BuildField::Release => FieldValue::from(self.release.as_str()),
            BuildField::SdkInt => FieldValue::from(self.sdk_int),
            BuildField::SecurityPatch => FieldValue::from(self.security_patch.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PropsError;

    #[test]
    fn test_text_fields_stringify() {
        let mut identity = BuildIdentity::default();
        identity
            .set_field(BuildField::Model, &FieldValue::from("Pixel 5a"))
            .unwrap();
        identity
            .set_field(BuildField::Release, &FieldValue::from(14))
            .unwrap();
        assert_eq!(identity.model, "Pixel 5a");
        assert_eq!(identity.release, "14");
    }

    #[test]
    fn test_integer_fields_parse_text() {
        let mut identity = BuildIdentity::default();
        identity
            .set_field(BuildField::SdkInt, &FieldValue::from("34"))
            .unwrap();
        identity
            .set_field(BuildField::Time, &FieldValue::from(1_707_000_000_000))
            .unwrap();
        assert_eq!(identity.sdk_int, 34);
        assert_eq!(identity.field(BuildField::Time), FieldValue::from(1_707_000_000_000));
    }

    #[test]
    fn test_failed_coercion_leaves_field_untouched() {
        let mut identity = BuildIdentity {
            sdk_int: 33,
            ..Default::default()
        };
        let err = identity
            .set_field(BuildField::SdkInt, &FieldValue::from("fourteen"))
            .unwrap_err();
        assert!(matches!(err, PropsError::TypeCoercion { .. }));
        assert_eq!(identity.sdk_int, 33);
    }

    #[test]
    fn test_every_field_is_writable() {
        let mut identity = BuildIdentity::default();
        for field in BuildField::ALL {
            identity.set_field(field, &FieldValue::from("7")).unwrap();
            assert_eq!(identity.field(field).to_text(), "7");
        }
    }
}
