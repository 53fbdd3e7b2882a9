//! Field override application
//!
//! Writes profile fields into an [`IdentitySink`]. Each write is independent:
//! a failed write is logged and recorded in the [`ApplyReport`], and the
//! remaining fields are still written.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::PolicyConfig;
use crate::field::{BuildField, FieldValue};
use crate::membership::KeepRules;
use crate::profile::IdentityProfile;
use crate::sink::IdentitySink;

/// What happened to each field during one application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub written: Vec<BuildField>,
    /// Skipped because of a keep rule
    pub kept: Vec<BuildField>,
    pub failed: Vec<BuildField>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub(crate) fn merge(&mut self, other: ApplyReport) {
        self.written.extend(other.written);
        self.kept.extend(other.kept);
        self.failed.extend(other.failed);
    }
}

/// Applies generic normalization and spoof profiles.
#[derive(Debug, Clone)]
pub struct FieldOverrideApplier {
    keep_rules: KeepRules,
    indexer_package: String,
}

impl FieldOverrideApplier {
    pub fn new(config: &PolicyConfig) -> Self {
        Self {
            keep_rules: KeepRules::from_config(config),
            indexer_package: config.indexer_package.clone(),
        }
    }

    /// Release build type and tags, applied to every process.
    pub fn apply_generic(&self, sink: &mut dyn IdentitySink) -> ApplyReport {
        let mut report = ApplyReport::default();
        write(sink, BuildField::Type, &FieldValue::from("user"), &mut report);
        write(sink, BuildField::Tags, &FieldValue::from("release-keys"), &mut report);
        report
    }

    /// Apply `profile` on behalf of `package`, honoring its keep rules.
    ///
    /// The settings indexer always ends up with the genuine incremental as
    /// its fingerprint, whatever the profile wrote.
    pub fn apply_profile(
        &self,
        profile: &IdentityProfile,
        package: &str,
        sink: &mut dyn IdentitySink,
    ) -> ApplyReport {
        let genuine_incremental = sink.field(BuildField::Incremental);
        let mut report = ApplyReport::default();

        debug!(package, profile = profile.name(), "Defining props");
        for (field, value) in profile.fields() {
            if self.keep_rules.keeps(package, field) {
                debug!(package, %field, "Keeping genuine prop");
                report.kept.push(field);
                continue;
            }
            write(sink, field, value, &mut report);
        }

        if package == self.indexer_package {
            let mut fix = ApplyReport::default();
            write(sink, BuildField::Fingerprint, &genuine_incremental, &mut fix);
            report.merge(fix);
        }
        report
    }

    /// Write the current time into the build time field. Keep rules do not
    /// apply.
    pub fn stamp_time(&self, millis: i64, sink: &mut dyn IdentitySink) -> ApplyReport {
        let mut report = ApplyReport::default();
        write(sink, BuildField::Time, &FieldValue::from(millis), &mut report);
        report
    }
}

impl Default for FieldOverrideApplier {
    fn default() -> Self {
        Self::new(&PolicyConfig::default())
    }
}

fn write(sink: &mut dyn IdentitySink, field: BuildField, value: &FieldValue, report: &mut ApplyReport) {
    match sink.set_field(field, value) {
        Ok(()) => report.written.push(field),
        Err(e) => {
            warn!(%field, error = %e, "Failed to set prop");
            report.failed.push(field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfileDefinition;
    use crate::profile::{ProfileKind, ProfileRegistry};
    use crate::sink::BuildIdentity;

    fn genuine() -> BuildIdentity {
        BuildIdentity {
            brand: "oneplus".into(),
            model: "CPH2449".into(),
            fingerprint: "OnePlus/CPH2449/OP594DL1:14/UKQ1.230924.001/T.1:user/release-keys".into(),
            build_type: "userdebug".into(),
            tags: "test-keys".into(),
            incremental: "T.18d1b2e".into(),
            sdk_int: 34,
            ..Default::default()
        }
    }

    #[test]
    fn test_generic_normalization() {
        let mut identity = genuine();
        let report = FieldOverrideApplier::default().apply_generic(&mut identity);
        assert_eq!(identity.build_type, "user");
        assert_eq!(identity.tags, "release-keys");
        assert_eq!(identity.brand, "oneplus");
        assert_eq!(report.written, vec![BuildField::Type, BuildField::Tags]);
    }

    #[test]
    fn test_apply_profile() {
        let registry = ProfileRegistry::default();
        let mut identity = genuine();
        let report = FieldOverrideApplier::default().apply_profile(
            registry.get(ProfileKind::RecentFlagship),
            "com.google.android.apps.bard",
            &mut identity,
        );

        assert_eq!(identity.brand, "google");
        assert_eq!(identity.model, "Pixel 8 Pro");
        assert_eq!(identity.device, "husky");
        assert_eq!(identity.id, "UQ1A.240205.004");
        assert_eq!(
            identity.fingerprint,
            "google/husky/husky:14/UQ1A.240205.004/11269751:user/release-keys"
        );
        assert_eq!(identity.incremental, "T.18d1b2e");
        assert_eq!(report.written.len(), 9);
        assert!(report.kept.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn test_indexer_gets_genuine_incremental() {
        let registry = ProfileRegistry::default();
        let mut identity = genuine();
        let report = FieldOverrideApplier::default().apply_profile(
            registry.get(ProfileKind::Baseline),
            "com.google.android.settings.intelligence",
            &mut identity,
        );

        assert_eq!(identity.fingerprint, "T.18d1b2e");
        assert_eq!(identity.model, "Pixel 5a");
        assert_eq!(identity.device, "barbet");
        assert_eq!(report.kept, vec![BuildField::Fingerprint]);
        assert_eq!(report.written.last(), Some(&BuildField::Fingerprint));
    }

    #[test]
    fn test_keep_rules_only_affect_their_package() {
        let mut config = PolicyConfig::default();
        config
            .props_to_keep
            .insert("org.example".into(), vec!["MODEL".into()]);
        let applier = FieldOverrideApplier::new(&config);
        let registry = ProfileRegistry::default();

        let mut kept = genuine();
        applier.apply_profile(registry.get(ProfileKind::Baseline), "org.example", &mut kept);
        assert_eq!(kept.model, "CPH2449");
        assert_eq!(kept.brand, "google");

        let mut changed = genuine();
        applier.apply_profile(registry.get(ProfileKind::Baseline), "org.other", &mut changed);
        assert_eq!(changed.model, "Pixel 5a");
    }

    #[test]
    fn test_failed_field_does_not_abort() {
        let mut definition = ProfileDefinition::new(
            "Pixel 5a",
            "google/barbet/barbet:14/UQ1A.240205.002/11224170:user/release-keys",
        );
        definition.extra.insert("SDK_INT".into(), "fourteen".into());
        let profile = IdentityProfile::from_definition(&definition);

        let mut identity = genuine();
        let report = FieldOverrideApplier::default().apply_profile(&profile, "org.example", &mut identity);

        assert_eq!(report.failed, vec![BuildField::SdkInt]);
        assert_eq!(identity.sdk_int, 34);
        assert_eq!(identity.model, "Pixel 5a");
        assert_eq!(identity.tags, "release-keys");
    }

    #[test]
    fn test_apply_twice_is_idempotent() {
        let registry = ProfileRegistry::default();
        let applier = FieldOverrideApplier::default();
        let profile = registry.get(ProfileKind::Tablet);

        let mut once = genuine();
        applier.apply_profile(profile, "com.google.android.apps.maps", &mut once);
        let mut twice = once.clone();
        applier.apply_profile(profile, "com.google.android.apps.maps", &mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_stamp_time_ignores_keep_rules() {
        let mut config = PolicyConfig::default();
        config
            .props_to_keep
            .insert("com.google.android.gms".into(), vec!["TIME".into()]);
        let applier = FieldOverrideApplier::new(&config);

        let mut identity = genuine();
        applier.stamp_time(1_707_000_000_000, &mut identity);
        assert_eq!(identity.time, 1_707_000_000_000);
    }
}
