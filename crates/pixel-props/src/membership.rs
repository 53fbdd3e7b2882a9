//! Package membership sets and per-package keep rules.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::warn;

use crate::config::PolicyConfig;
use crate::field::BuildField;

/// Immutable package lists consulted by the selector.
#[derive(Debug, Clone, Default)]
pub struct MembershipSets {
    packages_to_keep: HashSet<String>,
    packages_to_change_recent_pixel: HashSet<String>,
    extra_packages_to_change: HashSet<String>,
    custom_google_camera_packages: HashSet<String>,
    google_camera_prefix: String,
}

fn to_set(items: &[String]) -> HashSet<String> {
    items.iter().cloned().collect()
}

impl MembershipSets {
    pub fn from_config(config: &PolicyConfig) -> Self {
        Self {
            packages_to_keep: to_set(&config.packages_to_keep),
            packages_to_change_recent_pixel: to_set(&config.packages_to_change_recent_pixel),
            extra_packages_to_change: to_set(&config.extra_packages_to_change),
            custom_google_camera_packages: to_set(&config.custom_google_camera_packages),
            google_camera_prefix: config.google_camera_prefix.clone(),
        }
    }

    /// Package or process is exempt from spoofing.
    pub fn is_kept(&self, package: &str, process: &str) -> bool {
        self.packages_to_keep.contains(package) || self.packages_to_keep.contains(process)
    }

    pub fn is_recent_pixel(&self, package: &str, process: &str) -> bool {
        self.packages_to_change_recent_pixel.contains(package)
            || self.packages_to_change_recent_pixel.contains(process)
    }

    pub fn is_extra(&self, package: &str, process: &str) -> bool {
        self.extra_packages_to_change.contains(package)
            || self.extra_packages_to_change.contains(process)
    }

    /// Stock camera namespace (prefix) or one of the known ports.
    pub fn is_google_camera(&self, package: &str) -> bool {
        (!self.google_camera_prefix.is_empty() && package.starts_with(&self.google_camera_prefix))
            || self.custom_google_camera_packages.contains(package)
    }
}

/// Fields each package keeps at their genuine value.
#[derive(Debug, Clone, Default)]
pub struct KeepRules {
    rules: HashMap<String, BTreeSet<BuildField>>,
}

impl KeepRules {
    /// Resolve configured field names. Unknown names are logged and dropped.
    pub fn from_config(config: &PolicyConfig) -> Self {
        let mut rules = HashMap::new();
        for (package, names) in &config.props_to_keep {
            let mut fields = BTreeSet::new();
            for name in names {
                match name.parse::<BuildField>() {
                    Ok(field) => {
                        fields.insert(field);
                    }
                    Err(e) => warn!(package = package.as_str(), error = %e, "Ignoring keep rule"),
                }
            }
            rules.insert(package.clone(), fields);
        }
        Self { rules }
    }

    pub fn keeps(&self, package: &str, field: BuildField) -> bool {
        self.rules
            .get(package)
            .is_some_and(|fields| fields.contains(&field))
    }

    pub fn fields_for(&self, package: &str) -> Option<&BTreeSet<BuildField>> {
        self.rules.get(package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_matches_package_or_process() {
        let sets = MembershipSets::from_config(&PolicyConfig::default());
        assert!(sets.is_kept("com.google.android.youtube", "whatever"));
        assert!(sets.is_kept("whatever", "com.google.oslo"));
        assert!(!sets.is_kept("com.google.android.apps.photos", "com.google.android.apps.photos"));
        assert!(sets.is_recent_pixel("com.google.android.gms", "com.google.android.gms.ui"));
        assert!(sets.is_extra("com.netflix.mediaclient", "com.netflix.mediaclient"));
    }

    #[test]
    fn test_google_camera_detection() {
        let sets = MembershipSets::from_config(&PolicyConfig::default());
        assert!(sets.is_google_camera("com.google.android.GoogleCamera"));
        assert!(sets.is_google_camera("com.google.android.GoogleCameraEng"));
        assert!(sets.is_google_camera("com.google.android.MTCL83"));
        assert!(!sets.is_google_camera("com.google.android.googlecamera"));
        assert!(!sets.is_google_camera("com.android.camera2"));
    }

    #[test]
    fn test_keep_rules() {
        let mut config = PolicyConfig::default();
        config
            .props_to_keep
            .insert("org.example".into(), vec!["MODEL".into(), "SERIAL".into()]);
        let rules = KeepRules::from_config(&config);

        assert!(rules.keeps("com.google.android.settings.intelligence", BuildField::Fingerprint));
        assert!(!rules.keeps("com.google.android.settings.intelligence", BuildField::Model));
        assert!(rules.keeps("org.example", BuildField::Model));
        assert_eq!(rules.fields_for("org.example").map(|f| f.len()), Some(1));
        assert!(!rules.keeps("com.google.android.gms", BuildField::Fingerprint));
    }
}
