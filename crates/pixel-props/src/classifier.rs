//! Caller classification
//!
//! Boolean facts about the calling process, derived once from its package and
//! process names. Every later decision reads these facts and nothing else
//! about the caller's identity.

use serde::{Deserialize, Serialize};

use crate::config::PolicyConfig;

/// Classified caller identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerContext {
    pub package_name: String,
    pub process_name: String,
    pub is_tablet: bool,
    /// Package or process mentions `google`
    pub is_google: bool,
    /// Package or process mentions `samsung`
    pub is_samsung: bool,
    /// Exactly Google Play services
    pub is_gms: bool,
    /// Exactly the Play Store
    pub is_finsky: bool,
    pub is_setup_wizard: bool,
}

impl CallerContext {
    /// Record the device shape observed for this process.
    pub fn with_tablet(mut self, is_tablet: bool) -> Self {
        self.is_tablet = is_tablet;
        self
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Derives [`CallerContext`] values.
#[derive(Debug, Clone)]
pub struct CallerClassifier {
    gms_package: String,
    finsky_package: String,
    setup_wizard_package: String,
}

impl CallerClassifier {
    pub fn new(config: &PolicyConfig) -> Self {
        Self {
            gms_package: config.gms_package.clone(),
            finsky_package: config.finsky_package.clone(),
            setup_wizard_package: config.setup_wizard_package.clone(),
        }
    }

    /// Classify a caller.
    ///
    /// Returns `None` when either name is missing or empty; such callers get
    /// no further processing.
    pub fn classify(&self, package: Option<&str>, process: Option<&str>) -> Option<CallerContext> {
        let package = package.filter(|p| !p.is_empty())?;
        let process = process.filter(|p| !p.is_empty())?;

        Some(CallerContext {
            package_name: package.to_string(),
            process_name: process.to_string(),
            is_tablet: false,
            is_google: contains_ignore_case(package, "google")
                || contains_ignore_case(process, "google"),
            is_samsung: contains_ignore_case(package, "samsung")
                || contains_ignore_case(process, "samsung"),
            is_gms: package == self.gms_package,
            is_finsky: package == self.finsky_package,
            is_setup_wizard: package == self.setup_wizard_package,
        })
    }
}

impl Default for CallerClassifier {
    fn default() -> Self {
        Self::new(&PolicyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(package: &str, process: &str) -> CallerContext {
        CallerClassifier::default()
            .classify(Some(package), Some(process))
            .unwrap()
    }

    #[test]
    fn test_missing_names_short_circuit() {
        let classifier = CallerClassifier::default();
        assert!(classifier.classify(None, Some("proc")).is_none());
        assert!(classifier.classify(Some("pkg"), None).is_none());
        assert!(classifier.classify(Some(""), Some("proc")).is_none());
        assert!(classifier.classify(Some("pkg"), Some("")).is_none());
    }

    #[test]
    fn test_vendor_substrings_ignore_case() {
        let ctx = classify("com.Google.android.apps.photos", "com.Google.android.apps.photos");
        assert!(ctx.is_google);
        assert!(!ctx.is_samsung);

        let ctx = classify("com.sec.android.app.camera", "com.SAMSUNG.camera:remote");
        assert!(ctx.is_samsung);
        assert!(!ctx.is_google);
    }

    #[test]
    fn test_exact_package_matches() {
        let ctx = classify("com.google.android.gms", "com.google.android.gms.unstable");
        assert!(ctx.is_gms);
        assert!(ctx.is_google);
        assert!(!ctx.is_finsky);

        // process names never make a caller gms
        let ctx = classify("com.google.android.gms.policy", "com.google.android.gms");
        assert!(!ctx.is_gms);

        assert!(classify("com.android.vending", "com.android.vending").is_finsky);
        assert!(classify("com.google.android.setupwizard", "setup").is_setup_wizard);
    }

    #[test]
    fn test_with_tablet() {
        let ctx = classify("com.android.chrome", "com.android.chrome").with_tablet(true);
        assert!(ctx.is_tablet);
    }
}
