//! Policy configuration
//!
//! Every package id, membership list and profile definition the policy
//! consults. The defaults reproduce the stock policy; a TOML file may
//! override any subset of keys.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PropsError, Result};

/// Source definition of a spoof profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDefinition {
    /// Marketing model name, e.g. `Pixel 8 Pro`
    pub model: String,
    /// Full build fingerprint the profile reports
    pub fingerprint: String,
    /// Additional field overrides by field name
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl ProfileDefinition {
    pub fn new(model: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            fingerprint: fingerprint.into(),
            extra: BTreeMap::new(),
        }
    }
}

/// The four profile definitions, one per profile kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDefinitions {
    #[serde(default = "default_recent_flagship")]
    pub recent_flagship: ProfileDefinition,
    #[serde(default = "default_tablet")]
    pub tablet: ProfileDefinition,
    #[serde(default = "default_baseline")]
    pub baseline: ProfileDefinition,
    #[serde(default = "default_legacy")]
    pub legacy: ProfileDefinition,
}

impl Default for ProfileDefinitions {
    fn default() -> Self {
        Self {
            recent_flagship: default_recent_flagship(),
            tablet: default_tablet(),
            baseline: default_baseline(),
            legacy: default_legacy(),
        }
    }
}

/// Complete policy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Google Play services
    #[serde(default = "default_gms_package")]
    pub gms_package: String,
    /// Play Store
    #[serde(default = "default_finsky_package")]
    pub finsky_package: String,
    #[serde(default = "default_setup_wizard_package")]
    pub setup_wizard_package: String,
    #[serde(default = "default_photos_package")]
    pub photos_package: String,
    /// Settings search indexer, which needs the genuine fingerprint
    #[serde(default = "default_indexer_package")]
    pub indexer_package: String,

    /// Packages and processes never spoofed
    #[serde(default = "default_packages_to_keep")]
    pub packages_to_keep: Vec<String>,
    /// Packages and processes that always get the recent flagship profile
    #[serde(default = "default_packages_to_change_recent_pixel")]
    pub packages_to_change_recent_pixel: Vec<String>,
    /// Non-Google packages that are spoofed anyway
    #[serde(default = "default_extra_packages_to_change")]
    pub extra_packages_to_change: Vec<String>,
    /// Camera apps outside the stock camera namespace
    #[serde(default = "default_custom_google_camera_packages")]
    pub custom_google_camera_packages: Vec<String>,
    #[serde(default = "default_google_camera_prefix")]
    pub google_camera_prefix: String,

    /// Per-package fields left at their genuine value
    #[serde(default = "default_props_to_keep")]
    pub props_to_keep: BTreeMap<String, Vec<String>>,

    /// Play services process name fragments that force the baseline profile
    #[serde(default = "default_gms_spoof_process_markers")]
    pub gms_spoof_process_markers: Vec<String>,
    /// Stack frame fragment identifying the integrity checker
    #[serde(default = "default_integrity_marker")]
    pub integrity_marker: String,
    /// Calling package fragment that bypasses the task permission
    #[serde(default = "default_bypass_marker")]
    pub bypass_marker: String,
    /// Flag choosing the legacy profile for the photos app
    #[serde(default = "default_photos_legacy_flag")]
    pub photos_legacy_flag: String,

    #[serde(default)]
    pub profiles: ProfileDefinitions,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            gms_package: default_gms_package(),
            finsky_package: default_finsky_package(),
            setup_wizard_package: default_setup_wizard_package(),
            photos_package: default_photos_package(),
            indexer_package: default_indexer_package(),
            packages_to_keep: default_packages_to_keep(),
            packages_to_change_recent_pixel: default_packages_to_change_recent_pixel(),
            extra_packages_to_change: default_extra_packages_to_change(),
            custom_google_camera_packages: default_custom_google_camera_packages(),
            google_camera_prefix: default_google_camera_prefix(),
            props_to_keep: default_props_to_keep(),
            gms_spoof_process_markers: default_gms_spoof_process_markers(),
            integrity_marker: default_integrity_marker(),
            bypass_marker: default_bypass_marker(),
            photos_legacy_flag: default_photos_legacy_flag(),
            profiles: ProfileDefinitions::default(),
        }
    }
}

impl PolicyConfig {
    /// Parse a configuration from TOML. Absent keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PropsError::Config(e.to_string()))
    }

    /// Load configuration from a file, falling back to defaults when there
    /// is no path or the file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(path)?;
                let config = Self::from_toml_str(&contents)?;
                debug!(path = %path.display(), "Loaded props policy configuration");
                Ok(config)
            }
            _ => Ok(Self::default()),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_gms_package() -> String {
    "com.google.android.gms".into()
}

fn default_finsky_package() -> String {
    "com.android.vending".into()
}

fn default_setup_wizard_package() -> String {
    "com.google.android.setupwizard".into()
}

fn default_photos_package() -> String {
    "com.google.android.apps.photos".into()
}

fn default_indexer_package() -> String {
    "com.google.android.settings.intelligence".into()
}

fn default_packages_to_keep() -> Vec<String> {
    strings(&[
        "com.google.android.as",
        "com.google.android.apps.motionsense.bridge",
        "com.google.android.euicc",
        "com.google.ar.core",
        "com.google.android.youtube",
        "com.google.android.apps.youtube.kids",
        "com.google.android.apps.youtube.music",
        "com.google.android.apps.wearables.maestro.companion",
        "com.google.android.apps.subscriptions.red",
        "com.google.android.apps.tachyon",
        "com.google.android.apps.tycho",
        "com.google.android.apps.restore",
        "com.google.oslo",
        "it.ingdirect.app",
    ])
}

fn default_packages_to_change_recent_pixel() -> Vec<String> {
    strings(&[
        "com.google.android.apps.emojiwallpaper",
        "com.google.android.wallpaper.effects",
        "com.google.pixel.livewallpaper",
        "com.google.android.apps.wallpaper.pixel",
        "com.google.android.apps.wallpaper",
        "com.google.android.apps.bard",
        "com.google.android.apps.customization.pixel",
        "com.google.android.apps.privacy.wildlife",
        "com.google.android.apps.subscriptions.red",
        "com.google.android.gms",
        "com.google.android.googlequicksearchbox",
    ])
}

fn default_extra_packages_to_change() -> Vec<String> {
    strings(&[
        "com.android.chrome",
        "com.breel.wallpapers20",
        "com.microsoft.android.smsorganizer",
        "com.nothing.smartcenter",
        "com.nhs.online.nhsonline",
        "com.amazon.avod.thirdpartyclient",
        "com.disney.disneyplus",
        "com.netflix.mediaclient",
        "in.startv.hotstar",
        "jp.id_credit_sp2.android",
    ])
}

fn default_custom_google_camera_packages() -> Vec<String> {
    strings(&[
        "com.google.android.MTCL83",
        "com.google.android.UltraCVM",
        "com.google.android.apps.cameralite",
    ])
}

fn default_google_camera_prefix() -> String {
    "com.google.android.GoogleCamera".into()
}

fn default_props_to_keep() -> BTreeMap<String, Vec<String>> {
    let mut keep = BTreeMap::new();
    keep.insert(default_indexer_package(), strings(&["FINGERPRINT"]));
    keep
}

fn default_gms_spoof_process_markers() -> Vec<String> {
    strings(&["ui", "gservice", "gapps", "learning", "search", "persistent"])
}

fn default_integrity_marker() -> String {
    "droidguard".into()
}

fn default_bypass_marker() -> String {
    "google".into()
}

fn default_photos_legacy_flag() -> String {
    "config_GPhotosSpoofPixelXL".into()
}

fn default_recent_flagship() -> ProfileDefinition {
    ProfileDefinition::new(
        "Pixel 8 Pro",
        "google/husky/husky:14/UQ1A.240205.004/11269751:user/release-keys",
    )
}

fn default_tablet() -> ProfileDefinition {
    ProfileDefinition::new(
        "Pixel Tablet",
        "google/tangorpro/tangorpro:14/UQ1A.240205.002/11224170:user/release-keys",
    )
}

fn default_baseline() -> ProfileDefinition {
    ProfileDefinition::new(
        "Pixel 5a",
        "google/barbet/barbet:14/UQ1A.240205.002/11224170:user/release-keys",
    )
}

fn default_legacy() -> ProfileDefinition {
    ProfileDefinition::new(
        "Pixel XL",
        "google/marlin/marlin:10/QP1A.191005.007.A3/5972272:user/release-keys",
    )
}
