//! Profile selection
//!
//! The ordered decision table choosing which profile, if any, a classified
//! caller observes:
//!
//! 1. keep-listed package or process: no profile
//! 2. not Google, not Samsung, not an extra package: no profile
//! 3. base choice: recent flagship if listed, else tablet on tablets, else baseline
//! 4. photos app: legacy when the toggle is on, recent flagship otherwise
//! 5. Play services UI/search/persistent processes: baseline, plus a build
//!    time stamp, whatever rules 1-4 decided
//! 6. camera apps left without a profile keep seeing the genuine identity
//!
//! Selection is a pure function of its inputs and yields exactly one
//! [`Selection`] per input.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::CallerContext;
use crate::config::PolicyConfig;
use crate::membership::MembershipSets;
use crate::profile::ProfileKind;

/// Decision table rule that settled a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionRule {
    KeepListed,
    NotTargeted,
    RecentPixelListed,
    Tablet,
    Baseline,
    PhotosLegacy,
    PhotosRecent,
    GmsProcess,
    CameraPassthrough,
}

/// Outcome of profile selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Profile to apply, `None` for no override
    pub profile: Option<ProfileKind>,
    /// Stamp the current time into the build time field
    pub stamp_time: bool,
    pub rule: SelectionRule,
}

impl Selection {
    fn none(rule: SelectionRule) -> Self {
        Self {
            profile: None,
            stamp_time: false,
            rule,
        }
    }

    fn profile(kind: ProfileKind, rule: SelectionRule) -> Self {
        Self {
            profile: Some(kind),
            stamp_time: false,
            rule,
        }
    }

    pub fn is_none(&self) -> bool {
        self.profile.is_none()
    }
}

/// Evaluates the decision table.
#[derive(Debug, Clone)]
pub struct ProfileSelector {
    sets: MembershipSets,
    photos_package: String,
    gms_process_markers: Vec<String>,
}

impl ProfileSelector {
    pub fn new(config: &PolicyConfig) -> Self {
        Self {
            sets: MembershipSets::from_config(config),
            photos_package: config.photos_package.clone(),
            gms_process_markers: config
                .gms_spoof_process_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
        }
    }

    pub fn select(&self, ctx: &CallerContext, is_tablet: bool, photos_legacy: bool) -> Selection {
        let mut selection = if self.is_keep_listed(ctx) {
            Selection::none(SelectionRule::KeepListed)
        } else if !self.is_targeted(ctx) {
            Selection::none(SelectionRule::NotTargeted)
        } else {
            let base = self.base_profile(ctx, is_tablet);
            self.photos_override(ctx, photos_legacy).unwrap_or(base)
        };

        if self.forces_baseline(ctx) {
            selection = Selection {
                profile: Some(ProfileKind::Baseline),
                stamp_time: true,
                rule: SelectionRule::GmsProcess,
            };
        }

        if selection.is_none() && self.sets.is_google_camera(&ctx.package_name) {
            selection = Selection::none(SelectionRule::CameraPassthrough);
        }

        debug!(
            package = ctx.package_name.as_str(),
            process = ctx.process_name.as_str(),
            profile = ?selection.profile,
            rule = ?selection.rule,
            "Selected spoof profile"
        );
        selection
    }

    /// Rule 1
    pub fn is_keep_listed(&self, ctx: &CallerContext) -> bool {
        self.sets.is_kept(&ctx.package_name, &ctx.process_name)
    }

    /// Rule 2, negated: the caller is eligible for a profile.
    pub fn is_targeted(&self, ctx: &CallerContext) -> bool {
        ctx.is_google || ctx.is_samsung || self.sets.is_extra(&ctx.package_name, &ctx.process_name)
    }

    /// Rule 3
    pub fn base_profile(&self, ctx: &CallerContext, is_tablet: bool) -> Selection {
        if self.sets.is_recent_pixel(&ctx.package_name, &ctx.process_name) {
            Selection::profile(ProfileKind::RecentFlagship, SelectionRule::RecentPixelListed)
        } else if is_tablet {
            Selection::profile(ProfileKind::Tablet, SelectionRule::Tablet)
        } else {
            Selection::profile(ProfileKind::Baseline, SelectionRule::Baseline)
        }
    }

    /// Rule 4
    pub fn photos_override(&self, ctx: &CallerContext, photos_legacy: bool) -> Option<Selection> {
        if ctx.package_name != self.photos_package {
            return None;
        }
        Some(if photos_legacy {
            Selection::profile(ProfileKind::Legacy, SelectionRule::PhotosLegacy)
        } else {
            Selection::profile(ProfileKind::RecentFlagship, SelectionRule::PhotosRecent)
        })
    }

    /// Rule 5
    pub fn forces_baseline(&self, ctx: &CallerContext) -> bool {
        if !ctx.is_gms {
            return false;
        }
        let process = ctx.process_name.to_lowercase();
        self.gms_process_markers
            .iter()
            .any(|marker| process.contains(marker.as_str()))
    }
}

impl Default for ProfileSelector {
    fn default() -> Self {
        Self::new(&PolicyConfig::default())
    }
}
