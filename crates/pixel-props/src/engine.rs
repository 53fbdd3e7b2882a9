//! Props engine
//!
//! Wires classification, selection and application into the per-process
//! entry point, and answers attestation and permission queries later in the
//! process's life from the classification captured at that entry point.

use std::sync::OnceLock;

use serde::Serialize;
use tracing::{debug, warn};

use crate::applier::{ApplyReport, FieldOverrideApplier};
use crate::attestation::AttestationGuard;
use crate::classifier::{CallerClassifier, CallerContext};
use crate::config::PolicyConfig;
use crate::error::Result;
use crate::host::{CallStackProvider, Clock, DeviceShape, FeatureFlags, PackageResolver};
use crate::profile::ProfileRegistry;
use crate::selector::{ProfileSelector, Selection};
use crate::sink::IdentitySink;

/// Per-process classification, written once.
///
/// Reads after a successful write observe the complete classification.
#[derive(Debug, Default)]
pub struct ProcessState {
    caller: OnceLock<CallerContext>,
}

impl ProcessState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classification of this process, once available.
    pub fn caller(&self) -> Option<&CallerContext> {
        self.caller.get()
    }

    /// Store the classification. Returns `false` if one was already stored.
    fn record(&self, ctx: CallerContext) -> bool {
        self.caller.set(ctx).is_ok()
    }
}

/// Host services consulted while setting props.
#[derive(Clone, Copy)]
pub struct HostServices<'a> {
    pub shape: &'a dyn DeviceShape,
    pub flags: &'a dyn FeatureFlags,
    pub clock: &'a dyn Clock,
}

/// Result of the per-process entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropsOutcome {
    pub selection: Selection,
    pub report: ApplyReport,
}

/// Identity spoofing policy, built once at startup.
#[derive(Debug, Clone)]
pub struct PropsEngine {
    classifier: CallerClassifier,
    selector: ProfileSelector,
    applier: FieldOverrideApplier,
    guard: AttestationGuard,
    registry: ProfileRegistry,
    photos_legacy_flag: String,
}

impl PropsEngine {
    pub fn new(config: &PolicyConfig) -> Self {
        Self {
            classifier: CallerClassifier::new(config),
            selector: ProfileSelector::new(config),
            applier: FieldOverrideApplier::new(config),
            guard: AttestationGuard::new(config),
            registry: ProfileRegistry::from_definitions(&config.profiles),
            photos_legacy_flag: config.photos_legacy_flag.clone(),
        }
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    /// Per-process entry point.
    ///
    /// Normalizes build type and tags unconditionally, then classifies the
    /// caller, records the classification in `state` and applies the
    /// selected profile. Returns `None` when the caller could not be
    /// classified or the process was already classified.
    pub fn set_props(
        &self,
        state: &ProcessState,
        package: Option<&str>,
        process: Option<&str>,
        host: HostServices<'_>,
        sink: &mut dyn IdentitySink,
    ) -> Option<PropsOutcome> {
        let mut report = self.applier.apply_generic(sink);

        let Some(ctx) = self.classifier.classify(package, process) else {
            debug!(?package, ?process, "Caller without package or process name");
            return None;
        };
        let is_tablet = host.shape.is_tablet();
        let ctx = ctx.with_tablet(is_tablet);

        if !state.record(ctx.clone()) {
            warn!(
                package = ctx.package_name.as_str(),
                "Process already classified, ignoring repeated entry"
            );
            return None;
        }

        let photos_legacy = host
            .flags
            .get_boolean_flag(&self.photos_legacy_flag)
            .unwrap_or(false);
        let selection = self.selector.select(&ctx, is_tablet, photos_legacy);

        if selection.stamp_time {
            report.merge(self.applier.stamp_time(host.clock.now_millis(), sink));
        }
        if let Some(kind) = selection.profile {
            let profile = self.registry.get(kind);
            report.merge(self.applier.apply_profile(profile, &ctx.package_name, sink));
        }

        Some(PropsOutcome { selection, report })
    }

    /// Gate a key attestation certificate chain request against the live
    /// call stack.
    ///
    /// # Errors
    ///
    /// [`PropsError::AttestationBlocked`](crate::PropsError::AttestationBlocked)
    /// for the Play Store and for Play services' integrity checker.
    pub fn on_engine_get_certificate_chain(
        &self,
        state: &ProcessState,
        stack: &dyn CallStackProvider,
    ) -> Result<()> {
        match state.caller() {
            Some(ctx) => self.guard.check(ctx, &stack.current_call_stack()),
            None => Ok(()),
        }
    }

    pub fn should_bypass_task_permission(
        &self,
        calling_uid: u32,
        resolver: &dyn PackageResolver,
    ) -> bool {
        self.guard.should_bypass_permission(calling_uid, resolver)
    }
}

impl Default for PropsEngine {
    fn default() -> Self {
        Self::new(&PolicyConfig::default())
    }
}
