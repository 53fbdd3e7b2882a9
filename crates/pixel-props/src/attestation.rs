//! Key attestation gate
//!
//! Refuses certificate chain requests from the Play Store, and from Play
//! services while its integrity checker is on the stack. The verdict is
//! computed on every call against the live stack; nothing is cached.

use tracing::{debug, info};

use crate::classifier::CallerContext;
use crate::config::PolicyConfig;
use crate::error::{PropsError, Result};
use crate::host::{PackageResolver, StackFrame};

/// Attestation gate and task permission bypass.
#[derive(Debug, Clone)]
pub struct AttestationGuard {
    integrity_marker: String,
    bypass_marker: String,
}

impl AttestationGuard {
    pub fn new(config: &PolicyConfig) -> Self {
        Self {
            integrity_marker: config.integrity_marker.to_lowercase(),
            bypass_marker: config.bypass_marker.to_lowercase(),
        }
    }

    /// Play services with the integrity checker among `frames`.
    pub fn is_integrity_caller(&self, ctx: &CallerContext, frames: &[StackFrame]) -> bool {
        ctx.is_gms
            && frames.iter().any(|frame| {
                frame
                    .component_name
                    .to_lowercase()
                    .contains(self.integrity_marker.as_str())
            })
    }

    pub fn is_blocked(&self, ctx: &CallerContext, frames: &[StackFrame]) -> bool {
        ctx.is_finsky || self.is_integrity_caller(ctx, frames)
    }

    /// Gate a certificate chain request.
    ///
    /// # Errors
    ///
    /// [`PropsError::AttestationBlocked`] when the caller must not attest.
    pub fn check(&self, ctx: &CallerContext, frames: &[StackFrame]) -> Result<()> {
        if self.is_blocked(ctx, frames) {
            info!(
                is_gms = ctx.is_gms,
                is_finsky = ctx.is_finsky,
                "Blocked key attestation"
            );
            return Err(PropsError::AttestationBlocked {
                is_gms: ctx.is_gms,
                is_finsky: ctx.is_finsky,
            });
        }
        Ok(())
    }

    /// Whether the calling uid belongs to a Google package and may skip the
    /// task management permission. Unresolvable uids never bypass.
    pub fn should_bypass_permission(&self, calling_uid: u32, resolver: &dyn PackageResolver) -> bool {
        let package = resolver.resolve_package(calling_uid);
        debug!(calling_uid, calling_package = ?package, "Checking task permission bypass");
        package.is_some_and(|p| p.to_lowercase().contains(self.bypass_marker.as_str()))
    }
}

impl Default for AttestationGuard {
    fn default() -> Self {
        Self::new(&PolicyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::CallerClassifier;
    use std::collections::HashMap;

    struct UidTable(HashMap<u32, String>);

    impl PackageResolver for UidTable {
        fn resolve_package(&self, uid: u32) -> Option<String> {
            self.0.get(&uid).cloned()
        }
    }

    fn ctx(package: &str, process: &str) -> CallerContext {
        CallerClassifier::default()
            .classify(Some(package), Some(process))
            .unwrap()
    }

    fn stack(names: &[&str]) -> Vec<StackFrame> {
        names.iter().map(|n| StackFrame::new(*n)).collect()
    }

    #[test]
    fn test_finsky_always_blocked() {
        let guard = AttestationGuard::default();
        let finsky = ctx("com.android.vending", "com.android.vending");
        assert!(guard.is_blocked(&finsky, &[]));

        let mut both = finsky.clone();
        both.is_gms = true;
        assert!(guard.is_blocked(&both, &[]));
    }

    #[test]
    fn test_gms_blocked_only_with_integrity_frame() {
        let guard = AttestationGuard::default();
        let gms = ctx("com.google.android.gms", "com.google.android.gms.unstable");

        let frames = stack(&[
            "android.security.keystore2.AndroidKeyStoreSpi",
            "com.google.android.gms.DroidGuard.Runtime",
        ]);
        assert!(guard.is_blocked(&gms, &frames));
        assert!(!guard.is_blocked(&gms, &stack(&["com.google.android.gms.auth.Account"])));
        assert!(!guard.is_blocked(&gms, &[]));
    }

    #[test]
    fn test_integrity_frame_without_gms_is_allowed() {
        let guard = AttestationGuard::default();
        let other = ctx("com.example.bank", "com.example.bank");
        assert!(guard.check(&other, &stack(&["droidguard"])).is_ok());
    }

    #[test]
    fn test_check_surfaces_blocked_error() {
        let guard = AttestationGuard::default();
        let err = guard
            .check(&ctx("com.android.vending", "com.android.vending"), &[])
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(
            err,
            PropsError::AttestationBlocked {
                is_gms: false,
                is_finsky: true
            }
        ));
    }

    #[test]
    fn test_permission_bypass() {
        let guard = AttestationGuard::default();
        let resolver = UidTable(HashMap::from([
            (10_100, "com.Google.android.gms".to_string()),
            (10_200, "com.example.launcher".to_string()),
        ]));
        assert!(guard.should_bypass_permission(10_100, &resolver));
        assert!(!guard.should_bypass_permission(10_200, &resolver));
        assert!(!guard.should_bypass_permission(10_300, &resolver));
    }
}
