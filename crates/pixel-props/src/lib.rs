//! # pixel-props
//!
//! Per-process build identity spoofing policy.
//!
//! Selected applications observe a Google device identity (brand, device,
//! fingerprint and friends) instead of the real one, and key attestation is
//! refused to integrity-verification callers.
//!
//! ## Flow
//!
//! 1. [`PropsEngine`] is built once from a [`PolicyConfig`]; this builds the
//!    [`ProfileRegistry`] of named [`IdentityProfile`]s.
//! 2. On each process's first entry point, [`PropsEngine::set_props`]
//!    normalizes build type and tags, classifies the caller
//!    ([`CallerClassifier`]), records the [`CallerContext`] in a
//!    [`ProcessState`], runs the [`ProfileSelector`] decision table and writes
//!    the chosen profile through the [`FieldOverrideApplier`] into an
//!    [`IdentitySink`].
//! 3. Later, [`PropsEngine::on_engine_get_certificate_chain`] consults the
//!    [`AttestationGuard`] with the recorded classification and the live call
//!    stack, failing with [`PropsError::AttestationBlocked`] when the caller
//!    must not attest.
//!
//! ## Example
//!
//! ```rust
//! use pixel_props::{
//!     BuildIdentity, HostServices, ProcessState, PropsEngine, ScreenConfiguration,
//!     ScreenLayoutSize, SystemClock, FeatureFlags,
//! };
//!
//! struct Flags;
//!
//! impl FeatureFlags for Flags {
//!     fn get_boolean_flag(&self, _name: &str) -> Option<bool> {
//!         Some(false)
//!     }
//! }
//!
//! let engine = PropsEngine::default();
//! let state = ProcessState::new();
//! let screen = ScreenConfiguration {
//!     layout_size: ScreenLayoutSize::Normal,
//!     density_dpi: 420,
//! };
//! let host = HostServices {
//!     shape: &screen,
//!     flags: &Flags,
//!     clock: &SystemClock,
//! };
//!
//! let mut identity = BuildIdentity::default();
//! let package = "com.google.android.apps.maps";
//! engine.set_props(&state, Some(package), Some(package), host, &mut identity);
//!
//! assert_eq!(identity.model, "Pixel 5a");
//! assert_eq!(identity.tags, "release-keys");
//! ```

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod applier;
pub mod attestation;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod field;
pub mod fingerprint;
pub mod host;
pub mod membership;
pub mod profile;
pub mod selector;
pub mod sink;

pub use applier::{ApplyReport, FieldOverrideApplier};
pub use attestation::AttestationGuard;
pub use classifier::{CallerClassifier, CallerContext};
pub use config::{PolicyConfig, ProfileDefinition, ProfileDefinitions};
pub use engine::{HostServices, ProcessState, PropsEngine, PropsOutcome};
pub use error::{PropsError, Result};
pub use field::{BuildField, FieldKind, FieldValue};
pub use fingerprint::{parse_build_id, parse_device_name};
pub use host::{
    CallStackProvider, Clock, DeviceShape, FeatureFlags, PackageResolver, ScreenConfiguration,
    ScreenLayoutSize, StackFrame, SystemClock,
};
pub use membership::{KeepRules, MembershipSets};
pub use profile::{build_profile, IdentityProfile, ProfileKind, ProfileRegistry};
pub use selector::{ProfileSelector, Selection, SelectionRule};
pub use sink::{BuildIdentity, IdentitySink};
