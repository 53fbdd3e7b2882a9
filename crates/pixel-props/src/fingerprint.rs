//! Build fingerprint parsing.
//!
//! A fingerprint has the shape
//! ```text
//! brand/product/device:release/build-id/incremental:type/tags
//! ```
//! Both parsers are total: a fingerprint that does not carry the wanted part
//! yields an empty string rather than an error.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Build id such as `UQ1A.240205.004` or `QP1A.191005.007.A3`, as a whole
/// `/`-delimited segment so a dotted release like `8.1.0` never matches.
static BUILD_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/([A-Za-z0-9]+\.[0-9]+\.[0-9]+(?:\.[A-Za-z0-9_]+)?)(?:/|$)")
        .expect("build id pattern is valid")
});

/// Extract the build id from a fingerprint.
///
/// Returns the first matching segment, or `""` when the fingerprint carries
/// none.
pub fn parse_build_id(fingerprint: &str) -> String {
    match BUILD_ID.captures(fingerprint).and_then(|c| c.get(1)) {
        Some(m) => m.as_str().to_string(),
        None => {
            debug!(fingerprint, "No build id in fingerprint");
            String::new()
        }
    }
}

/// Extract the device name: the second `/`-separated segment.
pub fn parse_device_name(fingerprint: &str) -> String {
    fingerprint
        .split('/')
        .nth(1)
        .unwrap_or_default()
        .to_string()
}
