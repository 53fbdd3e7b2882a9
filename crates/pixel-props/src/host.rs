//! Host collaborators.
//!
//! The policy consumes these; hosts provide them.

use serde::{Deserialize, Serialize};

/// Reports whether the device is tablet shaped.
pub trait DeviceShape {
    fn is_tablet(&self) -> bool;
}

/// Boolean feature toggle store.
pub trait FeatureFlags {
    /// Look up a flag. `None` when the store has no value for it.
    fn get_boolean_flag(&self, name: &str) -> Option<bool>;
}

/// Maps a uid to its package name.
pub trait PackageResolver {
    fn resolve_package(&self, uid: u32) -> Option<String>;
}

/// One frame of the current thread's call stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    /// Class or component that owns the frame
    pub component_name: String,
}

impl StackFrame {
    pub fn new(component_name: impl Into<String>) -> Self {
        Self {
            component_name: component_name.into(),
        }
    }
}

/// Live call stack of the calling thread, innermost frame first.
pub trait CallStackProvider {
    fn current_call_stack(&self) -> Vec<StackFrame>;
}

/// Source of the build time stamp.
pub trait Clock {
    fn now_millis(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Screen size bucket of the current configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenLayoutSize {
    Undefined,
    Small,
    Normal,
    Large,
    XLarge,
}

/// Densities treated as tablet densities.
const TABLET_DENSITIES: [u32; 3] = [320, 480, 640];

/// Display configuration of the host, used as a tablet heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenConfiguration {
    pub layout_size: ScreenLayoutSize,
    pub density_dpi: u32,
}

impl DeviceShape for ScreenConfiguration {
    /// Large screens, or xhdpi/xxhdpi/xxxhdpi displays.
    fn is_tablet(&self) -> bool {
        self.layout_size >= ScreenLayoutSize::Large || TABLET_DENSITIES.contains(&self.density_dpi)
    }
}

/// A host without a display context is not a tablet.
impl<T: DeviceShape> DeviceShape for Option<T> {
    fn is_tablet(&self) -> bool {
        self.as_ref().is_some_and(|shape| shape.is_tablet())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen(layout_size: ScreenLayoutSize, density_dpi: u32) -> ScreenConfiguration {
        ScreenConfiguration {
            layout_size,
            density_dpi,
        }
    }

    #[test]
    fn test_tablet_heuristic() {
        assert!(screen(ScreenLayoutSize::Large, 240).is_tablet());
        assert!(screen(ScreenLayoutSize::XLarge, 160).is_tablet());
        assert!(screen(ScreenLayoutSize::Normal, 320).is_tablet());
        assert!(screen(ScreenLayoutSize::Normal, 480).is_tablet());
        assert!(screen(ScreenLayoutSize::Normal, 640).is_tablet());
        assert!(!screen(ScreenLayoutSize::Normal, 420).is_tablet());
        assert!(!screen(ScreenLayoutSize::Small, 160).is_tablet());
    }

    #[test]
    fn test_missing_host_is_not_tablet() {
        let none: Option<ScreenConfiguration> = None;
        assert!(!none.is_tablet());
        assert!(Some(screen(ScreenLayoutSize::Large, 160)).is_tablet());
    }

    #[test]
    fn test_system_clock_is_after_2024() {
        assert!(SystemClock.now_millis() > 1_704_067_200_000);
    }
}
