//! Host platform surface: device metrics and font readiness
//!
//! The capture pipeline needs two environmental facts the document model
//! cannot answer: the device the preview is shown on (viewport + pixel
//! ratio, which drives the mobile capture branch and the raster scale) and
//! whether fonts have settled. Both sit behind a trait so tests can emulate
//! any device deterministically.

use std::sync::Mutex;

/// Mobile breakpoint in px; at or below this width the mobile capture
/// branch is taken.
pub const MOBILE_BREAKPOINT: u32 = 768;

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceMetrics {
    pub width: u32,
    pub height: u32,
    pub dpr: f32,
    pub touch: bool,
}

impl DeviceMetrics {
    pub fn is_mobile(&self) -> bool {
        self.width <= MOBILE_BREAKPOINT
    }
}

impl Default for DeviceMetrics {
    fn default() -> Self {
        DeviceMetrics { width: 1280, height: 720, dpr: 1.0, touch: false }
    }
}

pub trait Platform: Send + Sync {
    fn set_metrics(&self, m: DeviceMetrics);
    fn metrics(&self) -> DeviceMetrics;

    /// Whether the environment reports fonts as loaded. Defaults to true
    /// for hosts that expose no such signal.
    fn fonts_ready(&self) -> bool {
        true
    }
}

/// Mutex-backed platform with fixed, test-controllable metrics
pub struct FixedPlatform {
    metrics: Mutex<DeviceMetrics>,
}

impl FixedPlatform {
    pub fn new() -> Self {
        FixedPlatform { metrics: Mutex::new(DeviceMetrics::default()) }
    }

    pub fn with_metrics(m: DeviceMetrics) -> Self {
        FixedPlatform { metrics: Mutex::new(m) }
    }

    /// A phone-sized preset used by tests and the CLI's --mobile flag
    pub fn mobile() -> Self {
        Self::with_metrics(DeviceMetrics { width: 375, height: 667, dpr: 2.0, touch: true })
    }
}

impl Default for FixedPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for FixedPlatform {
    fn set_metrics(&self, m: DeviceMetrics) {
        let mut g = self.metrics.lock().unwrap();
        *g = m;
    }

    fn metrics(&self) -> DeviceMetrics {
        self.metrics.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_platform_metrics_can_be_updated() {
        let p = FixedPlatform::new();
        assert_eq!(p.metrics().width, 1280);
        assert!(!p.metrics().is_mobile());
        p.set_metrics(DeviceMetrics { width: 375, height: 667, dpr: 3.0, touch: true });
        let m = p.metrics();
        assert!(m.is_mobile());
        assert_eq!(m.dpr, 3.0);
        assert!(p.fonts_ready());
    }

    #[test]
    fn breakpoint_is_inclusive() {
        let m = DeviceMetrics { width: MOBILE_BREAKPOINT, ..Default::default() };
        assert!(m.is_mobile());
    }
}
