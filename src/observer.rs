//! Region intersection observation
//!
//! A [`RegionObserver`] watches one reference region and reports transitions
//! of its intersecting state against the viewport, with a visibility-ratio
//! threshold and a bottom root margin. Re-evaluations that do not cross the
//! threshold are deduplicated, so a consumer sees each transition exactly
//! once regardless of how often geometry is polled.

use crate::dom::{DomQuery, ElementHandle, Rect};

/// Observation parameters.
#[derive(Debug, Clone, Copy)]
pub struct IntersectionOptions {
    /// Fraction of the target area that must be inside the root to count as
    /// intersecting.
    pub threshold: f64,
    /// Adjustment to the root's bottom edge in pixels. Negative values shrink
    /// the root, so a region must be further inside the viewport to count.
    pub root_margin_bottom: f64,
}

impl Default for IntersectionOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin_bottom: 0.0,
        }
    }
}

/// Tracks the intersecting state of a single observed region.
#[derive(Debug)]
pub struct RegionObserver {
    options: IntersectionOptions,
    target: Option<ElementHandle>,
    last_intersecting: Option<bool>,
}

impl RegionObserver {
    pub fn new(options: IntersectionOptions) -> Self {
        Self {
            options,
            target: None,
            last_intersecting: None,
        }
    }

    /// Begin observing a region. Replaces any previous target and resets the
    /// transition state, so the next evaluation always reports.
    pub fn observe(&mut self, target: ElementHandle) {
        self.target = Some(target);
        self.last_intersecting = None;
    }

    pub fn is_observing(&self) -> bool {
        self.target.is_some()
    }

    /// Stop observing. Idempotent: safe to call when never connected or
    /// already disconnected.
    pub fn disconnect(&mut self) {
        self.target = None;
        self.last_intersecting = None;
    }

    /// Re-evaluate against current geometry. Returns `Some(is_intersecting)`
    /// only when the state changed (or on the first evaluation), mirroring
    /// the initial callback an intersection observer delivers on `observe`.
    pub fn evaluate(&mut self, dom: &dyn DomQuery) -> Option<bool> {
        let target = self.target?;
        if !dom.is_connected(target) {
            return None;
        }
        let rect = dom.bounding_rect(target)?;

        let mut root = dom.viewport_rect();
        root.height = (root.height + self.options.root_margin_bottom).max(0.0);

        let intersecting = Self::intersects(&root, &rect, self.options.threshold);
        if self.last_intersecting == Some(intersecting) {
            return None;
        }
        self.last_intersecting = Some(intersecting);
        Some(intersecting)
    }

    fn intersects(root: &Rect, target: &Rect, threshold: f64) -> bool {
        let overlap = match root.intersect(target) {
            Some(overlap) => overlap,
            None => return false,
        };
        if target.area() <= 0.0 {
            // Zero-area targets intersect whenever they overlap at all.
            return true;
        }
        overlap.area() / target.area() >= threshold
    }
}
