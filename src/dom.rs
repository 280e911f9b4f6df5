//! Host page collaborator traits
//!
//! The core never touches a real document. It reads geometry and element
//! structure through [`DomQuery`], issues writes through [`DomActions`], and
//! populates card components through [`CardHost`]. Hosts (a browser bridge,
//! the bundled [`crate::page::PageModel`], a test fixture) implement these.

use serde::{Deserialize, Serialize};

/// Opaque handle to an element owned by the host page.
///
/// Handles stay valid after the element is removed from the document; hosts
/// report removal through [`DomQuery::is_connected`] instead of invalidating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(pub(crate) u64);

impl ElementHandle {
    /// Raw index of the element within the host page.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Overlap with another rect, or `None` when the rects do not intersect.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right > x && bottom > y {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }
}

/// Scroll animation mode requested from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Read surface of the host page.
///
/// Treated as a queryable, synchronous, side-effect-free oracle: element
/// lookup, ancestry, geometry, scroll position, and viewport dimensions.
pub trait DomQuery {
    /// All elements in document order.
    fn document_order(&self) -> Vec<ElementHandle>;

    /// Element with the given `id` attribute, if exactly one exists.
    fn element_by_id(&self, id: &str) -> Option<ElementHandle>;

    /// Lowercased tag name.
    fn tag_name(&self, el: ElementHandle) -> Option<String>;

    fn has_class(&self, el: ElementHandle, class: &str) -> bool;

    fn attribute(&self, el: ElementHandle, name: &str) -> Option<String>;

    fn parent(&self, el: ElementHandle) -> Option<ElementHandle>;

    /// Whether the element is still attached to the document.
    fn is_connected(&self, el: ElementHandle) -> bool;

    /// Bounding rect relative to the current viewport.
    fn bounding_rect(&self, el: ElementHandle) -> Option<Rect>;

    /// Current vertical scroll position.
    fn scroll_y(&self) -> f64;

    /// Viewport dimensions as `(width, height)`.
    fn viewport_size(&self) -> (f64, f64);

    /// Viewport as a rect in viewport coordinates (origin at `0,0`).
    fn viewport_rect(&self) -> Rect {
        let (width, height) = self.viewport_size();
        Rect::new(0.0, 0.0, width, height)
    }
}

/// Write surface of the host page.
///
/// Writes are fire-and-forget: a write against a removed element is a no-op
/// on the host side, never an error surfaced to the core.
pub trait DomActions {
    /// Scroll the viewport to an absolute vertical offset. The offset is the
    /// resolver's raw arithmetic result; the host clamps if its platform
    /// requires a non-negative position.
    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior);

    fn add_class(&mut self, el: ElementHandle, class: &str);

    fn remove_class(&mut self, el: ElementHandle, class: &str);

    /// Set an inline transform for a transient visual effect.
    fn set_inline_transform(&mut self, el: ElementHandle, value: &str);

    /// Clear the inline transform back to the stylesheet value.
    fn clear_inline_transform(&mut self, el: ElementHandle);

    /// Force a synchronous re-layout of one element's subtree.
    fn force_reflow(&mut self, el: ElementHandle);
}

/// Card component population surface.
///
/// Cards expose settable structured fields; the core pushes a record into
/// them and does not define their rendering.
pub trait CardHost {
    fn populate(&mut self, card: ElementHandle, record: &crate::attorneys::AttorneyRecord);
}
