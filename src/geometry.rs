//! Scroll geometry resolution
//!
//! Computes the absolute scroll offset for a navigation target, accounting
//! for a fixed-position navigation bar whose height varies with the page and
//! viewport. Nothing here is cached: navbar height and viewport width can
//! change between requests, so every resolution recomputes from the live
//! oracle.

use serde::Serialize;

use crate::dom::DomQuery;
use crate::error::InteractError;
use crate::matcher::Matcher;

/// Height substituted when no navigation landmark is found.
pub const NAVBAR_FALLBACK_HEIGHT: f64 = 80.0;

/// Viewport width at which the wide padding tier starts.
pub const WIDE_VIEWPORT_MIN_WIDTH: f64 = 768.0;

/// Extra padding below the navbar on wide viewports.
pub const PADDING_WIDE: f64 = 40.0;

/// Extra padding below the navbar on narrow viewports.
pub const PADDING_NARROW: f64 = 20.0;

/// Resolved scroll destination for one navigation request.
#[derive(Debug, Clone, Serialize)]
pub struct ScrollTarget {
    /// Identifier the request named.
    pub id: String,
    /// Raw arithmetic offset. May be negative; the host clamps if needed.
    pub offset: f64,
    /// Padding tier applied for the current viewport width.
    pub padding: f64,
}

/// Navigation bar measurements at the moment of a request.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NavBarMetrics {
    pub height: f64,
    /// False when the fallback height was substituted.
    pub found: bool,
}

/// Measure the navigation bar, trying candidate landmarks in priority order:
/// the dedicated nav component, then a `nav` landmark, then a `header`
/// landmark. Pages without any (isolated harnesses, stripped-down variants)
/// get the fallback height with no error.
pub fn navbar_metrics(dom: &dyn DomQuery) -> NavBarMetrics {
    let candidates = [
        Matcher::new().tag("flow-navbar"),
        Matcher::new().tag("nav"),
        Matcher::new().tag("header"),
    ];

    for matcher in &candidates {
        if let Some(el) = matcher.first_match(dom) {
            if let Some(rect) = dom.bounding_rect(el) {
                return NavBarMetrics {
                    height: rect.height,
                    found: true,
                };
            }
        }
    }

    NavBarMetrics {
        height: NAVBAR_FALLBACK_HEIGHT,
        found: false,
    }
}

/// Padding tier for the current viewport width. Wide screens get extra room
/// so the target's top border stays visible under the navbar shadow.
pub fn extra_padding(viewport_width: f64) -> f64 {
    if viewport_width >= WIDE_VIEWPORT_MIN_WIDTH {
        PADDING_WIDE
    } else {
        PADDING_NARROW
    }
}

/// Resolve a target identifier to a scroll offset.
///
/// Absolute top = current scroll position + the element's viewport-relative
/// top; final offset = absolute top − navbar height − padding tier. The
/// result is not clamped.
pub fn resolve_scroll_target(
    dom: &dyn DomQuery,
    target_id: &str,
) -> Result<ScrollTarget, InteractError> {
    let element = dom
        .element_by_id(target_id)
        .ok_or_else(|| InteractError::TargetNotFound(target_id.to_string()))?;
    let rect = dom
        .bounding_rect(element)
        .ok_or_else(|| InteractError::TargetNotFound(target_id.to_string()))?;

    let absolute_top = rect.top() + dom.scroll_y();
    let navbar = navbar_metrics(dom);
    let (viewport_width, _) = dom.viewport_size();
    let padding = extra_padding(viewport_width);

    Ok(ScrollTarget {
        id: target_id.to_string(),
        offset: absolute_top - navbar.height - padding,
        padding,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Rect;
    use crate::page::PageModel;

    fn page_with_navbar(viewport_width: f64, navbar_tag: Option<&str>) -> PageModel {
        let mut page = PageModel::new(viewport_width, 800.0);
        if let Some(tag) = navbar_tag {
            page.element(tag)
                .rect(Rect::new(0.0, 0.0, viewport_width, 64.0))
                .insert();
        }
        page.element("section")
            .id("find-us")
            .rect(Rect::new(0.0, 1200.0, viewport_width, 400.0))
            .insert();
        page
    }

    #[test]
    fn padding_is_40_at_and_above_768() {
        assert_eq!(extra_padding(768.0), PADDING_WIDE);
        assert_eq!(extra_padding(1920.0), PADDING_WIDE);
    }

    #[test]
    fn padding_is_20_below_768() {
        assert_eq!(extra_padding(767.9), PADDING_NARROW);
        assert_eq!(extra_padding(320.0), PADDING_NARROW);
    }

    #[test]
    fn offset_uses_measured_navbar_height() {
        let page = page_with_navbar(1024.0, Some("flow-navbar"));
        let target = resolve_scroll_target(&page, "find-us").unwrap();

        // absolute top 1200 - navbar 64 - wide padding 40
        assert_eq!(target.offset, 1096.0);
        assert_eq!(target.padding, PADDING_WIDE);
    }

    #[test]
    fn navbar_priority_prefers_dedicated_component() {
        let mut page = PageModel::new(1024.0, 800.0);
        page.element("header")
            .rect(Rect::new(0.0, 0.0, 1024.0, 120.0))
            .insert();
        page.element("flow-navbar")
            .rect(Rect::new(0.0, 0.0, 1024.0, 64.0))
            .insert();

        let metrics = navbar_metrics(&page);
        assert!(metrics.found);
        assert_eq!(metrics.height, 64.0);
    }

    #[test]
    fn missing_navbar_falls_back_to_80() {
        let page = page_with_navbar(375.0, None);
        let metrics = navbar_metrics(&page);

        assert!(!metrics.found);
        assert_eq!(metrics.height, NAVBAR_FALLBACK_HEIGHT);

        let target = resolve_scroll_target(&page, "find-us").unwrap();
        // absolute top 1200 - fallback 80 - narrow padding 20
        assert_eq!(target.offset, 1100.0);
    }

    #[test]
    fn scrolled_page_accounts_for_current_position() {
        let mut page = page_with_navbar(1024.0, Some("nav"));
        page.set_scroll_y(500.0);

        // bounding rect is viewport-relative, so the absolute top is stable
        let target = resolve_scroll_target(&page, "find-us").unwrap();
        assert_eq!(target.offset, 1200.0 - 64.0 - 40.0);
    }

    #[test]
    fn unknown_target_is_an_error() {
        let page = page_with_navbar(1024.0, Some("nav"));
        let err = resolve_scroll_target(&page, "no-such-section").unwrap_err();
        assert!(matches!(err, InteractError::TargetNotFound(id) if id == "no-such-section"));
    }

    #[test]
    fn offset_near_document_top_may_be_negative() {
        let mut page = PageModel::new(1024.0, 800.0);
        page.element("nav")
            .rect(Rect::new(0.0, 0.0, 1024.0, 64.0))
            .insert();
        page.element("section")
            .id("top-section")
            .rect(Rect::new(0.0, 30.0, 1024.0, 200.0))
            .insert();

        let target = resolve_scroll_target(&page, "top-section").unwrap();
        assert_eq!(target.offset, 30.0 - 64.0 - 40.0);
        assert!(target.offset < 0.0);
    }
}
