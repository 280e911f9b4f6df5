//! Floating control visibility state machine
//!
//! Derives two orthogonal booleans for the floating scroll-to-top control:
//! *visible* (the hero region has left the viewport) and *pinned* (the footer
//! region has entered it). The two axes are driven by independent observers
//! whose callbacks can arrive in any order or overlap, so they are modeled as
//! separate booleans rather than a four-state enum.
//!
//! Observer installation is deferred to the next render opportunity because
//! the reference regions may not exist in the document at construction time.
//! A region that is never found leaves its axis permanently at the initial
//! value; the control simply never appears, which is an accepted degraded
//! mode.

use serde::Serialize;

use crate::dom::DomQuery;
use crate::matcher::Matcher;
use crate::observer::{IntersectionOptions, RegionObserver};
use crate::schedule::{DeferredTask, TaskQueue};

/// Intersection threshold shared by both reference-region observers.
pub const REGION_THRESHOLD: f64 = 0.1;

/// Bottom root margin shared by both reference-region observers.
pub const REGION_ROOT_MARGIN_BOTTOM: f64 = -50.0;

/// The two orthogonal visibility axes. *pinned* takes visual precedence (it
/// repositions the control) but neither implies nor excludes *visible*.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VisibilityState {
    pub visible: bool,
    pub pinned: bool,
}

/// State machine driving a floating control's visibility from viewport
/// intersection signals.
#[derive(Debug)]
pub struct VisibilityMachine {
    state: VisibilityState,
    hero: RegionObserver,
    footer: RegionObserver,
    installed: bool,
    disconnected: bool,
}

impl Default for VisibilityMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibilityMachine {
    pub fn new() -> Self {
        let options = IntersectionOptions {
            threshold: REGION_THRESHOLD,
            root_margin_bottom: REGION_ROOT_MARGIN_BOTTOM,
        };
        Self {
            state: VisibilityState::default(),
            hero: RegionObserver::new(options),
            footer: RegionObserver::new(options),
            installed: false,
            disconnected: false,
        }
    }

    pub fn state(&self) -> VisibilityState {
        self.state
    }

    /// Queue observer installation for the next render opportunity.
    pub fn connect(&mut self, queue: &mut TaskQueue) {
        if self.disconnected || self.installed {
            return;
        }
        queue.defer_to_frame(DeferredTask::InstallVisibilityObservers);
    }

    /// Resolve the reference regions and start observing them, then deliver
    /// the initial intersection evaluation. Idempotent.
    pub fn install(&mut self, dom: &dyn DomQuery) {
        if self.disconnected || self.installed {
            return;
        }
        self.installed = true;

        match Matcher::new().class("hero-section").first_match(dom) {
            Some(hero) => self.hero.observe(hero),
            None => log::debug!("visibility: hero region not found; control stays hidden"),
        }
        match Matcher::new().tag("footer").first_match(dom) {
            Some(footer) => self.footer.observe(footer),
            None => log::debug!("visibility: footer region not found; control never pins"),
        }

        self.evaluate(dom);
    }

    /// Re-evaluate both observers against current geometry. The host calls
    /// this on scroll and layout changes.
    pub fn evaluate(&mut self, dom: &dyn DomQuery) {
        if self.disconnected {
            return;
        }
        if let Some(intersecting) = self.hero.evaluate(dom) {
            self.hero_intersection(intersecting);
        }
        if let Some(intersecting) = self.footer.evaluate(dom) {
            self.footer_intersection(intersecting);
        }
    }

    /// Hero-observer callback: the control is visible while the hero is out
    /// of view. Guarded against stale delivery after disconnect.
    pub fn hero_intersection(&mut self, is_intersecting: bool) {
        if self.disconnected {
            return;
        }
        self.state.visible = !is_intersecting;
    }

    /// Footer-observer callback: the control pins while the footer is in
    /// view. Guarded against stale delivery after disconnect.
    pub fn footer_intersection(&mut self, is_intersecting: bool) {
        if self.disconnected {
            return;
        }
        self.state.pinned = is_intersecting;
    }

    /// Disconnect both observers. Idempotent; after this no callback,
    /// stale or live, can mutate the state.
    pub fn disconnect(&mut self) {
        self.hero.disconnect();
        self.footer.disconnect();
        self.disconnected = true;
    }
}
