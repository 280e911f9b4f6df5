//! Page controller
//!
//! Orchestrates the interaction layer for one page: populates attorney card
//! components, wires the visibility machine, routes signals, and executes
//! deferred work when the host reaches a frame boundary or advances its
//! clock. One controller per page; initialization is guarded so a host that
//! wires its lifecycle callbacks twice cannot double-attach.

use crate::attorneys;
use crate::dom::{CardHost, DomActions, DomQuery};
use crate::matcher::Matcher;
use crate::router::{self, DispatchOutcome};
use crate::schedule::{DeferredTask, TaskQueue, RELAYOUT_DELAY_MS};
use crate::signal::Signal;
use crate::tracking::Tracker;
use crate::visibility::{VisibilityMachine, VisibilityState};

/// Controller for one page's interaction layer.
pub struct PageController {
    tracker: Tracker,
    queue: TaskQueue,
    visibility: VisibilityMachine,
    listeners_attached: bool,
    relayout_workaround: bool,
}

impl PageController {
    pub fn new(tracker: Tracker) -> Self {
        Self {
            tracker,
            queue: TaskQueue::new(),
            visibility: VisibilityMachine::new(),
            listeners_attached: false,
            relayout_workaround: true,
        }
    }

    /// Disable the one-shot service-highlights re-layout. The re-layout
    /// papers over hosts that size the highlights region before web fonts
    /// settle; hosts without that problem can switch it off.
    pub fn set_relayout_workaround(&mut self, enabled: bool) {
        self.relayout_workaround = enabled;
    }

    pub fn visibility(&self) -> VisibilityState {
        self.visibility.state()
    }

    /// Attach the controller to a page: populate attorney cards, connect the
    /// visibility machine, and schedule the re-layout workaround. A second
    /// call on the same controller is a logged no-op.
    pub fn initialize<P: DomQuery + CardHost>(&mut self, page: &mut P, now_ms: u64) {
        if self.listeners_attached {
            log::warn!("controller: already initialized, ignoring");
            return;
        }
        self.listeners_attached = true;

        self.populate_cards(page);
        self.visibility.connect(&mut self.queue);

        if self.relayout_workaround {
            self.queue.defer_after(
                DeferredTask::RefreshServiceHighlights,
                now_ms,
                RELAYOUT_DELAY_MS,
            );
        }
    }

    fn populate_cards<P: DomQuery + CardHost>(&mut self, page: &mut P) {
        let matcher = Matcher::new().tag("flow-attorney-card");
        let cards: Vec<_> = page
            .document_order()
            .into_iter()
            .filter(|&el| matcher.matches(&*page, el))
            .collect();

        for card in cards {
            let name = match page.attribute(card, "name") {
                Some(name) => name,
                None => continue,
            };
            match attorneys::lookup(&name) {
                Some(record) => page.populate(card, record),
                // An unlisted name renders an empty card, never an error.
                None => log::debug!("controller: no directory record for {name:?}"),
            }
        }
    }

    /// Route one signal through the dispatcher.
    pub fn handle_signal<P: DomQuery + DomActions>(
        &mut self,
        page: &mut P,
        now_ms: u64,
        signal: &Signal,
    ) -> DispatchOutcome {
        router::dispatch(page, &mut self.queue, &mut self.tracker, now_ms, signal)
    }

    /// Run work deferred to the next render opportunity.
    pub fn on_frame(&mut self, dom: &dyn DomQuery) {
        for task in self.queue.take_frame_tasks() {
            if let DeferredTask::InstallVisibilityObservers = task {
                self.visibility.install(dom);
            }
        }
    }

    /// Run timers due at `now_ms`. A due task whose element has since been
    /// removed falls through as the host's write no-op.
    pub fn on_timers<P: DomQuery + DomActions>(&mut self, page: &mut P, now_ms: u64) {
        for task in self.queue.take_due(now_ms) {
            match task {
                DeferredTask::ClearTagPulse(el) => page.clear_inline_transform(el),
                DeferredTask::ClearHighlightFlash(el) => page.remove_class(el, "highlight-flash"),
                DeferredTask::RefreshServiceHighlights => self.refresh_service_highlights(page),
                DeferredTask::InstallVisibilityObservers => self.visibility.install(&*page),
            }
        }
    }

    fn refresh_service_highlights<P: DomQuery + DomActions>(&mut self, page: &mut P) {
        match Matcher::new().class("service-highlights").first_match(&*page) {
            Some(region) => page.force_reflow(region),
            None => log::debug!("controller: no service-highlights region to refresh"),
        }
    }

    /// Re-evaluate visibility after a scroll or viewport change.
    pub fn on_viewport_change(&mut self, dom: &dyn DomQuery) {
        self.visibility.evaluate(dom);
    }

    /// Detach from the page: disconnect observers and drop pending work.
    /// Stale callbacks delivered afterwards cannot mutate state.
    pub fn teardown(&mut self) {
        self.visibility.disconnect();
        self.queue.clear();
    }
}

impl std::fmt::Debug for PageController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageController")
            .field("listeners_attached", &self.listeners_attached)
            .field("visibility", &self.visibility.state())
            .finish_non_exhaustive()
    }
}
