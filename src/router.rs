//! Delegated signal routing
//!
//! One dispatch path per signal class, attached once at the document level by
//! the page controller. Each click is classified by ancestor-chain matching
//! and routed to exactly one handler; component signals are normalized into
//! tracked events directly from their payloads. Handlers never panic: an
//! uncaught failure here would break every unrelated future click, so failed
//! resolutions are logged and swallowed.

use crate::dom::{DomActions, DomQuery, ElementHandle, ScrollBehavior};
use crate::geometry;
use crate::matcher::Matcher;
use crate::schedule::{DeferredTask, TaskQueue, HIGHLIGHT_FLASH_MS, TAG_PULSE_MS};
use crate::signal::{
    CardFlipDetail, FloatingCallDetail, ScrollTopDetail, Signal, SpecialtyClickDetail,
};
use crate::tracking::{EventAttributes, Tracker};

/// What the host should do with the platform event after dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// A handler path consumed the signal.
    pub handled: bool,
    /// The host must suppress the platform's native action.
    pub default_suppressed: bool,
    /// The host must not let any competing listener see this signal.
    pub propagation_stopped: bool,
}

/// Classification of a bubbled click by its ancestor chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickClass {
    /// A specialty tag carrying a `data-service` identifier.
    SpecialtyTag(ElementHandle),
    /// An anchor link whose target starts with `#`.
    AnchorLink(ElementHandle),
    /// A telephone-protocol link.
    PhoneLink(ElementHandle),
    Unclassified,
}

/// Context accompanying a service navigation request.
#[derive(Debug, Clone, Default)]
pub struct ServiceNavContext {
    pub source: &'static str,
    pub attorney_name: Option<String>,
    pub specialty: Option<String>,
}

/// Classify a click's originating element. The classes are checked most
/// specific first so each click routes to exactly one handler path.
pub fn classify_click(dom: &dyn DomQuery, target: ElementHandle) -> ClickClass {
    if let Some(tag) = Matcher::new()
        .class("specialty-tag")
        .attr_present("data-service")
        .closest(dom, target)
    {
        return ClickClass::SpecialtyTag(tag);
    }
    if let Some(link) = Matcher::new()
        .tag("a")
        .attr_starts_with("href", "#")
        .closest(dom, target)
    {
        return ClickClass::AnchorLink(link);
    }
    if let Some(link) = Matcher::new()
        .tag("a")
        .attr_starts_with("href", "tel:")
        .closest(dom, target)
    {
        return ClickClass::PhoneLink(link);
    }
    ClickClass::Unclassified
}

/// Route one signal. `now_ms` is the host clock used for transient-effect
/// timers.
pub fn dispatch<P: DomQuery + DomActions>(
    page: &mut P,
    queue: &mut TaskQueue,
    tracker: &mut Tracker,
    now_ms: u64,
    signal: &Signal,
) -> DispatchOutcome {
    match signal {
        Signal::Click { target } => match classify_click(&*page, *target) {
            ClickClass::SpecialtyTag(tag) => {
                handle_specialty_tag(page, queue, tracker, now_ms, tag)
            }
            ClickClass::AnchorLink(link) => handle_anchor_link(page, link),
            ClickClass::PhoneLink(link) => handle_phone_link(page, tracker, link),
            ClickClass::Unclassified => DispatchOutcome::default(),
        },
        Signal::CardFlip(detail) => handle_card_flip(tracker, detail),
        Signal::SpecialtyClick(detail) => {
            handle_card_specialty(page, queue, tracker, now_ms, detail)
        }
        Signal::ScrollTopClick(detail) => handle_scroll_top(tracker, detail),
        Signal::FloatingCallClick(detail) => handle_floating_call(tracker, detail),
    }
}

/// Scroll to a service section and emit a `service_navigation` event.
///
/// Returns `false` (after logging) when the identifier resolves to nothing;
/// it must not panic, since it runs inside the document-wide dispatch path.
pub fn scroll_to_service<P: DomQuery + DomActions>(
    page: &mut P,
    queue: &mut TaskQueue,
    tracker: &mut Tracker,
    now_ms: u64,
    service_id: &str,
    context: ServiceNavContext,
) -> bool {
    let target = match geometry::resolve_scroll_target(&*page, service_id) {
        Ok(target) => target,
        Err(e) => {
            log::error!("service navigation failed: {e}");
            return false;
        }
    };

    // Capture the position before the scroll is issued.
    let scroll_position = page.scroll_y();
    page.scroll_to(target.offset, ScrollBehavior::Smooth);

    if let Some(section) = page.element_by_id(service_id) {
        page.add_class(section, "highlight-flash");
        queue.defer_after(
            DeferredTask::ClearHighlightFlash(section),
            now_ms,
            HIGHLIGHT_FLASH_MS,
        );
    }

    let attributes = EventAttributes::new()
        .set("service_id", service_id)
        .set("source", context.source)
        .set("scroll_position", scroll_position)
        .set("target_position", target.offset)
        .set_opt("attorney_name", context.attorney_name)
        .set_opt("specialty", context.specialty);
    tracker.track("service_navigation", attributes);

    true
}

fn handle_specialty_tag<P: DomQuery + DomActions>(
    page: &mut P,
    queue: &mut TaskQueue,
    tracker: &mut Tracker,
    now_ms: u64,
    tag: ElementHandle,
) -> DispatchOutcome {
    // Tags are nested inside cards with their own click semantics; stopping
    // propagation keeps the card handler out of this interaction.
    let outcome = DispatchOutcome {
        handled: true,
        default_suppressed: true,
        propagation_stopped: true,
    };

    // Transient press feedback, reset by a fire-and-forget timer.
    page.set_inline_transform(tag, "scale(0.95)");
    queue.defer_after(DeferredTask::ClearTagPulse(tag), now_ms, TAG_PULSE_MS);

    let service_id = match page.attribute(tag, "data-service") {
        Some(id) => id,
        None => return outcome,
    };

    scroll_to_service(
        page,
        queue,
        tracker,
        now_ms,
        &service_id,
        ServiceNavContext {
            source: "specialty_tag_direct",
            ..ServiceNavContext::default()
        },
    );

    outcome
}

fn handle_anchor_link<P: DomQuery + DomActions>(
    page: &mut P,
    link: ElementHandle,
) -> DispatchOutcome {
    let outcome = DispatchOutcome {
        handled: true,
        default_suppressed: true,
        propagation_stopped: false,
    };

    let href = match page.attribute(link, "href") {
        Some(href) => href,
        None => return outcome,
    };
    let target_id = href.trim_start_matches('#');
    if target_id.is_empty() {
        return outcome;
    }

    match geometry::resolve_scroll_target(&*page, target_id) {
        Ok(target) => page.scroll_to(target.offset, ScrollBehavior::Smooth),
        // Malformed anchors must not crash navigation; ignore them.
        Err(e) => log::debug!("anchor navigation skipped: {e}"),
    }

    outcome
}

fn handle_phone_link<P: DomQuery>(
    page: &P,
    tracker: &mut Tracker,
    link: ElementHandle,
) -> DispatchOutcome {
    // The call itself should still proceed: default stays untouched.
    let outcome = DispatchOutcome {
        handled: true,
        default_suppressed: false,
        propagation_stopped: false,
    };

    let href = match page.attribute(link, "href") {
        Some(href) => href,
        None => return outcome,
    };
    let phone_number = href.trim_start_matches("tel:").to_string();

    let source = if Matcher::new().class("call-button").closest(page, link).is_some() {
        "navbar"
    } else {
        "hero"
    };

    tracker.track(
        "phone_call_attempted",
        EventAttributes::new()
            .set("phone_number", phone_number)
            .set("source", source),
    );

    outcome
}

fn handle_card_flip(tracker: &mut Tracker, detail: &CardFlipDetail) -> DispatchOutcome {
    tracker.track(
        "attorney_card_flipped",
        EventAttributes::new()
            .set("attorney_name", detail.name.clone())
            .set("is_flipped", detail.is_flipped)
            .set_opt("timestamp", detail.timestamp.map(|t| t.to_rfc3339()))
            .set("source", "attorney_card_flip"),
    );
    DispatchOutcome {
        handled: true,
        ..DispatchOutcome::default()
    }
}

fn handle_card_specialty<P: DomQuery + DomActions>(
    page: &mut P,
    queue: &mut TaskQueue,
    tracker: &mut Tracker,
    now_ms: u64,
    detail: &SpecialtyClickDetail,
) -> DispatchOutcome {
    scroll_to_service(
        page,
        queue,
        tracker,
        now_ms,
        &detail.service_id,
        ServiceNavContext {
            source: "attorney_card_specialty",
            attorney_name: detail.attorney_name.clone(),
            specialty: Some(detail.specialty.clone()),
        },
    );
    DispatchOutcome {
        handled: true,
        ..DispatchOutcome::default()
    }
}

fn handle_scroll_top(tracker: &mut Tracker, detail: &ScrollTopDetail) -> DispatchOutcome {
    tracker.track(
        "scroll_to_top_used",
        EventAttributes::new()
            .set("timestamp", detail.timestamp_ms)
            .set("scroll_position", detail.scroll_position)
            .set("source", "scroll_to_top_button"),
    );
    DispatchOutcome {
        handled: true,
        ..DispatchOutcome::default()
    }
}

fn handle_floating_call(tracker: &mut Tracker, detail: &FloatingCallDetail) -> DispatchOutcome {
    tracker.track(
        "floating_call_button_clicked",
        EventAttributes::new()
            .set("timestamp", detail.timestamp_ms)
            .set_opt("phone_number", detail.phone_number.clone())
            .set("scroll_position", detail.scroll_position)
            .set("source", "floating_call_button"),
    );
    DispatchOutcome {
        handled: true,
        ..DispatchOutcome::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Rect;
    use crate::page::PageModel;
    use crate::tracking::{AttrValue, MemorySink, TrackedEvent};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Fixture {
        page: PageModel,
        queue: TaskQueue,
        tracker: Tracker,
        sink: Rc<RefCell<MemorySink>>,
    }

    impl Fixture {
        fn new() -> Self {
            let sink = Rc::new(RefCell::new(MemorySink::new()));
            Self {
                page: PageModel::new(1024.0, 768.0),
                queue: TaskQueue::new(),
                tracker: Tracker::new(Box::new(sink.clone())),
                sink,
            }
        }

        fn dispatch(&mut self, signal: &Signal) -> DispatchOutcome {
            dispatch(&mut self.page, &mut self.queue, &mut self.tracker, 0, signal)
        }

        fn events(&self) -> Vec<TrackedEvent> {
            self.sink.borrow().events.clone()
        }
    }

    /// Navbar (64px), hero, a find-us section at 1200, and room to grow.
    fn marketing_page() -> Fixture {
        let mut fx = Fixture::new();
        fx.page
            .element("flow-navbar")
            .rect(Rect::new(0.0, 0.0, 1024.0, 64.0))
            .insert();
        fx.page
            .element("section")
            .class("hero-section")
            .rect(Rect::new(0.0, 64.0, 1024.0, 500.0))
            .insert();
        fx.page
            .element("section")
            .id("find-us")
            .rect(Rect::new(0.0, 1200.0, 1024.0, 400.0))
            .insert();
        fx
    }

    fn add_specialty_tag(fx: &mut Fixture, service: &str) -> ElementHandle {
        let card = fx
            .page
            .element("flow-attorney-card")
            .attr("name", "Brett S. Carson")
            .insert();
        fx.page
            .element("span")
            .class("specialty-tag")
            .attr("data-service", service)
            .parent(card)
            .insert()
    }

    #[test]
    fn specialty_tag_click_scrolls_pulses_and_tracks() {
        let mut fx = marketing_page();
        let tag = add_specialty_tag(&mut fx, "find-us");

        let outcome = fx.dispatch(&Signal::Click { target: tag });
        assert!(outcome.handled);
        assert!(outcome.default_suppressed);
        assert!(outcome.propagation_stopped);

        // Scroll offset: absolute top 1200 - navbar 64 - wide padding 40.
        let requests = fx.page.scroll_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].top, 1096.0);
        assert_eq!(requests[0].behavior, ScrollBehavior::Smooth);

        // Press feedback applied, reset queued.
        assert_eq!(fx.page.inline_transform(tag).as_deref(), Some("scale(0.95)"));
        assert_eq!(
            fx.queue.take_due(TAG_PULSE_MS),
            vec![DeferredTask::ClearTagPulse(tag)]
        );

        let events = fx.events();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.name, "service_navigation");
        assert_eq!(
            event.attributes.get("service_id"),
            Some(&AttrValue::Text("find-us".into()))
        );
        assert_eq!(
            event.attributes.get("source"),
            Some(&AttrValue::Text("specialty_tag_direct".into()))
        );
        assert_eq!(
            event.attributes.get("scroll_position"),
            Some(&AttrValue::Float(0.0))
        );
        assert_eq!(
            event.attributes.get("target_position"),
            Some(&AttrValue::Float(1096.0))
        );
        assert!(!event.attributes.contains("attorney_name"));
    }

    #[test]
    fn specialty_tag_with_unknown_service_tracks_nothing_and_does_not_scroll() {
        let mut fx = marketing_page();
        let tag = add_specialty_tag(&mut fx, "no-such-service");

        let outcome = fx.dispatch(&Signal::Click { target: tag });
        assert!(outcome.handled);
        assert!(fx.page.scroll_requests().is_empty());
        assert!(fx.events().is_empty());
    }

    #[test]
    fn anchor_click_scrolls_without_tracking() {
        let mut fx = marketing_page();
        let link = fx.page.element("a").attr("href", "#find-us").insert();

        let outcome = fx.dispatch(&Signal::Click { target: link });
        assert!(outcome.handled);
        assert!(outcome.default_suppressed);
        assert!(!outcome.propagation_stopped);

        let requests = fx.page.scroll_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].top, 1096.0);
        assert!(fx.events().is_empty());
    }

    #[test]
    fn anchor_to_missing_target_is_silently_ignored() {
        let mut fx = marketing_page();
        let link = fx.page.element("a").attr("href", "#nowhere").insert();

        let outcome = fx.dispatch(&Signal::Click { target: link });
        assert!(outcome.handled);
        assert!(outcome.default_suppressed);
        assert!(fx.page.scroll_requests().is_empty());
        assert!(fx.events().is_empty());
    }

    #[test]
    fn phone_click_in_call_button_tracks_navbar_source() {
        let mut fx = marketing_page();
        let button = fx.page.element("div").class("call-button").insert();
        let link = fx
            .page
            .element("a")
            .attr("href", "tel:+15035550123")
            .parent(button)
            .insert();

        let outcome = fx.dispatch(&Signal::Click { target: link });
        assert!(outcome.handled);
        assert!(!outcome.default_suppressed);

        let events = fx.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "phone_call_attempted");
        assert_eq!(
            events[0].attributes.get("phone_number"),
            Some(&AttrValue::Text("+15035550123".into()))
        );
        assert_eq!(
            events[0].attributes.get("source"),
            Some(&AttrValue::Text("navbar".into()))
        );
    }

    #[test]
    fn phone_click_elsewhere_tracks_hero_source() {
        let mut fx = marketing_page();
        let link = fx
            .page
            .element("a")
            .attr("href", "tel:5035550123")
            .insert();

        fx.dispatch(&Signal::Click { target: link });
        let events = fx.events();
        assert_eq!(
            events[0].attributes.get("source"),
            Some(&AttrValue::Text("hero".into()))
        );
    }

    #[test]
    fn unclassified_click_is_a_no_op() {
        let mut fx = marketing_page();
        let div = fx.page.element("div").insert();

        let outcome = fx.dispatch(&Signal::Click { target: div });
        assert_eq!(outcome, DispatchOutcome::default());
        assert!(fx.events().is_empty());
    }

    #[test]
    fn two_card_flips_produce_two_events_with_their_own_state() {
        let mut fx = marketing_page();
        for flipped in [true, false] {
            fx.dispatch(&Signal::CardFlip(CardFlipDetail {
                name: "Randall H. Baker".to_string(),
                is_flipped: flipped,
                timestamp: None,
            }));
        }

        let events = fx.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "attorney_card_flipped");
        assert_eq!(
            events[0].attributes.get("is_flipped"),
            Some(&AttrValue::Bool(true))
        );
        assert_eq!(
            events[1].attributes.get("is_flipped"),
            Some(&AttrValue::Bool(false))
        );
        assert!(!events[0].attributes.contains("timestamp"));
    }

    #[test]
    fn card_specialty_click_carries_attorney_context() {
        let mut fx = marketing_page();
        fx.dispatch(&Signal::SpecialtyClick(SpecialtyClickDetail {
            service_id: "find-us".to_string(),
            specialty: "Elder Law".to_string(),
            attorney_name: Some("Brett S. Carson".to_string()),
        }));

        let events = fx.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "service_navigation");
        assert_eq!(
            events[0].attributes.get("source"),
            Some(&AttrValue::Text("attorney_card_specialty".into()))
        );
        assert_eq!(
            events[0].attributes.get("attorney_name"),
            Some(&AttrValue::Text("Brett S. Carson".into()))
        );
        assert_eq!(
            events[0].attributes.get("specialty"),
            Some(&AttrValue::Text("Elder Law".into()))
        );
    }

    #[test]
    fn scroll_top_and_floating_call_signals_normalize_their_payloads() {
        let mut fx = marketing_page();
        fx.dispatch(&Signal::ScrollTopClick(ScrollTopDetail {
            timestamp_ms: 1_700_000_000_000,
            scroll_position: 2400.0,
        }));
        fx.dispatch(&Signal::FloatingCallClick(FloatingCallDetail {
            timestamp_ms: 1_700_000_000_500,
            phone_number: Some("5035550123".to_string()),
            scroll_position: 2500.0,
        }));

        let events = fx.events();
        assert_eq!(events[0].name, "scroll_to_top_used");
        assert_eq!(
            events[0].attributes.get("source"),
            Some(&AttrValue::Text("scroll_to_top_button".into()))
        );
        assert_eq!(events[1].name, "floating_call_button_clicked");
        assert_eq!(
            events[1].attributes.get("phone_number"),
            Some(&AttrValue::Text("5035550123".into()))
        );
    }

    #[test]
    fn service_section_gets_highlight_flash_with_clear_timer() {
        let mut fx = marketing_page();
        let tag = add_specialty_tag(&mut fx, "find-us");
        fx.dispatch(&Signal::Click { target: tag });

        let section = fx.page.element_by_id("find-us").unwrap();
        assert!(fx.page.has_class(section, "highlight-flash"));

        let due = fx.queue.take_due(HIGHLIGHT_FLASH_MS);
        assert!(due.contains(&DeferredTask::ClearHighlightFlash(section)));
    }
}
