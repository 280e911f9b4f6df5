//! Analytics event aggregation
//!
//! Maps heterogeneous UI-originated signals into uniform tracked events and
//! hands them to an injected sink. The mapping is pure: no field drops, no
//! input mutation, and optional attributes that were never known are omitted
//! rather than serialized as nulls. Delivery is fire-and-forget and
//! at-most-once per signal; the sink decides whether to log, buffer, or
//! forward to a third-party pipeline.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Primitive attribute value carried by a tracked event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

/// Flat mapping of attribute name to primitive value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventAttributes(BTreeMap<String, AttrValue>);

impl EventAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, consuming and returning the builder.
    pub fn set(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    /// Set an attribute only when the value is known. Unknown optionals are
    /// omitted entirely; the sink never sees placeholders.
    pub fn set_opt(mut self, name: &str, value: Option<impl Into<AttrValue>>) -> Self {
        if let Some(value) = value {
            self.0.insert(name.to_string(), value.into());
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.0.iter()
    }
}

/// Normalized analytics record: underscore-namespaced name, flat attributes,
/// and the timestamp at which the signal was aggregated. Immutable after
/// construction and forwarded at-most-once to the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedEvent {
    pub name: String,
    pub attributes: EventAttributes,
    pub timestamp: DateTime<Utc>,
}

impl TrackedEvent {
    /// Pure aggregation: `(name, attributes) → TrackedEvent` at a given
    /// instant. No I/O, no mutation of the inputs.
    pub fn normalize(name: &str, attributes: EventAttributes, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            attributes,
            timestamp,
        }
    }
}

/// Destination for tracked events. Delivery guarantees, batching, and retry
/// are the sink's concern; the core fires and forgets.
pub trait EventSink {
    fn deliver(&mut self, event: TrackedEvent);
}

/// Sink that buffers events in memory. Useful for tests and for hosts that
/// batch-forward on their own schedule.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub events: Vec<TrackedEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for MemorySink {
    fn deliver(&mut self, event: TrackedEvent) {
        self.events.push(event);
    }
}

/// Shared handle so a host can keep inspecting a sink it handed to a
/// [`Tracker`]. The scheduling model is single-threaded, so `Rc<RefCell<_>>`
/// suffices.
impl EventSink for std::rc::Rc<std::cell::RefCell<MemorySink>> {
    fn deliver(&mut self, event: TrackedEvent) {
        self.borrow_mut().deliver(event);
    }
}

/// Sink that writes one JSON object per line. Write failures are logged and
/// swallowed; analytics must never break an interaction.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn deliver(&mut self, event: TrackedEvent) {
        match serde_json::to_string(&event) {
            Ok(line) => {
                if let Err(e) = writeln!(self.writer, "{line}") {
                    log::warn!("tracking: dropped event {}: {e}", event.name);
                }
            }
            Err(e) => log::warn!("tracking: failed to serialize {}: {e}", event.name),
        }
    }
}

/// Aggregator front end: owns the sink and a session id for provenance.
pub struct Tracker {
    session_id: Uuid,
    sink: Box<dyn EventSink>,
}

impl Tracker {
    pub fn new(sink: Box<dyn EventSink>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            sink,
        }
    }

    pub fn with_session_id(sink: Box<dyn EventSink>, session_id: Uuid) -> Self {
        Self { session_id, sink }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Normalize and forward one event.
    pub fn track(&mut self, name: &str, attributes: EventAttributes) {
        let event = TrackedEvent::normalize(name, attributes, Utc::now());
        self.sink.deliver(event);
    }
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unknown_optionals_are_omitted_not_null() {
        let attrs = EventAttributes::new()
            .set("service_id", "find-us")
            .set_opt("attorney_name", None::<&str>)
            .set_opt("specialty", Some("Elder Law"));

        assert_eq!(attrs.len(), 2);
        assert!(!attrs.contains("attorney_name"));

        let event = TrackedEvent::normalize("service_navigation", attrs, Utc::now());
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("attorney_name"));
        assert!(!json.contains("null"));
    }

    #[test]
    fn attribute_values_serialize_as_bare_primitives() {
        let attrs = EventAttributes::new()
            .set("is_flipped", true)
            .set("scroll_position", 412.5)
            .set("source", "attorney_card_flip");

        let value = serde_json::to_value(&attrs).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "is_flipped": true,
                "scroll_position": 412.5,
                "source": "attorney_card_flip",
            })
        );
    }

    #[test]
    fn normalize_is_pure_and_complete() {
        let attrs = EventAttributes::new()
            .set("phone_number", "5035550123")
            .set("source", "navbar");
        let now = Utc::now();

        let event = TrackedEvent::normalize("phone_call_attempted", attrs.clone(), now);
        assert_eq!(event.name, "phone_call_attempted");
        assert_eq!(event.attributes, attrs);
        assert_eq!(event.timestamp, now);
    }

    #[test]
    fn tracker_forwards_each_event_once() {
        let sink = std::rc::Rc::new(std::cell::RefCell::new(MemorySink::new()));
        let mut tracker = Tracker::new(Box::new(sink.clone()));

        tracker.track("scroll_to_top_used", EventAttributes::new());
        tracker.track(
            "floating_call_button_clicked",
            EventAttributes::new().set("phone_number", "5035550123"),
        );

        let events = &sink.borrow().events;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "scroll_to_top_used");
        assert_eq!(events[1].name, "floating_call_button_clicked");
    }

    #[test]
    fn json_lines_sink_writes_ndjson() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.deliver(TrackedEvent::normalize(
            "attorney_card_flipped",
            EventAttributes::new().set("is_flipped", true),
            Utc::now(),
        ));
        sink.deliver(TrackedEvent::normalize(
            "attorney_card_flipped",
            EventAttributes::new().set("is_flipped", false),
            Utc::now(),
        ));

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["name"], "attorney_card_flipped");
        }
    }
}
