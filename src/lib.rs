//! Flow Interact - Scroll-navigation and analytics interaction core
//!
//! Flow Interact turns raw page signals into navigation actions and uniform
//! analytics events through a deterministic path: signal classification →
//! geometry resolution → host actions → event aggregation.
//!
//! ## Modules
//!
//! - **Geometry Resolver**: Navbar-aware scroll offsets for section navigation
//! - **Visibility Machine**: Intersection-driven state for floating controls
//! - **Event Router**: Single delegated dispatch path classifying every click
//! - **Analytics Aggregator**: Pure signal-to-event mapping with pluggable sinks
//! - **Page Controller**: Per-page orchestration of the pieces above
//!
//! The core never touches a real document: hosts implement the [`dom`]
//! collaborator traits, and the bundled [`page::PageModel`] implements them
//! in memory for tests and offline replay.

pub mod attorneys;
pub mod controller;
pub mod dom;
pub mod error;
pub mod geometry;
pub mod matcher;
pub mod observer;
pub mod page;
pub mod router;
pub mod schedule;
pub mod signal;
pub mod tracking;
pub mod visibility;

pub use controller::PageController;
pub use error::InteractError;

// Host collaborator exports
pub use dom::{CardHost, DomActions, DomQuery, ElementHandle, Rect, ScrollBehavior};
pub use page::PageModel;

// Geometry and visibility exports
pub use geometry::{resolve_scroll_target, NavBarMetrics, ScrollTarget};
pub use visibility::{VisibilityMachine, VisibilityState};

// Signal and tracking exports
pub use router::{classify_click, dispatch, ClickClass, DispatchOutcome};
pub use signal::Signal;
pub use tracking::{EventAttributes, EventSink, JsonLinesSink, MemorySink, TrackedEvent, Tracker};

/// Engine version embedded in diagnostic output
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for diagnostic output
pub const PRODUCER_NAME: &str = "flow-interact";
