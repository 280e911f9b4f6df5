//! Signal shapes consumed by the event router
//!
//! A signal is any discrete notification delivered to the interaction layer:
//! a bubbled user click, or a structured custom notification emitted by a
//! component. Component details carry everything the router needs; the router
//! normalizes them without re-deriving data already present in the payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dom::ElementHandle;

/// Detail payload of a `card-flip` component signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardFlipDetail {
    /// Attorney name rendered on the card.
    pub name: String,
    pub is_flipped: bool,
    /// Component-side timestamp, when the component provided one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Detail payload of a `specialty-click` signal from within a card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialtyClickDetail {
    pub service_id: String,
    pub specialty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attorney_name: Option<String>,
}

/// Detail payload of a floating call button activation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingCallDetail {
    pub timestamp_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub scroll_position: f64,
}

/// Detail payload of a scroll-to-top activation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollTopDetail {
    pub timestamp_ms: i64,
    pub scroll_position: f64,
}

/// A discrete notification routed through the interaction layer.
#[derive(Debug, Clone)]
pub enum Signal {
    /// A bubbled click whose originating element the router classifies by
    /// ancestor-chain matching.
    Click { target: ElementHandle },
    CardFlip(CardFlipDetail),
    SpecialtyClick(SpecialtyClickDetail),
    FloatingCallClick(FloatingCallDetail),
    ScrollTopClick(ScrollTopDetail),
}
