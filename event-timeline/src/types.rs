//! Core types for the event timeline library
//!
//! This module defines the channel model, event values and the error type
//! shared by the store, the reconciliation pass and the renderer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the synthetic row that closes every timeline
pub const END_CHANNEL: &str = "END";

/// Result type for store operations
pub type Result<T> = std::result::Result<T, TimelineError>;

/// Errors raised by the store API
///
/// All of these are caller errors: the rejected operation leaves the store
/// exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimelineError {
    #[error("Channel already exists: {0}")]
    DuplicateChannel(String),

    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    #[error("Invalid channel kind {kind:?} (expected \"state\" or \"trigger\")")]
    InvalidChannelKind { kind: String },

    #[error("Channel name {0:?} is reserved")]
    ReservedChannelName(String),

    #[error("Invalid timeline duration: {0}")]
    InvalidDuration(f64),

    #[error("Event time {time} is outside the timeline [0, {duration}]")]
    InvalidTime { time: f64, duration: f64 },

    #[error("State channel {0} requires a value")]
    MissingStateValue(String),

    #[error("Non-finite value {value} on channel {channel}")]
    InvalidValue { channel: String, value: f64 },
}

/// How a channel's events are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// Value persists until the next event on the channel
    State,
    /// Instantaneous occurrence, no persisted value
    Trigger,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::State => write!(f, "state"),
            ChannelKind::Trigger => write!(f, "trigger"),
        }
    }
}

impl FromStr for ChannelKind {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "state" => Ok(ChannelKind::State),
            "trigger" => Ok(ChannelKind::Trigger),
            _ => {
                log::error!("Invalid channel kind {}", s);
                Err(TimelineError::InvalidChannelKind { kind: s.to_string() })
            }
        }
    }
}

/// Value carried by an event
///
/// Only `Number` can be placed on a lane by the renderer; `Text` values still
/// take part in deduplication through plain equality.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventValue {
    /// No value (trigger events, the END sentinel)
    #[default]
    Absent,
    /// Numeric value
    Number(f64),
    /// Opaque comparable value
    Text(String),
}

impl EventValue {
    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            EventValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Check if this is the absent value
    pub fn is_absent(&self) -> bool {
        matches!(self, EventValue::Absent)
    }

    /// The number itself when it is NaN or infinite
    pub(crate) fn non_finite(&self) -> Option<f64> {
        match self {
            EventValue::Number(v) if !v.is_finite() => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for EventValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventValue::Absent => write!(f, "-"),
            EventValue::Number(v) => write!(f, "{}", v),
            EventValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for EventValue {
    fn from(v: f64) -> Self {
        EventValue::Number(v)
    }
}

impl From<i64> for EventValue {
    fn from(v: i64) -> Self {
        EventValue::Number(v as f64)
    }
}

impl From<i32> for EventValue {
    fn from(v: i32) -> Self {
        EventValue::Number(f64::from(v))
    }
}

impl From<&str> for EventValue {
    fn from(v: &str) -> Self {
        EventValue::Text(v.to_string())
    }
}

impl From<String> for EventValue {
    fn from(v: String) -> Self {
        EventValue::Text(v)
    }
}

impl<T: Into<EventValue>> From<Option<T>> for EventValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(EventValue::Absent, Into::into)
    }
}

/// A named lane of events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Unique channel name
    pub name: String,
    /// Channel kind, fixed at creation
    pub kind: ChannelKind,
    /// Initial value materialized at time 0 (state channels only)
    #[serde(default)]
    pub start_value: Option<EventValue>,
    /// Opaque caller payload
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl Channel {
    /// Create a channel without start value or metadata
    pub fn new(name: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            name: name.into(),
            kind,
            start_value: None,
            metadata: None,
        }
    }

    /// Check if this is a state channel
    pub fn is_state(&self) -> bool {
        self.kind == ChannelKind::State
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.kind)
    }
}

/// An event as appended by the caller, before reconciliation
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    /// Position on the timeline
    pub time: f64,
    /// Channel the event belongs to
    pub channel: String,
    /// Event value (`Absent` for triggers)
    pub value: EventValue,
}
