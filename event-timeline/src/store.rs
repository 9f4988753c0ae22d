//! Event store
//!
//! The store is the write surface of the library. It validates insertions,
//! keeps the raw event log and memoizes the reconciled timeline until the next
//! mutation.

use crate::channels::ChannelRegistry;
use crate::config::{DisplayOptions, RenderConfig};
use crate::reconcile::reconcile;
use crate::render::{Canvas, RenderReport, TimelineRenderer};
use crate::timeline::Timeline;
use crate::types::{Channel, ChannelKind, EventValue, RawEvent, Result, TimelineError, END_CHANNEL};
use std::cell::OnceCell;
use std::fmt;

/// In-memory event log with a lazily reconciled timeline
///
/// # Example
/// ```
/// use event_timeline::{ChannelKind, EventStore};
///
/// let mut store = EventStore::new(100.0).unwrap();
/// store.add_channel("reward", ChannelKind::State, Some(0.into())).unwrap();
/// store.add_channel("spike", ChannelKind::Trigger, None).unwrap();
/// store.add_event(4.0, "reward", 4.into()).unwrap();
/// store.add_event(9.0, "spike", None::<f64>.into()).unwrap();
///
/// // 2 reward rows, 1 spike row and the END sentinel
/// assert_eq!(store.table().len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct EventStore {
    duration: f64,
    channels: ChannelRegistry,
    events: Vec<RawEvent>,
    /// Reconciled view, cleared by every mutation
    timeline: OnceCell<Timeline>,
}

impl EventStore {
    /// Create an empty store spanning `[0, duration]`
    pub fn new(duration: f64) -> Result<Self> {
        if !duration.is_finite() || duration < 0.0 {
            log::error!("Invalid timeline duration {}", duration);
            return Err(TimelineError::InvalidDuration(duration));
        }
        Ok(Self {
            duration,
            channels: ChannelRegistry::new(),
            events: Vec::new(),
            timeline: OnceCell::new(),
        })
    }

    /// Total timeline duration
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Register a channel
    ///
    /// A start value on a state channel is materialized as an event at time 0.
    pub fn add_channel(
        &mut self,
        name: &str,
        kind: ChannelKind,
        start_value: Option<EventValue>,
    ) -> Result<()> {
        self.add_channel_with_metadata(name, kind, start_value, None)
    }

    /// Register a channel carrying an opaque metadata payload
    pub fn add_channel_with_metadata(
        &mut self,
        name: &str,
        kind: ChannelKind,
        start_value: Option<EventValue>,
        metadata: Option<serde_json::Value>,
    ) -> Result<()> {
        if name == END_CHANNEL {
            log::error!("Add channel called with reserved name {}", name);
            return Err(TimelineError::ReservedChannelName(name.to_string()));
        }
        if self.channels.contains(name) {
            log::error!(
                "Add channel called with {} but a channel with the same name already exists",
                name
            );
            return Err(TimelineError::DuplicateChannel(name.to_string()));
        }

        if let Some(value) = start_value.as_ref().and_then(EventValue::non_finite) {
            if kind == ChannelKind::State {
                log::error!("Start value {} of channel {} is not finite", value, name);
                return Err(TimelineError::InvalidValue {
                    channel: name.to_string(),
                    value,
                });
            }
        }

        let start_value = match (kind, start_value) {
            (ChannelKind::Trigger, Some(value)) => {
                log::warn!("Ignoring start value {} of trigger channel {}", value, name);
                None
            }
            // An absent start value means "no start value"
            (ChannelKind::State, Some(EventValue::Absent)) => None,
            (_, start_value) => start_value,
        };

        let mut channel = Channel::new(name, kind);
        channel.start_value = start_value.clone();
        channel.metadata = metadata;
        self.channels.insert(channel);
        log::debug!("Registered channel {}:{}", name, kind);

        if let Some(value) = start_value {
            self.push_event(0.0, name, value);
        }
        self.invalidate();
        Ok(())
    }

    /// Append an event; call order does not need to follow `time`
    pub fn add_event(&mut self, time: f64, channel: &str, value: EventValue) -> Result<()> {
        let kind = match self.channels.kind_of(channel) {
            Some(kind) => kind,
            None => {
                log::error!("Add event of undeclared channel {}", channel);
                return Err(TimelineError::UnknownChannel(channel.to_string()));
            }
        };
        if !time.is_finite() || time < 0.0 || time > self.duration {
            log::error!("Event time {} on {} is outside [0, {}]", time, channel, self.duration);
            return Err(TimelineError::InvalidTime {
                time,
                duration: self.duration,
            });
        }

        let value = match kind {
            ChannelKind::State if value.is_absent() => {
                log::error!("Add event on state channel {} without a value", channel);
                return Err(TimelineError::MissingStateValue(channel.to_string()));
            }
            ChannelKind::State => match value.non_finite() {
                Some(v) => {
                    log::error!("Add event on {} with non-finite value {}", channel, v);
                    return Err(TimelineError::InvalidValue {
                        channel: channel.to_string(),
                        value: v,
                    });
                }
                None => value,
            },
            ChannelKind::Trigger => EventValue::Absent,
        };

        // -0.0 would sort ahead of every 0.0 under a total order
        let time = time + 0.0;
        self.push_event(time, channel, value);
        self.invalidate();
        Ok(())
    }

    fn push_event(&mut self, time: f64, channel: &str, value: EventValue) {
        self.events.push(RawEvent {
            time,
            channel: channel.to_string(),
            value,
        });
    }

    fn invalidate(&mut self) {
        self.timeline = OnceCell::new();
    }

    /// Memoized reconciled timeline
    pub fn timeline(&self) -> &Timeline {
        self.timeline
            .get_or_init(|| reconcile(&self.channels, &self.events, self.duration))
    }

    /// Independent copy of the reconciled timeline
    pub fn table(&self) -> Timeline {
        self.timeline().clone()
    }

    /// Independent copy of the channel registry
    pub fn channels(&self) -> ChannelRegistry {
        self.channels.clone()
    }

    /// Number of raw rows, END sentinel included
    pub fn raw_event_count(&self) -> usize {
        self.events.len() + 1
    }

    /// Check if the memoized timeline is up to date
    pub fn is_reconciled(&self) -> bool {
        self.timeline.get().is_some()
    }

    /// Human readable channel listing with reconciled event counts
    pub fn summary(&self) -> String {
        let counts = self.timeline().events_per_channel();
        let mut res = format!("Channels are (total={}):\n", self.channels.len());
        for channel in &self.channels {
            res.push_str(&format!(
                "  - {} of type {} with {} events\n",
                channel.name,
                channel.kind,
                counts.get(channel.name.as_str()).copied().unwrap_or(0)
            ));
        }
        res
    }

    /// The reconciled table as aligned text
    pub fn to_text(&self) -> String {
        self.timeline().to_text()
    }

    /// Render the store's own timeline using its declared channel kinds
    pub fn draw<C: Canvas>(&self, canvas: &mut C, config: RenderConfig) -> RenderReport {
        let options = DisplayOptions::from_channels(&self.channels);
        TimelineRenderer::new(config).render(self.timeline(), &options, canvas)
    }
}

impl fmt::Display for EventStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.timeline())
    }
}
