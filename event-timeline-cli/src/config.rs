//! Scenario loading and parsing

use anyhow::{Context, Result};
use event_timeline::{ChannelDisplay, ChannelKind, DisplayOptions, EventStore, EventValue, RenderConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A scenario file (scenario.toml): one store plus how to draw it
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Scenario {
    pub duration: f64,
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
    #[serde(default)]
    pub events: Vec<EventConfig>,
    #[serde(default)]
    pub display: Vec<DisplayConfig>,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelConfig {
    pub name: String,
    /// "state" or "trigger", validated when the store is built
    pub kind: String,
    pub start_value: Option<EventValue>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventConfig {
    pub time: f64,
    pub channel: String,
    #[serde(default)]
    pub value: EventValue,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    pub channel: String,
    #[serde(flatten)]
    pub options: ChannelDisplay,
}

impl Scenario {
    /// Build the event store described by the scenario
    pub fn build_store(&self) -> Result<EventStore> {
        let mut store = EventStore::new(self.duration)?;

        for channel in &self.channels {
            let kind: ChannelKind = channel
                .kind
                .parse()
                .with_context(|| format!("Channel {}", channel.name))?;
            store.add_channel_with_metadata(
                &channel.name,
                kind,
                channel.start_value.clone(),
                channel.metadata.clone(),
            )?;
        }

        for (i, event) in self.events.iter().enumerate() {
            store
                .add_event(event.time, &event.channel, event.value.clone())
                .with_context(|| format!("Event #{} at T={}", i + 1, event.time))?;
        }

        log::debug!("Built store with {} raw events", store.raw_event_count());
        Ok(store)
    }

    /// Display options in file order; `None` when the file has none
    pub fn display_options(&self) -> Option<DisplayOptions> {
        if self.display.is_empty() {
            return None;
        }
        Some(
            self.display
                .iter()
                .map(|d| (d.channel.clone(), d.options.clone()))
                .collect(),
        )
    }
}

/// Load a scenario from a TOML file
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file: {:?}", path))?;

    let scenario: Scenario = toml::from_str(&content)
        .with_context(|| format!("Failed to parse scenario file: {:?}", path))?;

    Ok(scenario)
}
