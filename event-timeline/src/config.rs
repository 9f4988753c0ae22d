//! Rendering configuration types
//!
//! Per-channel display options and the layout constants of the lane plot.
//! Unset fields are resolved by the renderer against the table it draws.

use crate::channels::ChannelRegistry;
use crate::types::ChannelKind;
use serde::{Deserialize, Serialize};

/// Default color cycle (matplotlib "tab10")
pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
    "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
];

/// Palette color for a slot, cycling past the end
pub fn palette_color(slot: usize) -> &'static str {
    PALETTE[slot % PALETTE.len()]
}

/// Display options for a single channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelDisplay {
    /// Lane color (inferred from the palette when unset)
    #[serde(default)]
    pub color: Option<String>,

    /// Render mode (inferred from the data when unset)
    #[serde(default)]
    pub kind: Option<ChannelKind>,
}

impl ChannelDisplay {
    /// Create display options with every field unset
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the lane color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Builder method: set the render mode
    pub fn with_kind(mut self, kind: ChannelKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// Insertion-ordered map of channel name to display options
///
/// Lane `i` of the plot is the `i`-th entry of this map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayOptions {
    entries: Vec<(String, ChannelDisplay)>,
}

impl DisplayOptions {
    /// Create an empty option set
    pub fn new() -> Self {
        Self::default()
    }

    /// Display options mirroring a channel registry's declared kinds
    pub fn from_channels(channels: &ChannelRegistry) -> Self {
        let mut options = Self::new();
        for channel in channels {
            options.insert(channel.name.clone(), ChannelDisplay::new().with_kind(channel.kind));
        }
        options
    }

    /// Builder method: add or replace a channel's options
    pub fn with_channel(mut self, name: impl Into<String>, display: ChannelDisplay) -> Self {
        self.insert(name, display);
        self
    }

    /// Add or replace a channel's options; replacing keeps the lane position
    pub fn insert(&mut self, name: impl Into<String>, display: ChannelDisplay) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = display,
            None => self.entries.push((name, display)),
        }
    }

    /// Options of a channel
    pub fn get(&self, name: &str) -> Option<&ChannelDisplay> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    /// Check if a channel has options
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of lanes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no lanes
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in lane order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChannelDisplay)> {
        self.entries.iter().map(|(n, d)| (n.as_str(), d))
    }
}

impl<N: Into<String>> FromIterator<(N, ChannelDisplay)> for DisplayOptions {
    fn from_iter<I: IntoIterator<Item = (N, ChannelDisplay)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (name, display) in iter {
            options.insert(name, display);
        }
        options
    }
}

/// Layout of the lane plot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderConfig {
    /// Fraction of a lane left empty above and below the drawing
    #[serde(default = "default_lane_padding")]
    pub lane_padding: f64,

    /// Vertical margin fraction so adjacent lanes don't touch
    #[serde(default = "default_y_margin")]
    pub y_margin: f64,

    /// Label of the time axis
    #[serde(default = "default_x_label")]
    pub x_label: String,
}

fn default_lane_padding() -> f64 {
    0.1
}

fn default_y_margin() -> f64 {
    0.3
}

fn default_x_label() -> String {
    "time (s)".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            lane_padding: default_lane_padding(),
            y_margin: default_y_margin(),
            x_label: default_x_label(),
        }
    }
}

impl RenderConfig {
    /// Create a render configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the lane padding
    pub fn with_lane_padding(mut self, padding: f64) -> Self {
        self.lane_padding = padding;
        self
    }

    /// Builder method: set the vertical margin
    pub fn with_y_margin(mut self, margin: f64) -> Self {
        self.y_margin = margin;
        self
    }

    /// Builder method: set the time axis label
    pub fn with_x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = label.into();
        self
    }
}
