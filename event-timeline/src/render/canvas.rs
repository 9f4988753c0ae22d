//! Canvas abstraction
//!
//! The renderer only needs a handful of 2D primitives; any plotting backend
//! can implement [`Canvas`]. [`RecordingCanvas`] keeps the draw commands in
//! memory so they can be inspected or serialized.

use serde::Serialize;

/// Horizontal segment at height `y` spanning `[x_start, x_end]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HSegment {
    pub y: f64,
    pub x_start: f64,
    pub x_end: f64,
}

/// Vertical segment at position `x` spanning `[y_start, y_end]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VSegment {
    pub x: f64,
    pub y_start: f64,
    pub y_end: f64,
}

/// Labelled tick on the lane axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub position: f64,
    pub label: String,
    pub color: String,
}

/// Plot border
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Spine {
    Left,
    Top,
    Right,
}

/// 2D drawing surface driven by the renderer
pub trait Canvas {
    /// Set the visible range of the lane axis
    fn set_y_limits(&mut self, low: f64, high: f64);

    /// Draw a batch of horizontal segments
    fn draw_hlines(&mut self, segments: &[HSegment], color: &str);

    /// Draw a batch of vertical segments
    fn draw_vlines(&mut self, segments: &[VSegment], color: &str);

    /// Place labelled ticks on the lane axis
    fn set_y_ticks(&mut self, ticks: &[AxisTick]);

    /// Length of the tick marks on the lane axis (0 hides them)
    fn set_y_tick_length(&mut self, length: f64);

    /// Hide plot borders
    fn hide_spines(&mut self, spines: &[Spine]);

    /// Label of the time axis
    fn set_x_label(&mut self, label: &str);

    /// Extra vertical margin as a fraction of the data range
    fn set_y_margin(&mut self, fraction: f64);
}

/// A recorded canvas call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum DrawCommand {
    YLimits { low: f64, high: f64 },
    HLines { segments: Vec<HSegment>, color: String },
    VLines { segments: Vec<VSegment>, color: String },
    YTicks { ticks: Vec<AxisTick> },
    YTickLength { length: f64 },
    HideSpines { spines: Vec<Spine> },
    XLabel { label: String },
    YMargin { fraction: f64 },
}

/// Canvas that records every call in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingCanvas {
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded commands in call order
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the canvas empty
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Canvas for RecordingCanvas {
    fn set_y_limits(&mut self, low: f64, high: f64) {
        self.commands.push(DrawCommand::YLimits { low, high });
    }

    fn draw_hlines(&mut self, segments: &[HSegment], color: &str) {
        self.commands.push(DrawCommand::HLines {
            segments: segments.to_vec(),
            color: color.to_string(),
        });
    }

    fn draw_vlines(&mut self, segments: &[VSegment], color: &str) {
        self.commands.push(DrawCommand::VLines {
            segments: segments.to_vec(),
            color: color.to_string(),
        });
    }

    fn set_y_ticks(&mut self, ticks: &[AxisTick]) {
        self.commands.push(DrawCommand::YTicks {
            ticks: ticks.to_vec(),
        });
    }

    fn set_y_tick_length(&mut self, length: f64) {
        self.commands.push(DrawCommand::YTickLength { length });
    }

    fn hide_spines(&mut self, spines: &[Spine]) {
        self.commands.push(DrawCommand::HideSpines {
            spines: spines.to_vec(),
        });
    }

    fn set_x_label(&mut self, label: &str) {
        self.commands.push(DrawCommand::XLabel {
            label: label.to_string(),
        });
    }

    fn set_y_margin(&mut self, fraction: f64) {
        self.commands.push(DrawCommand::YMargin { fraction });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_serialize_with_tag() {
        let mut canvas = RecordingCanvas::new();
        canvas.set_x_label("time (s)");
        canvas.hide_spines(&[Spine::Left, Spine::Top]);

        let json = serde_json::to_value(canvas.commands()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"command": "x_label", "label": "time (s)"},
                {"command": "hide_spines", "spines": ["left", "top"]},
            ])
        );
    }

    #[test]
    fn test_take_commands_empties_canvas() {
        let mut canvas = RecordingCanvas::new();
        canvas.set_y_margin(0.3);
        assert_eq!(canvas.take_commands().len(), 1);
        assert!(canvas.commands().is_empty());
    }
}
