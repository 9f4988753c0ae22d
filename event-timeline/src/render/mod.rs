//! Channel lane renderer
//!
//! Maps a reconciled timeline onto a stack of horizontal lanes, one per
//! channel. Lane `i` occupies the band `[i, i+1]`:
//! - state channels are drawn as step functions, values scaled into the lane
//! - trigger channels are drawn as vertical ticks
//!
//! A lane that cannot be drawn is logged and skipped; the rest of the plot is
//! still rendered.

mod canvas;

pub use canvas::{AxisTick, Canvas, DrawCommand, HSegment, RecordingCanvas, Spine, VSegment};

use crate::config::{palette_color, ChannelDisplay, DisplayOptions, RenderConfig};
use crate::timeline::Timeline;
use crate::types::ChannelKind;

/// Per-lane rendering problems (never abort the render)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("State channel {channel} has a non-numeric value at T={time}")]
    NonNumericState { channel: String, time: f64 },
}

/// A lane after option resolution
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub name: String,
    pub kind: ChannelKind,
    pub color: String,
}

/// What a render call drew
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    /// Lanes in plot order, skipped ones included
    pub lanes: Vec<Lane>,
    /// Lanes that were logged and left empty
    pub skipped: Vec<RenderError>,
}

/// Renders timelines onto a [`Canvas`]
#[derive(Debug, Clone, Default)]
pub struct TimelineRenderer {
    config: RenderConfig,
}

impl TimelineRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Resolve unset colors and kinds against the table
    ///
    /// Channels present in the table but missing from `options` are appended
    /// as extra lanes.
    pub fn resolve_lanes(&self, timeline: &Timeline, options: &DisplayOptions) -> Vec<Lane> {
        let present = timeline.channel_names();

        let mut resolved = options.clone();
        for name in &present {
            if !resolved.contains(name) {
                resolved.insert(*name, ChannelDisplay::new());
            }
        }

        let mut extra_slot = present.len();
        resolved
            .iter()
            .map(|(name, display)| {
                let color = match &display.color {
                    Some(color) => color.clone(),
                    None => {
                        let slot = match present.iter().position(|p| *p == name) {
                            Some(slot) => slot,
                            None => {
                                extra_slot += 1;
                                extra_slot - 1
                            }
                        };
                        palette_color(slot).to_string()
                    }
                };
                let kind = display.kind.unwrap_or_else(|| infer_kind(timeline, name));
                Lane {
                    name: name.to_string(),
                    kind,
                    color,
                }
            })
            .collect()
    }

    /// Draw `timeline` onto `canvas`
    ///
    /// Identical inputs always produce the identical command sequence.
    pub fn render<C: Canvas>(
        &self,
        timeline: &Timeline,
        options: &DisplayOptions,
        canvas: &mut C,
    ) -> RenderReport {
        let lanes = self.resolve_lanes(timeline, options);
        log::debug!("Rendering {} lanes", lanes.len());

        canvas.set_y_limits(0.0, lanes.len() as f64);

        let mut skipped = Vec::new();
        for (i, lane) in lanes.iter().enumerate() {
            let result = match lane.kind {
                ChannelKind::State => self.draw_state_lane(timeline, i, lane, canvas),
                ChannelKind::Trigger => {
                    self.draw_trigger_lane(timeline, i, lane, canvas);
                    Ok(())
                }
            };
            if let Err(e) = result {
                log::error!("Skipping lane {}: {}", lane.name, e);
                skipped.push(e);
            }
        }

        canvas.hide_spines(&[Spine::Left, Spine::Top, Spine::Right]);
        let ticks: Vec<AxisTick> = lanes
            .iter()
            .enumerate()
            .map(|(i, lane)| AxisTick {
                position: i as f64 + 0.5,
                label: lane.name.clone(),
                color: lane.color.clone(),
            })
            .collect();
        canvas.set_y_ticks(&ticks);
        canvas.set_y_tick_length(0.0);
        canvas.set_x_label(&self.config.x_label);
        canvas.set_y_margin(self.config.y_margin);

        RenderReport { lanes, skipped }
    }

    fn draw_state_lane<C: Canvas>(
        &self,
        timeline: &Timeline,
        lane_index: usize,
        lane: &Lane,
        canvas: &mut C,
    ) -> Result<(), RenderError> {
        let mut points: Vec<(f64, f64)> = Vec::new();
        for row in timeline.rows_for(&lane.name) {
            match row.value.as_f64() {
                Some(value) => points.push((row.time, value)),
                None => {
                    return Err(RenderError::NonNumericState {
                        channel: lane.name.clone(),
                        time: row.time,
                    })
                }
            }
        }
        if points.is_empty() {
            log::debug!("State lane {} has no rows", lane.name);
            return Ok(());
        }

        let min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        let base = lane_index as f64;
        let pad = self.config.lane_padding;
        let position = |v: f64| {
            if max != min {
                base + pad + (1.0 - 2.0 * pad) * (v - min) / (max - min)
            } else {
                base + 0.5
            }
        };

        let end_time = timeline.max_time().unwrap_or(0.0);
        let hlines: Vec<HSegment> = points
            .iter()
            .enumerate()
            .map(|(k, &(time, value))| HSegment {
                y: position(value),
                x_start: time,
                x_end: points.get(k + 1).map_or(end_time, |next| next.0),
            })
            .collect();
        let vlines: Vec<VSegment> = points
            .windows(2)
            .map(|pair| VSegment {
                x: pair[1].0,
                y_start: position(pair[0].1),
                y_end: position(pair[1].1),
            })
            .collect();

        canvas.draw_hlines(&hlines, &lane.color);
        if !vlines.is_empty() {
            canvas.draw_vlines(&vlines, &lane.color);
        }
        Ok(())
    }

    fn draw_trigger_lane<C: Canvas>(
        &self,
        timeline: &Timeline,
        lane_index: usize,
        lane: &Lane,
        canvas: &mut C,
    ) {
        let base = lane_index as f64;
        let pad = self.config.lane_padding;
        let ticks: Vec<VSegment> = timeline
            .rows_for(&lane.name)
            .map(|row| VSegment {
                x: row.time,
                y_start: base + pad,
                y_end: base + 1.0 - pad,
            })
            .collect();
        if !ticks.is_empty() {
            canvas.draw_vlines(&ticks, &lane.color);
        }
    }
}

/// Trigger if any row of the channel has no value, state otherwise
fn infer_kind(timeline: &Timeline, channel: &str) -> ChannelKind {
    if timeline.rows_for(channel).any(|r| r.value.is_absent()) {
        ChannelKind::Trigger
    } else {
        ChannelKind::State
    }
}

/// Render with the default layout
pub fn render<C: Canvas>(timeline: &Timeline, options: &DisplayOptions, canvas: &mut C) -> RenderReport {
    TimelineRenderer::default().render(timeline, options, canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EventStore;
    use crate::types::EventValue;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn hlines(commands: &[DrawCommand]) -> Vec<(&Vec<HSegment>, &String)> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::HLines { segments, color } => Some((segments, color)),
                _ => None,
            })
            .collect()
    }

    fn vlines(commands: &[DrawCommand]) -> Vec<(&Vec<VSegment>, &String)> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::VLines { segments, color } => Some((segments, color)),
                _ => None,
            })
            .collect()
    }

    fn lever_spike_store() -> EventStore {
        let mut store = EventStore::new(20.0).unwrap();
        store.add_channel("lever", ChannelKind::State, Some(0.into())).unwrap();
        store.add_channel("spike", ChannelKind::Trigger, None).unwrap();
        store.add_event(5.0, "lever", 10.into()).unwrap();
        store.add_event(8.0, "lever", 5.into()).unwrap();
        store.add_event(3.0, "spike", EventValue::Absent).unwrap();
        store.add_event(9.0, "spike", EventValue::Absent).unwrap();
        store
    }

    #[test]
    fn test_state_lane_is_a_step_function() {
        let store = lever_spike_store();
        let mut canvas = RecordingCanvas::new();
        let report = render(store.timeline(), &DisplayOptions::new(), &mut canvas);
        assert!(report.skipped.is_empty());

        let commands = canvas.commands();
        let (segments, color) = hlines(commands)[0];
        assert_eq!(color, "#1f77b4");
        assert_eq!(segments.len(), 3);
        assert!(approx(segments[0].y, 0.1));
        assert!(approx(segments[1].y, 0.9));
        assert!(approx(segments[2].y, 0.5));
        assert_eq!((segments[0].x_start, segments[0].x_end), (0.0, 5.0));
        assert_eq!((segments[2].x_start, segments[2].x_end), (8.0, 20.0));

        let (connectors, _) = vlines(commands)[0];
        assert_eq!(connectors.len(), 2);
        assert_eq!(connectors[0].x, 5.0);
        assert!(approx(connectors[0].y_start, 0.1));
        assert!(approx(connectors[0].y_end, 0.9));
    }

    #[test]
    fn test_trigger_lane_draws_ticks() {
        let store = lever_spike_store();
        let mut canvas = RecordingCanvas::new();
        let report = render(store.timeline(), &DisplayOptions::new(), &mut canvas);

        assert_eq!(report.lanes[1].kind, ChannelKind::Trigger);
        let (ticks, color) = vlines(canvas.commands())[1];
        assert_eq!(color, "#ff7f0e");
        let xs: Vec<f64> = ticks.iter().map(|t| t.x).collect();
        assert_eq!(xs, vec![3.0, 9.0]);
        assert!(ticks.iter().all(|t| approx(t.y_start, 1.1) && approx(t.y_end, 1.9)));
    }

    #[test]
    fn test_single_valued_state_is_centered() {
        let mut store = EventStore::new(10.0).unwrap();
        store.add_channel("flat", ChannelKind::State, Some(7.into())).unwrap();
        let mut canvas = RecordingCanvas::new();
        render(store.timeline(), &DisplayOptions::new(), &mut canvas);

        let (segments, _) = hlines(canvas.commands())[0];
        assert_eq!(segments.len(), 1);
        assert!(approx(segments[0].y, 0.5));
        assert!(vlines(canvas.commands()).is_empty());
    }

    #[test]
    fn test_options_override_kind_and_color_and_keep_lane_order() {
        let store = lever_spike_store();
        let options = DisplayOptions::new()
            .with_channel("spike", ChannelDisplay::new().with_color("black"))
            .with_channel("lever", ChannelDisplay::new().with_kind(ChannelKind::Trigger));

        let mut canvas = RecordingCanvas::new();
        let report = render(store.timeline(), &options, &mut canvas);

        assert_eq!(report.lanes[0].name, "spike");
        assert_eq!(report.lanes[0].color, "black");
        assert_eq!(report.lanes[1].name, "lever");
        assert_eq!(report.lanes[1].kind, ChannelKind::Trigger);
        // lever is the first channel seen in the table
        assert_eq!(report.lanes[1].color, "#1f77b4");
        assert!(hlines(canvas.commands()).is_empty());
    }

    #[test]
    fn test_non_numeric_state_lane_is_skipped() {
        let mut store = EventStore::new(10.0).unwrap();
        store.add_channel("mode", ChannelKind::State, Some("idle".into())).unwrap();
        store.add_channel("spike", ChannelKind::Trigger, None).unwrap();
        store.add_event(2.0, "spike", EventValue::Absent).unwrap();

        let mut canvas = RecordingCanvas::new();
        let report = render(store.timeline(), &DisplayOptions::new(), &mut canvas);

        assert_eq!(
            report.skipped,
            vec![RenderError::NonNumericState {
                channel: "mode".to_string(),
                time: 0.0
            }]
        );
        assert!(hlines(canvas.commands()).is_empty());
        assert_eq!(vlines(canvas.commands()).len(), 1);

        let labels: Vec<String> = canvas
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::YTicks { ticks } => Some(ticks.iter().map(|t| t.label.clone()).collect::<Vec<String>>()),
                _ => None,
            })
            .next()
            .unwrap();
        assert_eq!(labels, vec!["mode", "spike"]);
    }

    #[test]
    fn test_axes_setup() {
        let store = lever_spike_store();
        let mut canvas = RecordingCanvas::new();
        render(store.timeline(), &DisplayOptions::new(), &mut canvas);
        let commands = canvas.commands();

        assert_eq!(commands[0], DrawCommand::YLimits { low: 0.0, high: 2.0 });
        assert!(commands.contains(&DrawCommand::HideSpines {
            spines: vec![Spine::Left, Spine::Top, Spine::Right]
        }));
        assert!(commands.contains(&DrawCommand::YTickLength { length: 0.0 }));
        assert!(commands.contains(&DrawCommand::XLabel {
            label: "time (s)".to_string()
        }));
        assert_eq!(commands.last(), Some(&DrawCommand::YMargin { fraction: 0.3 }));
    }

    #[test]
    fn test_lane_without_rows_takes_next_palette_slot() {
        let store = lever_spike_store();
        let options = DisplayOptions::new().with_channel("ghost", ChannelDisplay::new());
        let report = render(store.timeline(), &options, &mut RecordingCanvas::new());

        let ghost = &report.lanes[0];
        assert_eq!(ghost.name, "ghost");
        assert_eq!(ghost.color, palette_color(2));
        assert_eq!(ghost.kind, ChannelKind::State);
        assert!(report.skipped.is_empty());
    }
}
