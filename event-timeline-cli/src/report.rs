//! Report generation
//!
//! Text report (summary + reconciled table) and the JSON draw-command dump.

use anyhow::Result;
use event_timeline::{DisplayOptions, DrawCommand, EventStore, RecordingCanvas, RenderReport, TimelineRenderer};
use serde::Serialize;

use crate::config::Scenario;

/// Summary followed by the reconciled table
pub fn text_report(store: &EventStore) -> String {
    format!("{}\n{}", store.summary(), store.to_text())
}

#[derive(Debug, Serialize)]
struct DrawDump {
    lanes: Vec<LaneDump>,
    skipped: Vec<String>,
    commands: Vec<DrawCommand>,
}

#[derive(Debug, Serialize)]
struct LaneDump {
    name: String,
    kind: String,
    color: String,
}

/// Render the store and serialize the draw commands as pretty JSON
pub fn draw_report(store: &EventStore, scenario: &Scenario) -> Result<String> {
    let mut canvas = RecordingCanvas::new();
    let renderer = TimelineRenderer::new(scenario.render.clone());

    // Without explicit display options, lanes follow the declared channels
    let options = scenario
        .display_options()
        .unwrap_or_else(|| DisplayOptions::from_channels(&store.channels()));
    let report = renderer.render(store.timeline(), &options, &mut canvas);

    for skipped in &report.skipped {
        log::warn!("Lane skipped: {}", skipped);
    }

    let dump = to_dump(report, canvas.take_commands());
    Ok(serde_json::to_string_pretty(&dump)?)
}

fn to_dump(report: RenderReport, commands: Vec<DrawCommand>) -> DrawDump {
    DrawDump {
        lanes: report
            .lanes
            .into_iter()
            .map(|lane| LaneDump {
                name: lane.name,
                kind: lane.kind.to_string(),
                color: lane.color,
            })
            .collect(),
        skipped: report.skipped.iter().map(ToString::to_string).collect(),
        commands,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Scenario {
        toml::from_str(
            r#"
            duration = 20.0

            [[channels]]
            name = "lever"
            kind = "state"
            start_value = 0

            [[channels]]
            name = "spike"
            kind = "trigger"

            [[events]]
            time = 5.0
            channel = "lever"
            value = 1

            [[events]]
            time = 7.0
            channel = "spike"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_text_report_contains_summary_and_table() {
        let store = scenario().build_store().unwrap();
        let text = text_report(&store);
        assert!(text.starts_with("Channels are (total=2):"));
        assert!(text.contains("END"));
    }

    #[test]
    fn test_draw_report_lists_lanes_and_commands() {
        let scenario = scenario();
        let store = scenario.build_store().unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&draw_report(&store, &scenario).unwrap()).unwrap();

        assert_eq!(json["lanes"][0]["name"], "lever");
        assert_eq!(json["lanes"][1]["kind"], "trigger");
        assert_eq!(json["commands"][0]["command"], "y_limits");
        assert!(json["skipped"].as_array().unwrap().is_empty());
    }
}
