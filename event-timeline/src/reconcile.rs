//! Reconciliation engine
//!
//! Turns the raw event log into the canonical timeline:
//! 1. Stable sort by time (the END sentinel counts as inserted first)
//! 2. Previous value per state channel
//! 3. Drop state rows equal to their previous value
//! 4. Duration until the next row on the same state channel
//! 5. Forward-filled state columns
//!
//! The pass is a pure function of its inputs and cannot fail.

use crate::channels::ChannelRegistry;
use crate::timeline::{RowChannel, Timeline, TimelineRow};
use crate::types::{ChannelKind, EventValue, RawEvent};
use std::collections::HashMap;

/// Sorted row before the per-channel passes
struct SortedRow<'a> {
    time: f64,
    channel: Option<&'a str>,
    value: &'a EventValue,
}

/// Build the reconciled timeline
pub fn reconcile(channels: &ChannelRegistry, events: &[RawEvent], duration: f64) -> Timeline {
    log::debug!(
        "Reconciling {} raw events over {} channels",
        events.len(),
        channels.len()
    );

    let end_value = EventValue::Absent;
    let mut sorted: Vec<SortedRow<'_>> = Vec::with_capacity(events.len() + 1);
    sorted.push(SortedRow {
        time: duration,
        channel: None,
        value: &end_value,
    });
    sorted.extend(events.iter().map(|e| SortedRow {
        time: e.time,
        channel: Some(e.channel.as_str()),
        value: &e.value,
    }));
    // `sort_by` is stable, so ties keep insertion order
    sorted.sort_by(|a, b| a.time.total_cmp(&b.time));

    let mut rows = collapse_state_runs(channels, &sorted);
    fill_durations(channels, &mut rows, duration);

    let state_columns = channels.state_channel_names();
    forward_fill(&state_columns, &mut rows);

    log::debug!("Reconciled timeline has {} rows", rows.len());
    Timeline::new(duration, state_columns, rows)
}

/// Steps 2 and 3: previous values and run collapsing
///
/// A kept row's previous value is the last kept value on its channel, which
/// is also its predecessor before dropping (dropped rows repeat that value).
fn collapse_state_runs(channels: &ChannelRegistry, sorted: &[SortedRow<'_>]) -> Vec<TimelineRow> {
    let mut last_value: HashMap<&str, &EventValue> = HashMap::new();
    let mut rows = Vec::with_capacity(sorted.len());

    for entry in sorted {
        let (channel, previous_value) = match entry.channel {
            None => (RowChannel::End, None),
            Some(name) => match channels.kind_of(name) {
                Some(ChannelKind::State) => {
                    let previous = last_value.insert(name, entry.value);
                    if previous == Some(entry.value) {
                        log::trace!("Dropping repeated value {} on {} at {}", entry.value, name, entry.time);
                        continue;
                    }
                    (RowChannel::Event(name.to_string()), previous.cloned())
                }
                // Triggers are never collapsed
                Some(ChannelKind::Trigger) => (RowChannel::Event(name.to_string()), None),
                None => {
                    log::error!("Skipping event on unregistered channel {}", name);
                    continue;
                }
            },
        };

        rows.push(TimelineRow {
            time: entry.time,
            channel,
            value: entry.value.clone(),
            previous_value,
            duration_until_next: None,
            state: Vec::new(),
        });
    }
    rows
}

/// Step 4: gap to the next row on each state channel
fn fill_durations(channels: &ChannelRegistry, rows: &mut [TimelineRow], duration: f64) {
    let mut next_time: HashMap<String, f64> = HashMap::new();

    for row in rows.iter_mut().rev() {
        match &row.channel {
            RowChannel::End => row.duration_until_next = Some(0.0),
            RowChannel::Event(name) => {
                if channels.kind_of(name) == Some(ChannelKind::State) {
                    let next = next_time.get(name).copied().unwrap_or(duration);
                    row.duration_until_next = Some(next - row.time);
                    next_time.insert(name.clone(), row.time);
                }
            }
        }
    }
}

/// Step 5: every row carries the latest value of each state channel
fn forward_fill(state_columns: &[String], rows: &mut [TimelineRow]) {
    let mut current: Vec<Option<EventValue>> = vec![None; state_columns.len()];

    for row in rows.iter_mut() {
        if let Some(name) = row.channel.name() {
            if let Some(column) = state_columns.iter().position(|c| c == name) {
                current[column] = Some(row.value.clone());
            }
        }
        row.state = current.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Channel;

    fn registry(channels: &[(&str, ChannelKind)]) -> ChannelRegistry {
        let mut registry = ChannelRegistry::new();
        for (name, kind) in channels {
            registry.insert(Channel::new(*name, *kind));
        }
        registry
    }

    fn event(time: f64, channel: &str, value: EventValue) -> RawEvent {
        RawEvent {
            time,
            channel: channel.to_string(),
            value,
        }
    }

    #[test]
    fn test_no_channels_yields_only_end() {
        let timeline = reconcile(&ChannelRegistry::new(), &[], 50.0);
        assert_eq!(timeline.len(), 1);
        let end = &timeline.rows()[0];
        assert!(end.channel.is_end());
        assert_eq!(end.time, 50.0);
        assert_eq!(end.duration_until_next, Some(0.0));
        assert!(timeline.state_columns().is_empty());
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let channels = registry(&[("a", ChannelKind::Trigger), ("b", ChannelKind::Trigger)]);
        let events = vec![
            event(5.0, "b", EventValue::Absent),
            event(1.0, "a", EventValue::Absent),
            event(5.0, "a", EventValue::Absent),
        ];
        let timeline = reconcile(&channels, &events, 10.0);
        let order: Vec<String> = timeline
            .rows()
            .iter()
            .map(|r| format!("{}@{}", r.channel, r.time))
            .collect();
        assert_eq!(order, vec!["a@1", "b@5", "a@5", "END@10"]);
    }

    #[test]
    fn test_runs_collapse_and_previous_value_links_kept_rows() {
        let channels = registry(&[("s", ChannelKind::State)]);
        let events = vec![
            event(0.0, "s", 1.into()),
            event(1.0, "s", 1.into()),
            event(2.0, "s", 1.into()),
            event(3.0, "s", 2.into()),
            event(4.0, "s", 1.into()),
        ];
        let timeline = reconcile(&channels, &events, 10.0);
        let rows: Vec<_> = timeline.rows_for("s").collect();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].previous_value, None);
        assert_eq!(rows[1].previous_value, Some(EventValue::Number(1.0)));
        assert_eq!(rows[2].previous_value, Some(EventValue::Number(2.0)));
        let durations: Vec<f64> = rows.iter().filter_map(|r| r.duration_until_next).collect();
        assert_eq!(durations, vec![3.0, 1.0, 6.0]);
    }

    #[test]
    fn test_triggers_are_not_collapsed_and_have_no_duration() {
        let channels = registry(&[("t", ChannelKind::Trigger)]);
        let events = vec![
            event(2.0, "t", EventValue::Absent),
            event(2.0, "t", EventValue::Absent),
        ];
        let timeline = reconcile(&channels, &events, 10.0);
        let rows: Vec<_> = timeline.rows_for("t").collect();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.duration_until_next.is_none()));
        assert!(rows.iter().all(|r| r.previous_value.is_none()));
    }

    #[test]
    fn test_forward_fill_before_first_event_is_none() {
        let channels = registry(&[("t", ChannelKind::Trigger), ("s", ChannelKind::State)]);
        let events = vec![
            event(1.0, "t", EventValue::Absent),
            event(3.0, "s", "on".into()),
            event(4.0, "t", EventValue::Absent),
        ];
        let timeline = reconcile(&channels, &events, 10.0);

        let series = timeline.state_series("s").unwrap();
        let on = EventValue::Text("on".to_string());
        assert_eq!(series, vec![None, Some(&on), Some(&on), Some(&on)]);
        assert_eq!(timeline.state_series("t"), None);
    }

    #[test]
    fn test_mixed_value_variants_reconcile_by_equality() {
        let channels = registry(&[("s", ChannelKind::State)]);
        let events = vec![
            event(0.0, "s", 1.into()),
            event(1.0, "s", "1".into()),
            event(2.0, "s", "1".into()),
        ];
        let timeline = reconcile(&channels, &events, 5.0);
        assert_eq!(timeline.rows_for("s").count(), 2);
    }
}
