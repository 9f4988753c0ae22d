//! Reconciled timeline table
//!
//! A `Timeline` is the canonical, time-ordered view produced by reconciliation.
//! It is a plain value: callers can clone, filter and project it freely without
//! touching the store it came from.

use crate::types::{EventValue, END_CHANNEL};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Which lane a row belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum RowChannel {
    /// A row on a registered channel
    Event(String),
    /// The terminal sentinel
    End,
}

impl RowChannel {
    /// Channel name, `None` for the sentinel
    pub fn name(&self) -> Option<&str> {
        match self {
            RowChannel::Event(name) => Some(name),
            RowChannel::End => None,
        }
    }

    /// Check if this row is the END sentinel
    pub fn is_end(&self) -> bool {
        matches!(self, RowChannel::End)
    }
}

impl fmt::Display for RowChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowChannel::Event(name) => write!(f, "{}", name),
            RowChannel::End => write!(f, "{}", END_CHANNEL),
        }
    }
}

/// One reconciled row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRow {
    /// Position on the timeline
    pub time: f64,
    /// Lane of the row
    pub channel: RowChannel,
    /// Value carried by the event
    pub value: EventValue,
    /// Previous value on the same state channel
    pub previous_value: Option<EventValue>,
    /// Time until the next row on the same state channel
    pub duration_until_next: Option<f64>,
    /// Current value of every state channel as of this row,
    /// aligned with [`Timeline::state_columns`]
    pub state: Vec<Option<EventValue>>,
}

impl TimelineRow {
    /// Check if this row belongs to the named channel
    pub fn is_on(&self, channel: &str) -> bool {
        self.channel.name() == Some(channel)
    }
}

/// The reconciled timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    duration: f64,
    state_columns: Vec<String>,
    rows: Vec<TimelineRow>,
}

impl Timeline {
    pub(crate) fn new(duration: f64, state_columns: Vec<String>, rows: Vec<TimelineRow>) -> Self {
        Self {
            duration,
            state_columns,
            rows,
        }
    }

    /// Total timeline duration
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// All rows, END sentinel included
    pub fn rows(&self) -> &[TimelineRow] {
        &self.rows
    }

    /// Number of rows, END sentinel included
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows at all
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Names of the forward-filled state columns
    pub fn state_columns(&self) -> &[String] {
        &self.state_columns
    }

    /// Channel names in first-seen row order, END excluded
    pub fn channel_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self.rows.iter().filter_map(|r| r.channel.name()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Rows of a single channel, in timeline order
    pub fn rows_for<'a>(&'a self, channel: &'a str) -> impl Iterator<Item = &'a TimelineRow> + 'a {
        self.rows.iter().filter(move |r| r.is_on(channel))
    }

    /// Row count per channel, END excluded
    pub fn events_per_channel(&self) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        for name in self.rows.iter().filter_map(|r| r.channel.name()) {
            *counts.entry(name).or_insert(0) += 1;
        }
        counts
    }

    /// Largest row time (the END sentinel for store-built tables)
    pub fn max_time(&self) -> Option<f64> {
        self.rows.iter().map(|r| r.time).reduce(f64::max)
    }

    /// Value of a state channel as of the given row
    pub fn state_at(&self, row: usize, channel: &str) -> Option<&EventValue> {
        let column = self.state_columns.iter().position(|c| c == channel)?;
        self.rows.get(row)?.state.get(column)?.as_ref()
    }

    /// Forward-filled series of a state channel, one entry per row
    pub fn state_series(&self, channel: &str) -> Option<Vec<Option<&EventValue>>> {
        let column = self.state_columns.iter().position(|c| c == channel)?;
        Some(
            self.rows
                .iter()
                .map(|r| r.state.get(column).and_then(Option::as_ref))
                .collect(),
        )
    }

    /// Copy of the table keeping only the rows matching `predicate`
    pub fn filter<F>(&self, mut predicate: F) -> Timeline
    where
        F: FnMut(&TimelineRow) -> bool,
    {
        Timeline {
            duration: self.duration,
            state_columns: self.state_columns.clone(),
            rows: self.rows.iter().filter(|r| predicate(r)).cloned().collect(),
        }
    }

    /// Aligned text rendering of the whole table
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

fn format_opt_value(value: Option<&EventValue>) -> String {
    value.map_or_else(|| "-".to_string(), ToString::to_string)
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut header = vec![
            "T".to_string(),
            "channel".to_string(),
            "value".to_string(),
            "previous_value".to_string(),
            "duration".to_string(),
        ];
        header.extend(self.state_columns.iter().cloned());

        let mut cells: Vec<Vec<String>> = vec![header];
        for row in &self.rows {
            let mut line = vec![
                row.time.to_string(),
                row.channel.to_string(),
                row.value.to_string(),
                format_opt_value(row.previous_value.as_ref()),
                row.duration_until_next
                    .map_or_else(|| "-".to_string(), |d| d.to_string()),
            ];
            line.extend(row.state.iter().map(|s| format_opt_value(s.as_ref())));
            cells.push(line);
        }

        let columns = cells[0].len();
        let widths: Vec<usize> = (0..columns)
            .map(|c| cells.iter().map(|line| line[c].len()).max().unwrap_or(0))
            .collect();

        for line in &cells {
            let rendered: Vec<String> = line
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:>width$}", cell, width = width))
                .collect();
            writeln!(f, "{}", rendered.join("  "))?;
        }
        Ok(())
    }
}
