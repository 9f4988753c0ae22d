//! Event Timeline Library
//!
//! Models a sparse, irregularly-timed event log made of named channels and
//! normalizes it into a canonical timeline suitable for inspection and plotting.
//!
//! # Architecture
//!
//! - [`EventStore`] owns the channels and the raw event log and validates
//!   every insertion
//! - Reconciliation sorts, deduplicates and annotates the log into a
//!   [`Timeline`] (computed lazily, memoized until the next mutation)
//! - [`TimelineRenderer`] maps a timeline onto a channel-lane plot through the
//!   [`Canvas`] trait
//!
//! Two kinds of channels exist:
//! - `State` channels hold a value until the next event (drawn as steps)
//! - `Trigger` channels mark instantaneous occurrences (drawn as ticks)
//!
//! # Example Usage
//!
//! ```
//! use event_timeline::{ChannelKind, DisplayOptions, EventStore, RecordingCanvas, RenderConfig};
//!
//! let mut store = EventStore::new(100.0).unwrap();
//! store.add_channel("reward", ChannelKind::State, Some(0.into())).unwrap();
//! store.add_channel("spike", ChannelKind::Trigger, None).unwrap();
//!
//! store.add_event(4.0, "reward", 4.into()).unwrap();
//! store.add_event(10.0, "reward", 2.into()).unwrap();
//! store.add_event(9.0, "spike", None::<f64>.into()).unwrap();
//!
//! println!("{}", store.summary());
//! println!("{}", store.to_text());
//!
//! // Keep only reward increases and draw them as ticks
//! let table = store.table();
//! let increases = table.filter(|row| {
//!     !row.is_on("reward")
//!         || matches!(
//!             (row.value.as_f64(), row.previous_value.as_ref().and_then(|v| v.as_f64())),
//!             (Some(v), Some(p)) if v > p
//!         )
//! });
//!
//! let mut canvas = RecordingCanvas::new();
//! let report = event_timeline::render(&increases, &DisplayOptions::new(), &mut canvas);
//! assert_eq!(report.lanes.len(), 2);
//!
//! store.draw(&mut canvas, RenderConfig::new());
//! ```

// Public modules
pub mod channels;
pub mod config;
pub mod render;
pub mod store;
pub mod timeline;
pub mod types;

// Internal modules (not exposed in public API)
mod reconcile;

// Re-export main types for convenience
pub use channels::ChannelRegistry;
pub use config::{ChannelDisplay, DisplayOptions, RenderConfig};
pub use render::{
    render, Canvas, DrawCommand, Lane, RecordingCanvas, RenderError, RenderReport,
    TimelineRenderer,
};
pub use store::EventStore;
pub use timeline::{RowChannel, Timeline, TimelineRow};
pub use types::{Channel, ChannelKind, EventValue, RawEvent, Result, TimelineError, END_CHANNEL};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
