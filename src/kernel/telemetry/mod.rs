//! Conversation telemetry.
//!
//! Telemetry is a read-only side-effect layer: nothing in the dialogue machine
//! reads it back. Events carry kinds, phases and counts only, never user text.

pub mod event;
pub mod metrics;
pub mod recorder;

pub use event::{FlowEventKind, InterruptionResolution, TelemetryEvent};
pub use metrics::{compute_snapshot, TelemetrySnapshot};
pub use recorder::TelemetryRecorder;
