use crate::kernel::intent::IntentKind;
use crate::kernel::state::FlowPhase;
use serde::{Deserialize, Serialize};

// Allowed: kinds, phases, counts, durations
// Forbidden: utterances, slot values, project names

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    IntentClassified {
        kind: IntentKind,
    },

    FlowTransition {
        from: FlowPhase,
        to: FlowPhase,
    },

    Interruption {
        resolution: InterruptionResolution,
    },

    Dispatch {
        kind: IntentKind,
        success: bool,
    },

    Flow(FlowEventKind),

    MemoryDecayed {
        idle_ms: u64,
    },

    MemoryReset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterruptionResolution {
    /// Switch question asked; outcome still open.
    Raised,
    Switched,
    Resumed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowEventKind {
    ListenFailed,
    SuggestionOffered,
    Cancelled,
}
