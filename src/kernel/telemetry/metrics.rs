use super::event::{FlowEventKind, InterruptionResolution, TelemetryEvent};
use crate::kernel::intent::IntentKind;
use crate::kernel::state::FlowPhase;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    pub intent_stats: IntentStats,
    pub flow_stats: FlowStats,
    pub interruption_stats: InterruptionStats,
    pub dispatch_stats: DispatchStats,
    pub memory_stats: MemoryStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentStats {
    pub classified: u64,
    pub unknown: u64,
    pub by_kind: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStats {
    pub transitions: u64,
    pub prompts: u64,
    pub confirmations: u64,
    pub cancellations: u64,
    pub suggestions: u64,
    pub listen_failures: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterruptionStats {
    pub raised: u64,
    pub switched: u64,
    pub resumed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchStats {
    pub total: u64,
    pub failed: u64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub decays: u64,
    pub resets: u64,
    pub avg_idle_before_decay_ms: f64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();
    let mut total_idle_ms = 0u64;

    for event in events {
        match event {
            TelemetryEvent::IntentClassified { kind } => {
                snap.intent_stats.classified += 1;
                if *kind == IntentKind::Unknown {
                    snap.intent_stats.unknown += 1;
                }
                *snap.intent_stats.by_kind.entry(kind.as_str().to_string()).or_default() += 1;
            }
            TelemetryEvent::FlowTransition { to, .. } => {
                snap.flow_stats.transitions += 1;
                match to {
                    FlowPhase::Collecting => snap.flow_stats.prompts += 1,
                    FlowPhase::Confirming => snap.flow_stats.confirmations += 1,
                    FlowPhase::Idle | FlowPhase::Interrupted => {}
                }
            }
            TelemetryEvent::Interruption { resolution } => match resolution {
                InterruptionResolution::Raised => snap.interruption_stats.raised += 1,
                InterruptionResolution::Switched => snap.interruption_stats.switched += 1,
                InterruptionResolution::Resumed => snap.interruption_stats.resumed += 1,
            },
            TelemetryEvent::Dispatch { success, .. } => {
                snap.dispatch_stats.total += 1;
                if !success {
                    snap.dispatch_stats.failed += 1;
                }
            }
            TelemetryEvent::Flow(kind) => match kind {
                FlowEventKind::ListenFailed => snap.flow_stats.listen_failures += 1,
                FlowEventKind::SuggestionOffered => snap.flow_stats.suggestions += 1,
                FlowEventKind::Cancelled => snap.flow_stats.cancellations += 1,
            },
            TelemetryEvent::MemoryDecayed { idle_ms } => {
                snap.memory_stats.decays += 1;
                total_idle_ms += idle_ms;
            }
            TelemetryEvent::MemoryReset => snap.memory_stats.resets += 1,
        }
    }

    if snap.dispatch_stats.total > 0 {
        let succeeded = snap.dispatch_stats.total - snap.dispatch_stats.failed;
        snap.dispatch_stats.success_rate = succeeded as f64 / snap.dispatch_stats.total as f64;
    }
    if snap.memory_stats.decays > 0 {
        snap.memory_stats.avg_idle_before_decay_ms = total_idle_ms as f64 / snap.memory_stats.decays as f64;
    }

    snap
}
