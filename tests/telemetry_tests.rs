use std::collections::VecDeque;

use parley::kernel::intent::IntentKind;
use parley::kernel::state::FlowPhase;
use parley::kernel::telemetry::{
    compute_snapshot, FlowEventKind, InterruptionResolution, TelemetryEvent, TelemetryRecorder,
};

#[test]
fn test_snapshot_aggregates_counts() {
    let events: VecDeque<TelemetryEvent> = vec![
        TelemetryEvent::IntentClassified { kind: IntentKind::CreateTask },
        TelemetryEvent::IntentClassified { kind: IntentKind::Unknown },
        TelemetryEvent::FlowTransition { from: FlowPhase::Idle, to: FlowPhase::Collecting },
        TelemetryEvent::FlowTransition { from: FlowPhase::Collecting, to: FlowPhase::Confirming },
        TelemetryEvent::Interruption { resolution: InterruptionResolution::Raised },
        TelemetryEvent::Interruption { resolution: InterruptionResolution::Switched },
        TelemetryEvent::Dispatch { kind: IntentKind::CreateTask, success: true },
        TelemetryEvent::Dispatch { kind: IntentKind::CreateNote, success: false },
        TelemetryEvent::Flow(FlowEventKind::SuggestionOffered),
        TelemetryEvent::MemoryDecayed { idle_ms: 130_000 },
        TelemetryEvent::MemoryDecayed { idle_ms: 150_000 },
    ]
    .into();

    let snap = compute_snapshot(&events);
    assert_eq!(snap.intent_stats.classified, 2);
    assert_eq!(snap.intent_stats.unknown, 1);
    assert_eq!(snap.intent_stats.by_kind.get("createTask"), Some(&1));
    assert_eq!(snap.flow_stats.transitions, 2);
    assert_eq!(snap.flow_stats.prompts, 1);
    assert_eq!(snap.flow_stats.confirmations, 1);
    assert_eq!(snap.flow_stats.suggestions, 1);
    assert_eq!(snap.interruption_stats.raised, 1);
    assert_eq!(snap.interruption_stats.switched, 1);
    assert_eq!(snap.dispatch_stats.total, 2);
    assert_eq!(snap.dispatch_stats.success_rate, 0.5);
    assert_eq!(snap.memory_stats.decays, 2);
    assert_eq!(snap.memory_stats.avg_idle_before_decay_ms, 140_000.0);
}

#[test]
fn test_recorder_is_bounded() {
    let mut recorder = TelemetryRecorder::new();
    for _ in 0..10_050 {
        recorder.record(TelemetryEvent::MemoryReset);
    }
    assert_eq!(recorder.len(), 10_000);
    assert_eq!(recorder.snapshot().memory_stats.resets, 10_000);

    recorder.clear();
    assert!(recorder.is_empty());
}

#[test]
fn test_events_carry_no_text() {
    // Every event serializes to kinds and numbers only.
    let event = TelemetryEvent::IntentClassified { kind: IntentKind::CreateProject };
    let json = serde_json::to_string(&event).unwrap();
    assert_eq!(json, r#"{"IntentClassified":{"kind":"createProject"}}"#);
}

#[test]
fn test_session_tallies() {
    let mut recorder = TelemetryRecorder::with_capacity(2);
    recorder.record_turn("alice");
    recorder.record_turn("alice");
    recorder.record_turn("bob");
    assert_eq!(recorder.turns_for("alice"), 2);
    assert_eq!(recorder.turns_for("carol"), 0);
    assert_eq!(recorder.tracked_sessions(), 2);

    for _ in 0..3 {
        recorder.record(TelemetryEvent::MemoryReset);
    }
    assert_eq!(recorder.len(), 2);
    recorder.clear();
    assert_eq!(recorder.turns_for("alice"), 2, "clearing events keeps tallies");

    assert!(recorder.forget_session("alice"));
    assert!(!recorder.forget_session("alice"));
    assert_eq!(recorder.tracked_sessions(), 1);
}
