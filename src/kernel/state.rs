use crate::kernel::dialogue::suggest::Suggestion;
use crate::kernel::intent::{Intent, IntentKind, SlotMap};
use crate::kernel::time::has_decayed;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Where the conversation is inside a command.
///
/// The pending intent only exists inside the variants that need it, so
/// "awaiting a field" and "has a pending intent" can never disagree.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Idle,
    /// Gathering `missing[cursor..]` for `pending`, one turn per slot.
    Collecting {
        pending: Intent,
        missing: Vec<String>,
        cursor: usize,
    },
    /// Waiting for a yes/no before running `pending`.
    Confirming { pending: Intent },
    /// A new intent arrived mid-flow; asking whether to switch.
    Interrupted { paused: Box<Flow>, incoming: Intent },
}

impl Default for Flow {
    fn default() -> Self {
        Flow::Idle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlowPhase {
    Idle,
    Collecting,
    Confirming,
    Interrupted,
}

impl Flow {
    pub fn phase(&self) -> FlowPhase {
        match self {
            Flow::Idle => FlowPhase::Idle,
            Flow::Collecting { .. } => FlowPhase::Collecting,
            Flow::Confirming { .. } => FlowPhase::Confirming,
            Flow::Interrupted { .. } => FlowPhase::Interrupted,
        }
    }

    /// The intent under construction, if any.
    pub fn pending_intent(&self) -> Option<&Intent> {
        match self {
            Flow::Collecting { pending, .. } | Flow::Confirming { pending } => Some(pending),
            Flow::Idle | Flow::Interrupted { .. } => None,
        }
    }

    pub fn awaiting_field(&self) -> Option<&str> {
        match self {
            Flow::Collecting { missing, cursor, .. } => missing.get(*cursor).map(String::as_str),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub intent: IntentKind,
    pub data: SlotMap,
}

/// Strict memory delta. This is the ONLY way dialogue memory mutates.
#[derive(Debug, Clone)]
pub enum MemoryDelta {
    FlowChanged(Flow),
    IntentObserved(IntentKind),
    ClassificationFailed,
    ActiveProject(String),
    LastTask(String),
    SuggestionOffered(Suggestion),
    SuggestionCleared,
    /// A command ran successfully.
    Completed(HistoryEntry),
    Speaking(bool),
    Reset,
}

/// Short-term conversational context for one session.
#[derive(Debug, Clone)]
pub struct DialogueMemory {
    pub active_project: Option<String>,
    pub last_task: Option<String>,
    pub last_intent: Option<IntentKind>,
    history: Vec<HistoryEntry>,
    flow: Flow,
    pub was_interrupted: bool,
    pub last_suggestion: Option<Suggestion>,
    pub personality_counter: u32,
    pub is_speaking: bool,
    pub consecutive_failures: u32,
    pub last_updated: Instant,
    // Monotonic, survives resets
    pub version: u64,
}

impl DialogueMemory {
    pub fn new(now: Instant) -> Self {
        Self {
            active_project: None,
            last_task: None,
            last_intent: None,
            history: Vec::new(),
            flow: Flow::Idle,
            was_interrupted: false,
            last_suggestion: None,
            personality_counter: 0,
            is_speaking: false,
            consecutive_failures: 0,
            last_updated: now,
            version: 0,
        }
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// The most recent `n` entries, oldest first.
    pub fn recent_history(&self, n: usize) -> &[HistoryEntry] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    /// Pure reduction: Memory + Delta -> Mutated Memory. Every delta counts as activity.
    pub fn reduce(&mut self, delta: MemoryDelta, now: Instant) {
        self.version += 1;
        self.last_updated = now;

        match delta {
            MemoryDelta::FlowChanged(flow) => {
                if matches!(flow, Flow::Interrupted { .. }) {
                    self.was_interrupted = true;
                }
                self.flow = flow;
            }
            MemoryDelta::IntentObserved(kind) => {
                self.last_intent = Some(kind);
                self.consecutive_failures = 0;
            }
            MemoryDelta::ClassificationFailed => {
                self.last_intent = Some(IntentKind::Unknown);
                self.consecutive_failures += 1;
            }
            MemoryDelta::ActiveProject(project) => {
                self.active_project = Some(project);
            }
            MemoryDelta::LastTask(task) => {
                self.last_task = Some(task);
            }
            MemoryDelta::SuggestionOffered(suggestion) => {
                self.last_suggestion = Some(suggestion);
            }
            MemoryDelta::SuggestionCleared => {
                self.last_suggestion = None;
            }
            MemoryDelta::Completed(entry) => {
                self.last_intent = Some(entry.intent);
                self.history.push(entry);
                self.personality_counter += 1;
            }
            MemoryDelta::Speaking(speaking) => {
                self.is_speaking = speaking;
            }
            MemoryDelta::Reset => {
                let version = self.version;
                *self = Self::new(now);
                self.version = version;
            }
        }
    }

    /// Lazy decay: forgets everything if the last activity is older than `window`.
    /// Returns true when a reset happened.
    pub fn decay_if_stale(&mut self, now: Instant, window: Duration) -> bool {
        if has_decayed(self.last_updated, now, window) {
            self.reduce(MemoryDelta::Reset, now);
            return true;
        }
        false
    }

    /// Read-only view for debugging and telemetry. Not for driving logic.
    pub fn snapshot(&self, now: Instant) -> ConversationSnapshot {
        let (awaiting_confirmation, interrupted_intent, incoming_intent) = match &self.flow {
            Flow::Interrupted { paused, incoming } => {
                (true, paused.pending_intent().cloned(), Some(incoming.clone()))
            }
            _ => (false, None, None),
        };

        ConversationSnapshot {
            active_project: self.active_project.clone(),
            last_task: self.last_task.clone(),
            last_intent: self.last_intent,
            history: self.history.clone(),
            phase: self.flow.phase(),
            awaiting_field: self.flow.awaiting_field().map(str::to_string),
            pending_intent: self.flow.pending_intent().cloned(),
            confirming: matches!(self.flow, Flow::Confirming { .. }),
            awaiting_confirmation,
            interrupted_intent,
            incoming_intent,
            was_interrupted: self.was_interrupted,
            last_suggestion: self.last_suggestion.as_ref().map(|s| s.phrase.clone()),
            last_suggestion_intent: self.last_suggestion.as_ref().map(|s| s.replay.kind),
            personality_counter: self.personality_counter,
            is_speaking: self.is_speaking,
            consecutive_failures: self.consecutive_failures,
            idle_ms: now.saturating_duration_since(self.last_updated).as_millis() as u64,
            version: self.version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSnapshot {
    pub active_project: Option<String>,
    pub last_task: Option<String>,
    pub last_intent: Option<IntentKind>,
    pub history: Vec<HistoryEntry>,
    pub phase: FlowPhase,
    pub awaiting_field: Option<String>,
    pub pending_intent: Option<Intent>,
    pub confirming: bool,
    /// Waiting for the user to decide between the paused flow and a new intent.
    pub awaiting_confirmation: bool,
    pub interrupted_intent: Option<Intent>,
    pub incoming_intent: Option<Intent>,
    pub was_interrupted: bool,
    pub last_suggestion: Option<String>,
    pub last_suggestion_intent: Option<IntentKind>,
    pub personality_counter: u32,
    pub is_speaking: bool,
    pub consecutive_failures: u32,
    pub idle_ms: u64,
    pub version: u64,
}
