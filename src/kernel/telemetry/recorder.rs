use super::event::TelemetryEvent;
use super::metrics::{compute_snapshot, TelemetrySnapshot};
use std::collections::{HashMap, VecDeque};

const DEFAULT_CAPACITY: usize = 10_000;

/// Bounded log of conversation events plus a turn tally per live session.
///
/// The tally is keyed by the host's session id and only ever holds counts.
#[derive(Debug)]
pub struct TelemetryRecorder {
    capacity: usize,
    events: VecDeque<TelemetryEvent>,
    turns: HashMap<String, u64>,
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            events: VecDeque::with_capacity(capacity),
            turns: HashMap::new(),
        }
    }

    /// Oldest events fall off once the log is full.
    pub fn record(&mut self, event: TelemetryEvent) {
        if self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn record_turn(&mut self, session: &str) {
        *self.turns.entry(session.to_string()).or_default() += 1;
    }

    pub fn turns_for(&self, session: &str) -> u64 {
        self.turns.get(session).copied().unwrap_or(0)
    }

    /// Drops the tally of an ended or evicted session.
    pub fn forget_session(&mut self, session: &str) -> bool {
        self.turns.remove(session).is_some()
    }

    pub fn tracked_sessions(&self) -> usize {
        self.turns.len()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> impl Iterator<Item = &TelemetryEvent> {
        self.events.iter()
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        compute_snapshot(&self.events)
    }

    /// Clears the event log. Session tallies survive; they follow session lifetime.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
