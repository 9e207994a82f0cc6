use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Short-term memory window. Context older than this is forgotten.
pub const DECAY_WINDOW: Duration = Duration::from_secs(120);

/// Source of "now" for the engine. Decay is checked lazily against it.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Used by tests and replay harnesses.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// True when `last` is further than `window` behind `now`.
pub fn has_decayed(last: Instant, now: Instant, window: Duration) -> bool {
    now.saturating_duration_since(last) > window
}
