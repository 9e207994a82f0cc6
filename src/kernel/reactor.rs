use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::dialogue::machine::{DialogueMachine, Outcome};
use super::dialogue::phrases;
use super::event::{CommandResult, TurnContext, TurnReply};
use super::scheduler::Effect;
use super::state::{ConversationSnapshot, DialogueMemory, MemoryDelta};
use super::telemetry::{FlowEventKind, TelemetryEvent, TelemetryRecorder, TelemetrySnapshot};
use super::time::{has_decayed, Clock, SystemClock};
use crate::config::EngineConfig;
use crate::services::dispatcher::{CommandDispatcher, Navigator};
use crate::services::speech::{listen_with_timeout, SpeechInput, SpeechOutput};

/// Identifies one conversation. Hosts usually pass their own user/tab id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct Session {
    memory: DialogueMemory,
    rng: StdRng,
}

type SessionMap = HashMap<SessionId, Arc<Mutex<Session>>>;

/// Drives the dialogue machine for many sessions.
///
/// Each session's memory sits behind its own async lock, held for the whole
/// turn (dispatch included), so turns on one session never interleave.
/// Sessions idle past the decay window are dropped when a new one starts.
pub struct ConversationEngine {
    config: EngineConfig,
    machine: DialogueMachine,
    sessions: StdMutex<SessionMap>,
    dispatcher: Arc<dyn CommandDispatcher>,
    navigator: Option<Arc<dyn Navigator>>,
    clock: Arc<dyn Clock>,
    telemetry: StdMutex<TelemetryRecorder>,
}

impl ConversationEngine {
    pub fn new(config: EngineConfig, dispatcher: Arc<dyn CommandDispatcher>) -> Self {
        Self {
            machine: DialogueMachine::new(&config),
            config,
            sessions: StdMutex::new(HashMap::new()),
            dispatcher,
            navigator: None,
            clock: Arc::new(SystemClock),
            telemetry: StdMutex::new(TelemetryRecorder::new()),
        }
    }

    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// One text turn.
    pub async fn process_transcript(&self, session: &SessionId, text: &str, ctx: &TurnContext) -> TurnReply {
        if text.trim().is_empty() {
            return TurnReply::say(phrases::DIDNT_CATCH);
        }

        let handle = self.session(session);
        let mut guard = handle.lock().await;
        let Session { memory, rng } = &mut *guard;
        self.recorder().record_turn(session.as_str());

        let now = self.clock.now();
        let idle = now.saturating_duration_since(memory.last_updated);
        if memory.decay_if_stale(now, self.config.decay_window()) {
            info!(session = %session, idle_secs = idle.as_secs(), "memory decayed");
            self.record(TelemetryEvent::MemoryDecayed {
                idle_ms: idle.as_millis() as u64,
            });
        }

        let before = memory.flow().phase();
        debug!(session = %session, phase = ?before, chars = text.len(), "turn");

        let outcome = {
            let mut telemetry = self.recorder();
            self.machine.step(memory, text, ctx, now, rng, &mut telemetry)
        };
        let reply = match outcome {
            Outcome::Reply(reply) => reply,
            Outcome::Execute(effect) => {
                let intent = effect.intent().clone();
                let result = self.run(effect).await;
                self.record(TelemetryEvent::Dispatch {
                    kind: intent.kind,
                    success: result.success,
                });
                // Dispatch may have taken a while; completion counts as activity now.
                let now = self.clock.now();
                let mut telemetry = self.recorder();
                self.machine.complete(memory, &intent, &result, now, rng, &mut telemetry)
            }
        };

        let after = memory.flow().phase();
        if before != after {
            debug!(session = %session, from = ?before, to = ?after, "flow transition");
            self.record(TelemetryEvent::FlowTransition { from: before, to: after });
        }
        reply
    }

    /// Runs an effect. Never fails: errors become a failed `CommandResult`.
    async fn run(&self, effect: Effect) -> CommandResult {
        match effect {
            Effect::Dispatch { intent, action, context } => {
                match self.dispatcher.dispatch(&action, &context).await {
                    Ok(Some(result)) => {
                        info!(action = %action.name, success = result.success, "dispatched");
                        result
                    }
                    Ok(None) => CommandResult::ok("").with_action(&action.name),
                    Err(err) => {
                        warn!(action = %action.name, error = %err, "dispatch failed");
                        CommandResult::failure(format!("Failed to {}: {}", intent.kind.verb(), err))
                            .with_action(&action.name)
                    }
                }
            }
            Effect::Navigate { intent, path } => match &self.navigator {
                Some(navigator) => {
                    info!(path = %path, "navigating");
                    navigator.navigate(&path).await;
                    CommandResult::ok(format!("Taking you to {path}.")).with_action(intent.kind.as_str())
                }
                None => {
                    warn!("navigation requested without a navigator");
                    CommandResult::failure(phrases::NAVIGATION_UNAVAILABLE).with_action(intent.kind.as_str())
                }
            },
        }
    }

    /// Voice turn: listen once (bounded), process, speak the reply.
    ///
    /// Listen failures keep the conversation where it was and ask again.
    pub async fn voice_turn(
        &self,
        session: &SessionId,
        input: &dyn SpeechInput,
        output: &dyn SpeechOutput,
        ctx: &TurnContext,
    ) -> TurnReply {
        let reply = match listen_with_timeout(input, self.config.listen_timeout()).await {
            Ok(text) => self.process_transcript(session, &text, ctx).await,
            Err(err) => {
                warn!(session = %session, error = %err, "listen failed");
                self.record(TelemetryEvent::Flow(FlowEventKind::ListenFailed));
                TurnReply::prompt(phrases::TROUBLE_HEARING)
            }
        };

        self.set_speaking(session, true).await;
        output.speak(&reply.response).await;
        self.set_speaking(session, false).await;
        reply
    }

    /// Read-only view of a session. Unknown sessions read as fresh and are not created.
    pub async fn conversation_state(&self, session: &SessionId) -> ConversationSnapshot {
        let now = self.clock.now();
        let Some(handle) = self.existing(session) else {
            return DialogueMemory::new(now).snapshot(now);
        };
        let guard = handle.lock().await;
        guard.memory.snapshot(now)
    }

    /// Forgets everything a session remembers. Unknown sessions are left alone.
    pub async fn reset_conversation_state(&self, session: &SessionId) {
        let Some(handle) = self.existing(session) else {
            debug!(session = %session, "reset of unknown session ignored");
            return;
        };
        let mut guard = handle.lock().await;
        guard.memory.reduce(MemoryDelta::Reset, self.clock.now());
        info!(session = %session, "memory reset");
        self.record(TelemetryEvent::MemoryReset);
    }

    /// Marks whether the assistant is currently talking (barge-in detection).
    ///
    /// Only `true` opens a session; clearing the flag on an unknown one is a no-op.
    pub async fn set_speaking(&self, session: &SessionId, speaking: bool) {
        let handle = if speaking {
            self.session(session)
        } else {
            match self.existing(session) {
                Some(handle) => handle,
                None => return,
            }
        };
        let mut guard = handle.lock().await;
        guard.memory.reduce(MemoryDelta::Speaking(speaking), self.clock.now());
    }

    /// Drops a session entirely.
    pub fn end_session(&self, session: &SessionId) -> bool {
        let removed = self.sessions_map().remove(session).is_some();
        self.recorder().forget_session(session.as_str());
        removed
    }

    pub fn session_count(&self) -> usize {
        self.sessions_map().len()
    }

    /// Turns processed for a live session since it was opened.
    pub fn turns_for(&self, session: &SessionId) -> u64 {
        self.recorder().turns_for(session.as_str())
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.recorder().snapshot()
    }

    fn existing(&self, id: &SessionId) -> Option<Arc<Mutex<Session>>> {
        self.sessions_map().get(id).cloned()
    }

    fn session(&self, id: &SessionId) -> Arc<Mutex<Session>> {
        let mut sessions = self.sessions_map();
        if let Some(handle) = sessions.get(id) {
            return handle.clone();
        }

        let now = self.clock.now();
        self.evict_decayed(&mut sessions, now);

        debug!(session = %id, "new session");
        let handle = Arc::new(Mutex::new(Session {
            memory: DialogueMemory::new(now),
            rng: self.session_rng(id),
        }));
        sessions.insert(id.clone(), handle.clone());
        handle
    }

    /// Removes sessions idle past the decay window that no turn is using.
    /// Their memory would be wiped on the next turn anyway.
    fn evict_decayed(&self, sessions: &mut SessionMap, now: Instant) {
        let window = self.config.decay_window();
        let mut evicted = Vec::new();
        sessions.retain(|id, handle| {
            // Handles are only cloned under the map lock, so a count of one means idle.
            if Arc::strong_count(handle) > 1 {
                return true;
            }
            let Ok(session) = handle.try_lock() else {
                return true;
            };
            if has_decayed(session.memory.last_updated, now, window) {
                evicted.push(id.clone());
                return false;
            }
            true
        });

        if evicted.is_empty() {
            return;
        }
        info!(count = evicted.len(), "evicted decayed sessions");
        let mut recorder = self.recorder();
        for id in &evicted {
            recorder.forget_session(id.as_str());
        }
    }

    fn session_rng(&self, id: &SessionId) -> StdRng {
        match self.config.rng_seed {
            Some(seed) => {
                let mut hasher = DefaultHasher::new();
                id.hash(&mut hasher);
                StdRng::seed_from_u64(seed ^ hasher.finish())
            }
            None => StdRng::from_entropy(),
        }
    }

    fn sessions_map(&self) -> MutexGuard<'_, SessionMap> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn recorder(&self) -> MutexGuard<'_, TelemetryRecorder> {
        self.telemetry.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, event: TelemetryEvent) {
        self.recorder().record(event);
    }
}
