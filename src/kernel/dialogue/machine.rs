use super::affirmation::{read_answer, Answer};
use super::phrases;
use super::prompts::{confirmation, field_prompt, list_label, switch_question};
use super::suggest::suggest;
use crate::config::EngineConfig;
use crate::kernel::event::{CommandResult, TurnContext, TurnReply};
use crate::kernel::intent::catalog::normalize_list;
use crate::kernel::intent::{apply_classification, validate, Intent, IntentClassifier, IntentKind};
use crate::kernel::scheduler::{Effect, Scheduler};
use crate::kernel::state::{DialogueMemory, Flow, HistoryEntry, MemoryDelta};
use crate::kernel::telemetry::{FlowEventKind, InterruptionResolution, TelemetryEvent, TelemetryRecorder};
use rand::Rng;
use std::time::Instant;
use tracing::{debug, info};

const CANCEL_WORDS: &[&str] = &["cancel", "stop", "never mind", "nevermind", "abort"];

/// Result of one step of the dialogue machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Say this and wait for the next utterance.
    Reply(TurnReply),
    /// Run this, then feed the result to `DialogueMachine::complete`.
    Execute(Effect),
}

/// The single dialogue state machine.
///
/// `step` mutates memory only through `DialogueMemory::reduce` and never awaits;
/// execution is handed back to the driver as an `Effect`.
pub struct DialogueMachine {
    classifier: IntentClassifier,
    scheduler: Scheduler,
    interrupt_threshold: f32,
    history_window: usize,
    encouragement_every: u32,
}

impl Default for DialogueMachine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl DialogueMachine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            classifier: IntentClassifier::new(config.confidence_threshold),
            scheduler: Scheduler,
            interrupt_threshold: config.interrupt_threshold,
            history_window: config.history_window,
            encouragement_every: config.encouragement_every,
        }
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    /// One user turn: (memory, utterance) -> (memory', outcome).
    pub fn step<R: Rng + ?Sized>(
        &self,
        memory: &mut DialogueMemory,
        text: &str,
        ctx: &TurnContext,
        now: Instant,
        rng: &mut R,
        telemetry: &mut TelemetryRecorder,
    ) -> Outcome {
        let input = text.trim();
        if input.is_empty() {
            return Outcome::Reply(TurnReply::say(phrases::DIDNT_CATCH));
        }

        match memory.flow().clone() {
            Flow::Idle => self.on_idle(memory, input, ctx, now, rng, telemetry),
            Flow::Collecting { pending, missing, cursor } => {
                self.on_field(memory, pending, missing, cursor, input, ctx, now, rng, telemetry)
            }
            Flow::Confirming { pending } => {
                self.on_confirmation(memory, pending, input, ctx, now, rng, telemetry)
            }
            Flow::Interrupted { paused, incoming } => {
                self.on_switch_answer(memory, *paused, incoming, input, ctx, now, rng, telemetry)
            }
        }
    }

    /// Starts a flow from an already classified intent, discarding any flow in progress.
    pub fn handle_intent_progressively<R: Rng + ?Sized>(
        &self,
        memory: &mut DialogueMemory,
        intent: Intent,
        ctx: &TurnContext,
        now: Instant,
        rng: &mut R,
        telemetry: &mut TelemetryRecorder,
    ) -> Outcome {
        if !matches!(memory.flow(), Flow::Idle) {
            memory.reduce(MemoryDelta::FlowChanged(Flow::Idle), now);
        }
        for delta in apply_classification(&intent) {
            memory.reduce(delta, now);
        }
        self.begin(memory, intent, ctx, now, rng, telemetry)
    }

    /// Answers the field currently being collected.
    pub fn handle_field_response<R: Rng + ?Sized>(
        &self,
        memory: &mut DialogueMemory,
        text: &str,
        ctx: &TurnContext,
        now: Instant,
        rng: &mut R,
        telemetry: &mut TelemetryRecorder,
    ) -> Outcome {
        if !matches!(memory.flow(), Flow::Collecting { .. }) {
            return self.start_over(memory, now);
        }
        self.step(memory, text, ctx, now, rng, telemetry)
    }

    /// Answers a pending confirmation (command or switch question).
    pub fn handle_confirmation_response<R: Rng + ?Sized>(
        &self,
        memory: &mut DialogueMemory,
        text: &str,
        ctx: &TurnContext,
        now: Instant,
        rng: &mut R,
        telemetry: &mut TelemetryRecorder,
    ) -> Outcome {
        if !matches!(memory.flow(), Flow::Confirming { .. } | Flow::Interrupted { .. }) {
            return self.start_over(memory, now);
        }
        self.step(memory, text, ctx, now, rng, telemetry)
    }

    fn on_idle<R: Rng + ?Sized>(
        &self,
        memory: &mut DialogueMemory,
        input: &str,
        ctx: &TurnContext,
        now: Instant,
        rng: &mut R,
        telemetry: &mut TelemetryRecorder,
    ) -> Outcome {
        let intent = self.classifier.classify(input);
        telemetry.record(TelemetryEvent::IntentClassified { kind: intent.kind });

        if let Some(suggestion) = memory.last_suggestion.clone() {
            memory.reduce(MemoryDelta::SuggestionCleared, now);
            // A confident new command wins over a yes/no reading of the same words.
            let weak = intent.kind == IntentKind::Unknown || intent.confidence < self.interrupt_threshold;
            if weak {
                match read_answer(input) {
                    Answer::Yes => {
                        debug!(kind = %suggestion.replay.kind, "replaying suggestion");
                        memory.reduce(MemoryDelta::IntentObserved(suggestion.replay.kind), now);
                        return self.begin(memory, suggestion.replay, ctx, now, rng, telemetry);
                    }
                    Answer::No => {
                        return Outcome::Reply(TurnReply::done(phrases::acknowledgement(rng), true));
                    }
                    Answer::Unclear => {}
                }
            }
        }

        for delta in apply_classification(&intent) {
            memory.reduce(delta, now);
        }
        self.begin(memory, intent, ctx, now, rng, telemetry)
    }

    fn begin<R: Rng + ?Sized>(
        &self,
        memory: &mut DialogueMemory,
        intent: Intent,
        ctx: &TurnContext,
        now: Instant,
        rng: &mut R,
        telemetry: &mut TelemetryRecorder,
    ) -> Outcome {
        match intent.kind {
            IntentKind::Unknown => {
                let text = if memory.consecutive_failures >= 2 {
                    phrases::fallback_help(rng)
                } else {
                    phrases::clarify(rng)
                };
                Outcome::Reply(TurnReply {
                    success: Some(false),
                    ..TurnReply::say(text)
                })
            }
            IntentKind::Help => Outcome::Reply(TurnReply::done(phrases::fallback_help(rng), true)),
            IntentKind::QueryHistory => Outcome::Reply(TurnReply::done(self.history_summary(memory), true)),
            IntentKind::ResetMemory => {
                info!("memory reset requested");
                memory.reduce(MemoryDelta::Reset, now);
                telemetry.record(TelemetryEvent::MemoryReset);
                Outcome::Reply(TurnReply::done(phrases::MEMORY_CLEARED, true))
            }
            _ => {
                let validation = validate(&intent);
                match validation.missing_fields.first() {
                    Some(field) => {
                        let prompt = field_prompt(intent.kind, field, rng);
                        debug!(kind = %intent.kind, missing = validation.missing_fields.len(), "collecting");
                        memory.reduce(
                            MemoryDelta::FlowChanged(Flow::Collecting {
                                pending: intent,
                                missing: validation.missing_fields,
                                cursor: 0,
                            }),
                            now,
                        );
                        Outcome::Reply(TurnReply::prompt(prompt))
                    }
                    None => self.ready(memory, intent, ctx, now),
                }
            }
        }
    }

    /// Complete intent: confirm state changes, run everything else.
    fn ready(&self, memory: &mut DialogueMemory, intent: Intent, ctx: &TurnContext, now: Instant) -> Outcome {
        if intent.kind.requires_confirmation() {
            let question = confirmation(&intent);
            memory.reduce(MemoryDelta::FlowChanged(Flow::Confirming { pending: intent }), now);
            return Outcome::Reply(TurnReply::prompt(question));
        }
        self.execute(memory, intent, ctx, now)
    }

    fn execute(&self, memory: &mut DialogueMemory, intent: Intent, ctx: &TurnContext, now: Instant) -> Outcome {
        if !matches!(memory.flow(), Flow::Idle) {
            memory.reduce(MemoryDelta::FlowChanged(Flow::Idle), now);
        }
        let kind = intent.kind;
        match self.scheduler.schedule(intent, memory, ctx) {
            Some(effect) => Outcome::Execute(effect),
            None if kind == IntentKind::ConfirmRedirect => Outcome::Reply(TurnReply::done(
                "There's no project to open yet. Try creating one first.",
                false,
            )),
            None => Outcome::Reply(TurnReply::done(format!("I can't {} right now.", kind.verb()), false)),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn on_field<R: Rng + ?Sized>(
        &self,
        memory: &mut DialogueMemory,
        mut pending: Intent,
        missing: Vec<String>,
        cursor: usize,
        input: &str,
        ctx: &TurnContext,
        now: Instant,
        rng: &mut R,
        telemetry: &mut TelemetryRecorder,
    ) -> Outcome {
        let Some(field) = missing.get(cursor).cloned() else {
            return self.start_over(memory, now);
        };

        if is_cancel(input) {
            memory.reduce(MemoryDelta::FlowChanged(Flow::Idle), now);
            telemetry.record(TelemetryEvent::Flow(FlowEventKind::Cancelled));
            return Outcome::Reply(TurnReply {
                is_complete: true,
                ..TurnReply::say(phrases::cancelled(rng))
            });
        }

        if let Some(incoming) = self.interruption(&pending, input) {
            return self.pause(memory, Flow::Collecting { pending, missing, cursor }, incoming, now, telemetry);
        }

        let value = if field == "listType" {
            match normalize_list(input) {
                Some(list) => list.to_string(),
                None => {
                    debug!(field = %field, "unrecognized list type, asking again");
                    let prompt = field_prompt(pending.kind, &field, rng);
                    memory.reduce(MemoryDelta::FlowChanged(Flow::Collecting { pending, missing, cursor }), now);
                    return Outcome::Reply(TurnReply::prompt(prompt));
                }
            }
        } else {
            input.to_string()
        };
        pending.set_slot(&field, &value);

        let cursor = cursor + 1;
        if let Some(next) = missing.get(cursor) {
            let prompt = field_prompt(pending.kind, next, rng);
            memory.reduce(MemoryDelta::FlowChanged(Flow::Collecting { pending, missing, cursor }), now);
            return Outcome::Reply(TurnReply::prompt(prompt));
        }

        self.ready(memory, pending, ctx, now)
    }

    #[allow(clippy::too_many_arguments)]
    fn on_confirmation<R: Rng + ?Sized>(
        &self,
        memory: &mut DialogueMemory,
        pending: Intent,
        input: &str,
        ctx: &TurnContext,
        now: Instant,
        rng: &mut R,
        telemetry: &mut TelemetryRecorder,
    ) -> Outcome {
        match read_answer(input) {
            Answer::Yes => self.execute(memory, pending, ctx, now),
            Answer::No => {
                memory.reduce(MemoryDelta::FlowChanged(Flow::Idle), now);
                telemetry.record(TelemetryEvent::Flow(FlowEventKind::Cancelled));
                Outcome::Reply(TurnReply {
                    is_complete: true,
                    ..TurnReply::say(phrases::cancelled(rng))
                })
            }
            Answer::Unclear => {
                // Barge-in: talking over the read-back with a different command.
                if memory.is_speaking {
                    if let Some(incoming) = self.interruption(&pending, input) {
                        return self.pause(memory, Flow::Confirming { pending }, incoming, now, telemetry);
                    }
                }
                Outcome::Reply(TurnReply::prompt(confirmation(&pending)))
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn on_switch_answer<R: Rng + ?Sized>(
        &self,
        memory: &mut DialogueMemory,
        paused: Flow,
        incoming: Intent,
        input: &str,
        ctx: &TurnContext,
        now: Instant,
        rng: &mut R,
        telemetry: &mut TelemetryRecorder,
    ) -> Outcome {
        match read_answer(input) {
            Answer::Yes => {
                info!(kind = %incoming.kind, "switching to interrupting intent");
                telemetry.record(TelemetryEvent::Interruption {
                    resolution: InterruptionResolution::Switched,
                });
                memory.reduce(MemoryDelta::FlowChanged(Flow::Idle), now);
                for delta in apply_classification(&incoming) {
                    memory.reduce(delta, now);
                }
                self.begin(memory, incoming, ctx, now, rng, telemetry)
            }
            Answer::No => {
                info!("resuming paused flow");
                let prompt = match &paused {
                    Flow::Collecting { pending, missing, cursor } => match missing.get(*cursor) {
                        Some(field) => field_prompt(pending.kind, field, rng),
                        None => return self.start_over(memory, now),
                    },
                    Flow::Confirming { pending } => confirmation(pending),
                    Flow::Idle | Flow::Interrupted { .. } => return self.start_over(memory, now),
                };
                memory.reduce(MemoryDelta::FlowChanged(paused), now);
                telemetry.record(TelemetryEvent::Interruption {
                    resolution: InterruptionResolution::Resumed,
                });
                Outcome::Reply(TurnReply::prompt(prompt))
            }
            Answer::Unclear => {
                let paused_kind = paused.pending_intent().map(|i| i.kind).unwrap_or(IntentKind::Unknown);
                Outcome::Reply(TurnReply::prompt(switch_question(paused_kind, &incoming)))
            }
        }
    }

    /// A confident, different intent arriving mid-flow.
    fn interruption(&self, pending: &Intent, input: &str) -> Option<Intent> {
        let incoming = self.classifier.classify(input);
        let interrupts = incoming.kind != IntentKind::Unknown
            && incoming.kind != pending.kind
            && incoming.confidence >= self.interrupt_threshold;
        interrupts.then_some(incoming)
    }

    fn pause(
        &self,
        memory: &mut DialogueMemory,
        paused: Flow,
        incoming: Intent,
        now: Instant,
        telemetry: &mut TelemetryRecorder,
    ) -> Outcome {
        let paused_kind = paused.pending_intent().map(|i| i.kind).unwrap_or(IntentKind::Unknown);
        info!(paused = %paused_kind, incoming = %incoming.kind, "flow interrupted");
        let question = switch_question(paused_kind, &incoming);
        telemetry.record(TelemetryEvent::Interruption {
            resolution: InterruptionResolution::Raised,
        });
        memory.reduce(
            MemoryDelta::FlowChanged(Flow::Interrupted {
                paused: Box::new(paused),
                incoming,
            }),
            now,
        );
        Outcome::Reply(TurnReply::prompt(question))
    }

    fn start_over(&self, memory: &mut DialogueMemory, now: Instant) -> Outcome {
        tracing::warn!(phase = ?memory.flow().phase(), "dialogue state inconsistent, resetting flow");
        memory.reduce(MemoryDelta::FlowChanged(Flow::Idle), now);
        Outcome::Reply(TurnReply::done(phrases::START_OVER, false))
    }

    /// Folds an executed command's result back into memory and builds the reply.
    pub fn complete<R: Rng + ?Sized>(
        &self,
        memory: &mut DialogueMemory,
        intent: &Intent,
        result: &CommandResult,
        now: Instant,
        rng: &mut R,
        telemetry: &mut TelemetryRecorder,
    ) -> TurnReply {
        if !result.success {
            if memory.last_suggestion.is_some() {
                memory.reduce(MemoryDelta::SuggestionCleared, now);
            }
            return TurnReply {
                data: result.data.clone(),
                ..TurnReply::done(result.message.clone(), false)
            };
        }

        memory.reduce(
            MemoryDelta::Completed(HistoryEntry {
                intent: intent.kind,
                data: intent.data.clone(),
            }),
            now,
        );
        match intent.kind {
            IntentKind::CreateProject => {
                let project = result
                    .data_str("id")
                    .or_else(|| intent.slot("name").map(str::to_string));
                if let Some(project) = project {
                    memory.reduce(MemoryDelta::ActiveProject(project), now);
                }
            }
            IntentKind::CreateTask => {
                if let Some(title) = intent.slot("title") {
                    memory.reduce(MemoryDelta::LastTask(title.to_string()), now);
                }
            }
            _ => {}
        }

        let mut text = if result.message.trim().is_empty() {
            default_message(intent, rng)
        } else {
            result.message.trim().to_string()
        };
        if self.encouragement_every > 0 && memory.personality_counter % self.encouragement_every == 0 {
            text.push(' ');
            text.push_str(phrases::encouragement(rng));
        }

        let mut reply = TurnReply {
            data: result.data.clone(),
            ..TurnReply::done(String::new(), true)
        };
        if let Some(suggestion) = suggest(intent.kind, rng) {
            text.push(' ');
            text.push_str(&suggestion.phrase);
            memory.reduce(MemoryDelta::SuggestionOffered(suggestion), now);
            telemetry.record(TelemetryEvent::Flow(FlowEventKind::SuggestionOffered));
            reply.needs_input = true;
        }
        reply.response = text;
        reply
    }

    fn history_summary(&self, memory: &DialogueMemory) -> String {
        let recent = memory.recent_history(self.history_window);
        if recent.is_empty() {
            return "We haven't done anything yet in this conversation.".to_string();
        }
        let items: Vec<String> = recent.iter().map(describe_entry).collect();
        format!("Recently you {}.", items.join(", then "))
    }
}

fn describe_entry(entry: &HistoryEntry) -> String {
    let slot = |key: &str| entry.data.get(key).map(String::as_str).unwrap_or("");
    match entry.intent {
        IntentKind::CreateProject => format!("created the project \"{}\"", slot("name")),
        IntentKind::CreateTask => format!("created the task \"{}\"", slot("title")),
        IntentKind::CreateTestCase => format!("created the test case \"{}\"", slot("title")),
        IntentKind::CreateNote => "saved a note".to_string(),
        IntentKind::Navigate => format!("went to {}", slot("destination")),
        IntentKind::ShowList => format!("viewed your {}", list_label(slot("listType"))),
        IntentKind::ConfirmRedirect => "opened the project".to_string(),
        other => other.activity().to_string(),
    }
}

fn default_message<R: Rng + ?Sized>(intent: &Intent, rng: &mut R) -> String {
    match intent.kind {
        IntentKind::CreateTask => phrases::task_created(rng).to_string(),
        IntentKind::CreateProject => phrases::project_created(rng).to_string(),
        _ => phrases::acknowledgement(rng).to_string(),
    }
}

fn is_cancel(input: &str) -> bool {
    let lower = input.trim().trim_end_matches(&['.', '!'][..]).to_lowercase();
    CANCEL_WORDS.contains(&lower.as_str())
}
