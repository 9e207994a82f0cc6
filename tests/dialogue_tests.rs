use std::time::Instant;

use parley::config::EngineConfig;
use parley::kernel::dialogue::affirmation::{is_affirmative, is_negative, read_answer, Answer};
use parley::kernel::dialogue::machine::{DialogueMachine, Outcome};
use parley::kernel::dialogue::phrases::{self, humanize, missing_field};
use parley::kernel::dialogue::prompts::{confirmation, field_prompt, switch_question};
use parley::kernel::dialogue::Suggestion;
use parley::kernel::event::{CommandResult, TurnContext, TurnReply};
use parley::kernel::intent::{Intent, IntentKind, SlotMap};
use parley::kernel::scheduler::{route_for, slug, Effect};
use parley::kernel::state::{DialogueMemory, Flow, FlowPhase, MemoryDelta};
use parley::kernel::telemetry::TelemetryRecorder;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Map, Value};

struct Harness {
    machine: DialogueMachine,
    memory: DialogueMemory,
    rng: StdRng,
    telemetry: TelemetryRecorder,
    ctx: TurnContext,
    now: Instant,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    fn with_config(config: &EngineConfig) -> Self {
        let now = Instant::now();
        Self {
            machine: DialogueMachine::new(config),
            memory: DialogueMemory::new(now),
            rng: StdRng::seed_from_u64(42),
            telemetry: TelemetryRecorder::new(),
            ctx: TurnContext::default(),
            now,
        }
    }

    fn say(&mut self, text: &str) -> Outcome {
        self.machine
            .step(&mut self.memory, text, &self.ctx, self.now, &mut self.rng, &mut self.telemetry)
    }

    fn reply(&mut self, text: &str) -> TurnReply {
        match self.say(text) {
            Outcome::Reply(reply) => reply,
            Outcome::Execute(effect) => panic!("expected a reply to {text:?}, got {effect:?}"),
        }
    }

    fn offer(&mut self, phrase: &str, replay: Intent) {
        let suggestion = Suggestion {
            phrase: phrase.to_string(),
            replay,
        };
        self.memory.reduce(MemoryDelta::SuggestionOffered(suggestion), self.now);
    }
}

fn intent(kind: IntentKind, slots: &[(&str, &str)]) -> Intent {
    let mut data = SlotMap::new();
    for (k, v) in slots {
        data.insert(k.to_string(), v.to_string());
    }
    Intent::new(kind, 0.9, data, "")
}

#[test]
fn test_affirmation() {
    assert!(is_affirmative("Yes please"));
    assert!(is_affirmative("sure, go ahead"));
    assert!(!is_affirmative("nope"));
    assert!(is_negative("No, cancel that"));
    assert!(is_negative("nah"));
    assert!(!is_negative("yes"));

    assert_eq!(read_answer("no that's not correct"), Answer::No);
    assert_eq!(read_answer("Yeah"), Answer::Yes);
    assert_eq!(read_answer("maybe later"), Answer::Unclear);
}

#[test]
fn test_phrase_helpers() {
    assert_eq!(humanize("projectCode"), "project code");
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(missing_field("dueDate", &mut rng), "What should the due date be?");
    assert!(!missing_field("title", &mut rng).is_empty());
    assert_eq!(
        field_prompt(IntentKind::CreateTask, "title", &mut rng),
        "What should the task be called?"
    );
}

#[test]
fn test_confirmation_read_backs() {
    let note = intent(IntentKind::CreateNote, &[("content", "Update docs")]);
    assert_eq!(confirmation(&note), "Create note \"Update docs\" — is that correct?");

    let task = intent(
        IntentKind::CreateTask,
        &[("title", "Fix bug"), ("projectName", "Apollo"), ("assignee", "sam"), ("priority", "high")],
    );
    assert_eq!(
        confirmation(&task),
        "Create task \"Fix bug\" in project \"Apollo\" assigned to sam with high priority — is that correct?"
    );

    let project = intent(IntentKind::CreateProject, &[("name", "Apollo"), ("description", "Moon")]);
    assert_eq!(
        confirmation(&project),
        "Create project \"Apollo\" with description \"Moon\" — is that correct?"
    );
}

#[test]
fn test_switch_question_wording() {
    let incoming = intent(IntentKind::Navigate, &[("destination", "dashboard")]);
    assert_eq!(
        switch_question(IntentKind::CreateTask, &incoming),
        "We were in the middle of creating a task. Do you want to switch to going to dashboard instead?"
    );
}

#[test]
fn test_routes() {
    assert_eq!(route_for("dashboard"), "/dashboard");
    assert_eq!(route_for("Settings"), "/settings");
    assert_eq!(route_for("project Apollo"), "/projects/apollo");
    assert_eq!(route_for("Reports"), "/reports");
    assert_eq!(slug("My Cool Project!"), "my-cool-project");
}

#[test]
fn test_empty_utterance_does_not_touch_memory() {
    let mut h = Harness::new();
    let reply = h.reply("   ");
    assert_eq!(reply.response, phrases::DIDNT_CATCH);
    assert_eq!(h.memory.version, 0);
}

#[test]
fn test_project_confirmation_dispatches_once() {
    let mut h = Harness::new();
    let reply = h.reply("create a new project called Foo");
    assert!(reply.needs_input);
    assert_eq!(reply.response, "Create project \"Foo\" — is that correct?");
    assert_eq!(h.memory.flow().phase(), FlowPhase::Confirming);

    match h.say("yes") {
        Outcome::Execute(Effect::Dispatch { action, context, .. }) => {
            assert_eq!(action.name, "createProject");
            assert_eq!(action.params.get("name").map(String::as_str), Some("Foo"));
            assert_eq!(action.params.len(), 1);
            assert_eq!(context.project_id, None);
        }
        other => panic!("expected dispatch, got {other:?}"),
    }
    assert_eq!(h.memory.flow(), &Flow::Idle);
}

#[test]
fn test_progressive_slot_filling() {
    let mut h = Harness::new();
    let prompt = h.reply("create project");
    assert_eq!(prompt.response, "What would you like to name the project?");
    assert_eq!(h.memory.flow().awaiting_field(), Some("name"));

    let confirm = h.reply("Apollo");
    assert_eq!(confirm.response, "Create project \"Apollo\" — is that correct?");

    // Unclear answers repeat the question without changing state.
    let again = h.reply("hmm let me think");
    assert_eq!(again.response, confirm.response);
    assert_eq!(h.memory.flow().phase(), FlowPhase::Confirming);

    let cancelled = h.reply("no");
    assert!(cancelled.is_complete);
    assert_eq!(h.memory.flow(), &Flow::Idle);
}

#[test]
fn test_cancel_word_aborts_collection() {
    let mut h = Harness::new();
    h.reply("create task");
    let reply = h.reply("never mind");
    assert!(reply.is_complete);
    assert_eq!(h.memory.flow(), &Flow::Idle);
}

#[test]
fn test_interruption_resume() {
    let mut h = Harness::new();
    h.reply("create task");

    let question = h.reply("go to dashboard");
    assert!(question.needs_input);
    assert!(question.response.starts_with("We were in the middle of creating a task."));
    assert_eq!(h.memory.flow().phase(), FlowPhase::Interrupted);
    assert!(h.memory.was_interrupted);

    let unclear = h.reply("what?");
    assert_eq!(unclear.response, question.response);

    let resumed = h.reply("no");
    assert_eq!(resumed.response, "What should the task be called?");
    assert_eq!(h.memory.flow().awaiting_field(), Some("title"));
}

#[test]
fn test_interruption_switch_navigates() {
    let mut h = Harness::new();
    h.reply("create task");
    h.reply("go to dashboard");
    match h.say("yes") {
        Outcome::Execute(Effect::Navigate { path, .. }) => assert_eq!(path, "/dashboard"),
        other => panic!("expected navigation, got {other:?}"),
    }
    assert_eq!(h.memory.flow(), &Flow::Idle);
}

#[test]
fn test_free_text_field_answer() {
    let mut h = Harness::new();
    h.reply("create note");
    let confirm = h.reply("show the demo to the team");
    assert_eq!(
        confirm.response,
        "Create note \"show the demo to the team\" — is that correct?"
    );
}

#[test]
fn test_mismatched_adapter_starts_over() {
    let mut h = Harness::new();
    let outcome = h.machine.handle_field_response(
        &mut h.memory,
        "Apollo",
        &h.ctx,
        h.now,
        &mut h.rng,
        &mut h.telemetry,
    );
    match outcome {
        Outcome::Reply(reply) => assert_eq!(reply.response, phrases::START_OVER),
        other => panic!("expected reply, got {other:?}"),
    }
}

#[test]
fn test_progressive_handler_replaces_flow() {
    let mut h = Harness::new();
    h.reply("create task");
    let note = intent(IntentKind::CreateNote, &[("content", "Buy milk")]);
    let outcome = h.machine.handle_intent_progressively(
        &mut h.memory,
        note,
        &h.ctx,
        h.now,
        &mut h.rng,
        &mut h.telemetry,
    );
    match outcome {
        Outcome::Reply(reply) => assert_eq!(reply.response, "Create note \"Buy milk\" — is that correct?"),
        other => panic!("expected confirmation, got {other:?}"),
    }
    assert_eq!(h.memory.last_intent, Some(IntentKind::CreateNote));
}

#[test]
fn test_completion_updates_memory_and_offers_suggestion() {
    let mut h = Harness::new();
    let created = intent(IntentKind::CreateProject, &[("name", "Apollo")]);
    let mut data = Map::new();
    data.insert("id".to_string(), Value::from("p-42"));
    let result = CommandResult {
        success: true,
        message: "Project created".to_string(),
        data: Some(data),
        action: Some("createProject".to_string()),
    };

    let reply = h
        .machine
        .complete(&mut h.memory, &created, &result, h.now, &mut h.rng, &mut h.telemetry);

    assert_eq!(reply.success, Some(true));
    assert!(reply.response.starts_with("Project created"));
    assert!(reply.needs_input, "a follow-up question was appended");
    assert_eq!(h.memory.active_project.as_deref(), Some("p-42"));
    assert_eq!(h.memory.history().len(), 1);
    assert_eq!(h.memory.personality_counter, 1);
    assert!(h.memory.last_suggestion.is_some());
    assert_eq!(reply.data.as_ref().and_then(|d| d.get("id")), Some(&json!("p-42")));
}

#[test]
fn test_failed_completion_keeps_history_clean() {
    let mut h = Harness::new();
    let task = intent(IntentKind::CreateTask, &[("title", "Fix bug")]);
    let reply = h.machine.complete(
        &mut h.memory,
        &task,
        &CommandResult::failure("Failed to create task: offline"),
        h.now,
        &mut h.rng,
        &mut h.telemetry,
    );
    assert_eq!(reply.success, Some(false));
    assert_eq!(reply.response, "Failed to create task: offline");
    assert!(h.memory.history().is_empty());
    assert_eq!(h.memory.last_task, None);
}

#[test]
fn test_repeated_failures_escalate_to_help() {
    let mut h = Harness::new();
    h.reply("blorp");
    assert_eq!(h.memory.consecutive_failures, 1);
    let second = h.reply("zibble wobble");
    assert_eq!(h.memory.consecutive_failures, 2);
    assert!(second.response.contains("create"), "expected help text, got {:?}", second.response);

    h.reply("help");
    assert_eq!(h.memory.consecutive_failures, 0);
}

#[test]
fn test_yes_to_suggestion_replays_its_intent() {
    let mut h = Harness::new();
    h.offer("Want me to show your tasks?", intent(IntentKind::ShowList, &[("listType", "tasks")]));

    match h.say("yes please") {
        Outcome::Execute(Effect::Dispatch { action, .. }) => {
            assert_eq!(action.name, "showList");
            assert_eq!(action.params.get("listType").map(String::as_str), Some("tasks"));
        }
        other => panic!("expected the offered list to run, got {other:?}"),
    }
    assert!(h.memory.last_suggestion.is_none());
    assert_eq!(h.memory.last_intent, Some(IntentKind::ShowList));
}

#[test]
fn test_yes_to_suggestion_can_start_collection() {
    let mut h = Harness::new();
    h.offer("Would you like to add another task?", intent(IntentKind::CreateTask, &[]));

    let prompt = h.reply("sure, do it");
    assert_eq!(prompt.response, "What should the task be called?");
    assert_eq!(h.memory.flow().awaiting_field(), Some("title"));
}

#[test]
fn test_no_to_suggestion_is_acknowledged() {
    let mut h = Harness::new();
    h.offer("Want me to show your tasks?", intent(IntentKind::ShowList, &[("listType", "tasks")]));

    let reply = h.reply("no thanks");
    assert!(reply.is_complete);
    assert!(!reply.needs_input);
    assert!(h.memory.last_suggestion.is_none());
    assert_eq!(h.memory.flow(), &Flow::Idle);
}

#[test]
fn test_new_command_wins_over_pending_suggestion() {
    let mut h = Harness::new();
    h.offer("Want me to show your tasks?", intent(IntentKind::ShowList, &[("listType", "tasks")]));

    // "correct" reads as a yes, but the utterance is a confident new command.
    let reply = h.reply("add a task to correct the typo in the footer");
    assert_eq!(
        reply.response,
        "Create task \"correct the typo in the footer\" — is that correct?"
    );
    assert_eq!(h.memory.flow().phase(), FlowPhase::Confirming);
    assert!(h.memory.last_suggestion.is_none());
    assert_eq!(h.memory.last_intent, Some(IntentKind::CreateTask));
}

#[test]
fn test_unrelated_answer_to_suggestion_is_classified() {
    let mut h = Harness::new();
    h.offer("Would you like to add another task?", intent(IntentKind::CreateTask, &[]));

    let reply = h.reply("what did I just do");
    assert!(reply.response.contains("haven't done anything"));
    assert!(h.memory.last_suggestion.is_none());
}

#[test]
fn test_unknown_list_type_asks_again() {
    let mut h = Harness::new();
    let prompt = h.reply("show me");
    assert_eq!(h.memory.flow().awaiting_field(), Some("listType"));

    let again = h.reply("bananas");
    assert!(again.needs_input);
    assert_eq!(again.response, prompt.response);
    assert_eq!(h.memory.flow().awaiting_field(), Some("listType"));
    assert!(h.memory.flow().pending_intent().and_then(|p| p.slot("listType")).is_none());

    match h.say("test cases") {
        Outcome::Execute(Effect::Dispatch { action, .. }) => {
            assert_eq!(action.name, "showList");
            assert_eq!(action.params.get("listType").map(String::as_str), Some("testCases"));
        }
        other => panic!("expected the list to run, got {other:?}"),
    }
}

#[test]
fn test_encouragement_every_third_completion() {
    let config = EngineConfig {
        encouragement_every: 3,
        ..EngineConfig::default()
    };
    let mut h = Harness::with_config(&config);
    let help = intent(IntentKind::Help, &[]);

    let mut responses = Vec::new();
    for _ in 0..6 {
        let reply = h.machine.complete(
            &mut h.memory,
            &help,
            &CommandResult::ok("Done."),
            h.now,
            &mut h.rng,
            &mut h.telemetry,
        );
        responses.push(reply.response);
    }

    let encouraged: Vec<bool> = responses
        .iter()
        .map(|r| phrases::ENCOURAGEMENT.iter().any(|p| r == &format!("Done. {p}")))
        .collect();
    assert_eq!(encouraged, vec![false, false, true, false, false, true]);
    assert_eq!(responses[0], "Done.");
    assert_eq!(h.memory.personality_counter, 6);
}

#[test]
fn test_zero_disables_encouragement() {
    let config = EngineConfig {
        encouragement_every: 0,
        ..EngineConfig::default()
    };
    let mut h = Harness::with_config(&config);
    let help = intent(IntentKind::Help, &[]);
    for _ in 0..4 {
        let reply = h.machine.complete(
            &mut h.memory,
            &help,
            &CommandResult::ok("Done."),
            h.now,
            &mut h.rng,
            &mut h.telemetry,
        );
        assert_eq!(reply.response, "Done.");
    }
}
