use super::event::{Action, DispatchContext, TurnContext};
use super::intent::{Intent, IntentKind};
use super::state::DialogueMemory;

/// Work the driver must perform outside the pure step.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Dispatch {
        intent: Intent,
        action: Action,
        context: DispatchContext,
    },
    Navigate {
        intent: Intent,
        path: String,
    },
}

impl Effect {
    pub fn intent(&self) -> &Intent {
        match self {
            Effect::Dispatch { intent, .. } | Effect::Navigate { intent, .. } => intent,
        }
    }
}

pub struct Scheduler;

impl Scheduler {
    /// Pure projection: complete Intent + Context -> Effect.
    /// Returns None for intents the engine answers itself, or when a redirect has no target.
    pub fn schedule(&self, intent: Intent, memory: &DialogueMemory, ctx: &TurnContext) -> Option<Effect> {
        match intent.kind {
            IntentKind::Navigate => {
                let path = route_for(intent.slot("destination")?);
                Some(Effect::Navigate { intent, path })
            }
            IntentKind::ConfirmRedirect => {
                let project = memory.active_project.clone()?;
                Some(Effect::Navigate {
                    path: format!("/projects/{}", slug(&project)),
                    intent,
                })
            }
            IntentKind::CreateProject
            | IntentKind::CreateTask
            | IntentKind::CreateTestCase
            | IntentKind::CreateNote
            | IntentKind::ShowList => {
                let context = DispatchContext {
                    project_id: project_for(&intent, memory, ctx),
                };
                let action = Action {
                    name: intent.kind.as_str().to_string(),
                    params: intent.data.clone(),
                };
                Some(Effect::Dispatch { intent, action, context })
            }
            IntentKind::Help | IntentKind::QueryHistory | IntentKind::ResetMemory | IntentKind::Unknown => None,
        }
    }
}

/// Explicit slot first, then the host's current project, then the remembered one.
fn project_for(intent: &Intent, memory: &DialogueMemory, ctx: &TurnContext) -> Option<String> {
    intent
        .slot("projectId")
        .map(str::to_string)
        .or_else(|| ctx.project_id.clone())
        .or_else(|| memory.active_project.clone())
}

/// Maps a spoken destination onto an application path.
pub fn route_for(destination: &str) -> String {
    let lower = destination.trim().to_lowercase();
    match lower.as_str() {
        "dashboard" | "home" | "home page" => "/dashboard".to_string(),
        "projects" | "project list" => "/projects".to_string(),
        "tasks" | "task list" | "board" => "/tasks".to_string(),
        "test cases" | "tests" => "/test-cases".to_string(),
        "notes" => "/notes".to_string(),
        "settings" | "preferences" => "/settings".to_string(),
        "profile" | "account" => "/profile".to_string(),
        other => match other.strip_prefix("project ") {
            Some(project) => format!("/projects/{}", slug(project)),
            None => format!("/{}", slug(other)),
        },
    }
}

pub fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.trim().chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}
