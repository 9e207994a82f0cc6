use super::phrases;
use crate::kernel::intent::{Intent, IntentKind};
use rand::Rng;

const CONFIRM_TAIL: &str = " — is that correct?";

/// Question asked while collecting `field` for `kind`.
pub fn field_prompt<R: Rng + ?Sized>(kind: IntentKind, field: &str, rng: &mut R) -> String {
    let fixed = match (kind, field) {
        (IntentKind::CreateTask, "title") => Some("What should the task be called?"),
        (IntentKind::CreateProject, "name") => Some("What would you like to name the project?"),
        (IntentKind::CreateTestCase, "title") => Some("What should the test case be called?"),
        (IntentKind::CreateNote, "content") => Some("What should the note say?"),
        (IntentKind::Navigate, "destination") => Some("Where would you like to go?"),
        (IntentKind::ShowList, "listType") => {
            Some("Which list would you like to see: projects, tasks, test cases, or notes?")
        }
        _ => None,
    };
    match fixed {
        Some(text) => text.to_string(),
        None => phrases::missing_field(field, rng),
    }
}

/// Read-back of a complete intent. Clauses for absent optional slots are left out.
pub fn confirmation(intent: &Intent) -> String {
    let mut text = match intent.kind {
        IntentKind::CreateProject => {
            let mut text = format!("Create project \"{}\"", intent.slot("name").unwrap_or_default());
            match (intent.slot("description"), intent.slot("projectCode")) {
                (Some(description), Some(code)) => {
                    text.push_str(&format!(" with description \"{description}\" and code \"{code}\""));
                }
                (Some(description), None) => {
                    text.push_str(&format!(" with description \"{description}\""));
                }
                (None, Some(code)) => text.push_str(&format!(" with code \"{code}\"")),
                (None, None) => {}
            }
            text
        }
        IntentKind::CreateTask => {
            let mut text = format!("Create task \"{}\"", intent.slot("title").unwrap_or_default());
            if let Some(project) = intent.slot("projectName") {
                text.push_str(&format!(" in project \"{project}\""));
            }
            if let Some(assignee) = intent.slot("assignee") {
                text.push_str(&format!(" assigned to {assignee}"));
            }
            if let Some(priority) = intent.slot("priority") {
                text.push_str(&format!(" with {priority} priority"));
            }
            text
        }
        IntentKind::CreateTestCase => {
            let mut text = format!("Create test case \"{}\"", intent.slot("title").unwrap_or_default());
            if let Some(project) = intent.slot("projectName") {
                text.push_str(&format!(" in project \"{project}\""));
            }
            text
        }
        IntentKind::CreateNote => {
            format!("Create note \"{}\"", intent.slot("content").unwrap_or_default())
        }
        IntentKind::Navigate => {
            format!("Go to {}", intent.slot("destination").unwrap_or_default())
        }
        IntentKind::ShowList => {
            format!("Show your {}", list_label(intent.slot("listType").unwrap_or_default()))
        }
        other => format!("Run {other}"),
    };
    text.push_str(CONFIRM_TAIL);
    text
}

/// Asked when a new intent interrupts an unfinished one.
pub fn switch_question(paused: IntentKind, incoming: &Intent) -> String {
    format!(
        "We were in the middle of {}. Do you want to switch to {} instead?",
        paused.activity(),
        describe(incoming)
    )
}

/// Short spoken description of an intent.
pub fn describe(intent: &Intent) -> String {
    match intent.kind {
        IntentKind::Navigate => match intent.slot("destination") {
            Some(destination) => format!("going to {destination}"),
            None => "navigating".to_string(),
        },
        IntentKind::ShowList => match intent.slot("listType") {
            Some(list) => format!("showing your {}", list_label(list)),
            None => "listing items".to_string(),
        },
        IntentKind::CreateProject => match intent.slot("name") {
            Some(name) => format!("creating the project \"{name}\""),
            None => "creating a project".to_string(),
        },
        IntentKind::CreateTask => match intent.slot("title") {
            Some(title) => format!("creating the task \"{title}\""),
            None => "creating a task".to_string(),
        },
        other => other.activity().to_string(),
    }
}

pub fn list_label(list: &str) -> &str {
    match list {
        "testCases" => "test cases",
        other => other,
    }
}
