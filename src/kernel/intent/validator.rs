use super::types::{Intent, IntentKind};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub is_valid: bool,
    pub missing_fields: Vec<String>,
}

/// Slots that must be non-blank before an intent of `kind` can run, in prompt order.
pub fn required_slots(kind: IntentKind) -> &'static [&'static str] {
    match kind {
        IntentKind::CreateProject => &["name"],
        IntentKind::CreateTask => &["title"],
        IntentKind::CreateTestCase => &["title"],
        IntentKind::CreateNote => &["content"],
        IntentKind::Navigate => &["destination"],
        IntentKind::ShowList => &["listType"],
        IntentKind::Help
        | IntentKind::QueryHistory
        | IntentKind::ConfirmRedirect
        | IntentKind::ResetMemory
        | IntentKind::Unknown => &[],
    }
}

pub fn validate(intent: &Intent) -> Validation {
    let missing_fields: Vec<String> = required_slots(intent.kind)
        .iter()
        .filter(|slot| intent.slot(slot).is_none())
        .map(|slot| slot.to_string())
        .collect();

    Validation {
        is_valid: missing_fields.is_empty(),
        missing_fields,
    }
}
