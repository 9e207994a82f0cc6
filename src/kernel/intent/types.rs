use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Slot name -> extracted value.
pub type SlotMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntentKind {
    CreateProject,
    CreateTask,
    CreateTestCase,
    CreateNote,
    Navigate,
    ShowList,
    Help,
    QueryHistory,
    ConfirmRedirect,
    ResetMemory,
    Unknown,
}

impl IntentKind {
    pub const ALL: [IntentKind; 11] = [
        IntentKind::CreateProject,
        IntentKind::CreateTask,
        IntentKind::CreateTestCase,
        IntentKind::CreateNote,
        IntentKind::Navigate,
        IntentKind::ShowList,
        IntentKind::Help,
        IntentKind::QueryHistory,
        IntentKind::ConfirmRedirect,
        IntentKind::ResetMemory,
        IntentKind::Unknown,
    ];

    /// Wire tag, also used as the dispatched action name.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::CreateProject => "createProject",
            IntentKind::CreateTask => "createTask",
            IntentKind::CreateTestCase => "createTestCase",
            IntentKind::CreateNote => "createNote",
            IntentKind::Navigate => "navigate",
            IntentKind::ShowList => "showList",
            IntentKind::Help => "help",
            IntentKind::QueryHistory => "queryHistory",
            IntentKind::ConfirmRedirect => "confirmRedirect",
            IntentKind::ResetMemory => "resetMemory",
            IntentKind::Unknown => "unknown",
        }
    }

    /// State-changing intents are read back to the user before they run.
    pub fn requires_confirmation(&self) -> bool {
        matches!(
            self,
            IntentKind::CreateProject
                | IntentKind::CreateTask
                | IntentKind::CreateTestCase
                | IntentKind::CreateNote
        )
    }

    /// Verb phrase for failure messages ("Failed to create project: ...").
    pub fn verb(&self) -> &'static str {
        match self {
            IntentKind::CreateProject => "create project",
            IntentKind::CreateTask => "create task",
            IntentKind::CreateTestCase => "create test case",
            IntentKind::CreateNote => "create note",
            IntentKind::Navigate | IntentKind::ConfirmRedirect => "navigate",
            IntentKind::ShowList => "load the list",
            IntentKind::Help => "show help",
            IntentKind::QueryHistory => "read history",
            IntentKind::ResetMemory => "reset",
            IntentKind::Unknown => "understand that",
        }
    }

    /// Gerund form used when asking whether to abandon a paused flow.
    pub fn activity(&self) -> &'static str {
        match self {
            IntentKind::CreateProject => "creating a project",
            IntentKind::CreateTask => "creating a task",
            IntentKind::CreateTestCase => "creating a test case",
            IntentKind::CreateNote => "writing a note",
            IntentKind::Navigate => "navigating",
            IntentKind::ShowList => "listing items",
            IntentKind::Help => "getting help",
            IntentKind::QueryHistory => "reviewing history",
            IntentKind::ConfirmRedirect => "opening the project",
            IntentKind::ResetMemory => "starting over",
            IntentKind::Unknown => "something else",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified user goal plus its extracted slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub kind: IntentKind,
    pub confidence: f32, // 0.0 - 1.0
    pub data: SlotMap,
    pub original_text: String,
}

impl Intent {
    pub fn new(kind: IntentKind, confidence: f32, data: SlotMap, original_text: &str) -> Self {
        Self {
            kind,
            confidence: confidence.clamp(0.0, 1.0),
            data,
            original_text: original_text.to_string(),
        }
    }

    pub fn unknown(text: &str) -> Self {
        let mut data = SlotMap::new();
        data.insert("query".to_string(), text.to_string());
        Self::new(IntentKind::Unknown, 0.1, data, text)
    }

    /// Non-blank slot value.
    pub fn slot(&self, name: &str) -> Option<&str> {
        self.data
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn with_slot(mut self, name: &str, value: &str) -> Self {
        self.data.insert(name.to_string(), value.to_string());
        self
    }

    pub fn set_slot(&mut self, name: &str, value: &str) {
        self.data.insert(name.to_string(), value.to_string());
    }
}
