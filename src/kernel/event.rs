use crate::kernel::intent::SlotMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Host-supplied context for a single turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnContext {
    /// Project the host UI is currently showing, if any.
    pub project_id: Option<String>,
}

impl TurnContext {
    pub fn in_project(project_id: &str) -> Self {
        Self {
            project_id: Some(project_id.to_string()),
        }
    }
}

/// What the host gets back for one utterance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnReply {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    /// The host should immediately listen again (prompt or confirmation pending).
    pub needs_input: bool,
    pub is_complete: bool,
}

impl TurnReply {
    /// A question that expects an answer on the next turn.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            response: text.into(),
            needs_input: true,
            ..Self::default()
        }
    }

    /// A turn that closes the current exchange.
    pub fn done(text: impl Into<String>, success: bool) -> Self {
        Self {
            response: text.into(),
            success: Some(success),
            is_complete: true,
            ..Self::default()
        }
    }

    /// A neutral reply that neither finishes nor continues a command.
    pub fn say(text: impl Into<String>) -> Self {
        Self {
            response: text.into(),
            ..Self::default()
        }
    }
}

/// Outcome of an executed command, as reported by the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    /// Which branch ran, e.g. "createProject".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl CommandResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_action(mut self, action: &str) -> Self {
        self.action = Some(action.to_string());
        self
    }

    /// String-ish value from `data`.
    pub fn data_str(&self, key: &str) -> Option<String> {
        match self.data.as_ref()?.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Application action handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub params: SlotMap,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchContext {
    pub project_id: Option<String>,
}
