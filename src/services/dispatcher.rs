use crate::kernel::event::{Action, CommandResult, DispatchContext};
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("dispatcher unavailable: {0}")]
    Unavailable(String),
}

/// Application side of the engine: runs a fully specified command.
///
/// `Ok(None)` means the command ran but had nothing to report.
#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        action: &Action,
        context: &DispatchContext,
    ) -> Result<Option<CommandResult>, DispatchError>;
}

#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, path: &str);
}

/// Accepts every command and reports success. Used by the console harness.
#[derive(Debug, Default, Clone)]
pub struct LoggingDispatcher;

#[async_trait]
impl CommandDispatcher for LoggingDispatcher {
    async fn dispatch(
        &self,
        action: &Action,
        context: &DispatchContext,
    ) -> Result<Option<CommandResult>, DispatchError> {
        info!(
            action = %action.name,
            params = action.params.len(),
            project = context.project_id.as_deref().unwrap_or("-"),
            "dispatch"
        );
        Ok(Some(CommandResult::ok("").with_action(&action.name)))
    }
}
