use super::dispatcher::{CommandDispatcher, DispatchError};
use crate::kernel::event::{Action, CommandResult, DispatchContext};
use crate::kernel::intent::SlotMap;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Forwards commands to the host application over HTTP.
#[derive(Clone)]
pub struct HttpDispatcher {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct CommandRequest<'a> {
    action: &'a str,
    params: &'a SlotMap,
    context: &'a DispatchContext,
}

impl HttpDispatcher {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DispatchError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/commands", self.base_url)
    }
}

#[async_trait]
impl CommandDispatcher for HttpDispatcher {
    async fn dispatch(
        &self,
        action: &Action,
        context: &DispatchContext,
    ) -> Result<Option<CommandResult>, DispatchError> {
        let body = CommandRequest {
            action: &action.name,
            params: &action.params,
            context,
        };

        let response = self.client.post(self.endpoint()).json(&body).send().await?;
        let status = response.status();
        debug!(action = %action.name, status = status.as_u16(), "command posted");

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(action = %action.name, status = status.as_u16(), "command rejected");
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let result: CommandResult = response.json().await?;
        Ok(Some(result))
    }
}
