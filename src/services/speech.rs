use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ListenError {
    #[error("no speech within {0:?}")]
    Timeout(Duration),
    #[error("input closed")]
    Closed,
    #[error("audio device error: {0}")]
    Device(String),
}

#[async_trait]
pub trait SpeechOutput: Send + Sync {
    /// Best effort. Playback problems are the output's concern, not the dialogue's.
    async fn speak(&self, text: &str);
}

#[async_trait]
pub trait SpeechInput: Send + Sync {
    async fn listen_once(&self) -> Result<String, ListenError>;
}

/// One listen, bounded by `limit`.
pub async fn listen_with_timeout(input: &dyn SpeechInput, limit: Duration) -> Result<String, ListenError> {
    match tokio::time::timeout(limit, input.listen_once()).await {
        Ok(result) => result,
        Err(_) => Err(ListenError::Timeout(limit)),
    }
}
