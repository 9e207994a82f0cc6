use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use parley::kernel::reactor::{ConversationEngine, SessionId};
use parley::services::{CommandDispatcher, HttpDispatcher, LoggingDispatcher, Navigator};
use parley::{EngineConfig, TurnContext};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Prints navigation requests instead of moving a real UI.
struct ConsoleNavigator;

#[async_trait]
impl Navigator for ConsoleNavigator {
    async fn navigate(&self, path: &str) {
        println!("[NAV] {path}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let config = EngineConfig::from_env().context("loading configuration")?;

    let dispatcher: Arc<dyn CommandDispatcher> = match &config.dispatch_url {
        Some(url) => {
            tracing::info!(url = %url, "forwarding commands over HTTP");
            Arc::new(HttpDispatcher::new(url.as_str())?)
        }
        None => Arc::new(LoggingDispatcher),
    };

    let engine = ConversationEngine::new(config, dispatcher).with_navigator(Arc::new(ConsoleNavigator));
    let session = SessionId::new();
    let mut ctx = TurnContext::default();

    tracing::info!(session = %session, "parley ready");
    println!("Type a command (e.g. \"create a new project called Apollo\"). Ctrl+D to quit.");
    println!("Meta: /state, /reset, /project <id>, /telemetry");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line {
            "/state" => {
                let snapshot = engine.conversation_state(&session).await;
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
            "/reset" => {
                engine.reset_conversation_state(&session).await;
                println!("[RESET]");
            }
            "/telemetry" => {
                println!("{}", serde_json::to_string_pretty(&engine.telemetry())?);
            }
            _ if line.starts_with("/project") => {
                let project = line.trim_start_matches("/project").trim();
                ctx.project_id = Some(project.to_string()).filter(|p| !p.is_empty());
                println!("[CTX] project = {:?}", ctx.project_id);
            }
            text => {
                let reply = engine.process_transcript(&session, text, &ctx).await;
                let marker = match (reply.needs_input, reply.success) {
                    (true, _) => "?",
                    (false, Some(false)) => "!",
                    _ => ">",
                };
                println!("{marker} {}", reply.response);
            }
        }
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
