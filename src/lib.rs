pub mod config;
pub mod kernel;
pub mod services;

pub use config::{ConfigError, EngineConfig};
pub use kernel::event::{CommandResult, TurnContext, TurnReply};
pub use kernel::intent::{Intent, IntentClassifier, IntentKind};
pub use kernel::reactor::{ConversationEngine, SessionId};
pub use kernel::state::ConversationSnapshot;
