pub mod dispatcher;
pub mod http;
pub mod speech;

pub use dispatcher::{CommandDispatcher, DispatchError, LoggingDispatcher, Navigator};
pub use http::HttpDispatcher;
pub use speech::{listen_with_timeout, ListenError, SpeechInput, SpeechOutput};
