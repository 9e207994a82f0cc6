//! Multi-turn dialogue: the state machine and everything it says.

pub mod affirmation;
pub mod machine;
pub mod phrases;
pub mod prompts;
pub mod suggest;

pub use affirmation::{is_affirmative, is_negative, read_answer, Answer};
pub use machine::{DialogueMachine, Outcome};
pub use suggest::{suggest, Suggestion};
