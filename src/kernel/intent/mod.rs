pub mod catalog;
pub mod classifier;
pub mod types;
pub mod validator;

pub use classifier::{apply_classification, IntentClassifier};
pub use types::{Intent, IntentKind, SlotMap};
pub use validator::{required_slots, validate, Validation};
