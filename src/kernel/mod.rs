pub mod dialogue;
pub mod event;
pub mod intent;
pub mod reactor;
pub mod scheduler;
pub mod state;
pub mod telemetry;
pub mod time;
