mod orchestrator;
mod runtime;
mod shutdown;
mod startup;
mod state;
mod types;


pub use orchestrator::MoodlightOrchestrator;
pub use runtime::ShutdownHandle;
pub use types::{ComponentState, ShutdownReason};
