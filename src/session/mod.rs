mod builder;
mod detector;
mod pipeline;
mod state;

pub use builder::DetectionSessionBuilder;
pub use detector::DetectionSession;
pub use pipeline::{DetectionPipeline, TickOutcome};
pub use state::SessionState;
