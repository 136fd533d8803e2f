mod engine;
mod history;
mod shared;
#[cfg(test)]
mod tests;

pub use engine::SmoothingEngine;
pub use history::HistoryBuffer;
pub use shared::SharedEmotion;
