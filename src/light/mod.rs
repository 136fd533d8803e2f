mod color;
mod mapping;
mod mock;
mod sink;
mod state;
#[cfg(test)]
mod tests;

pub use color::HexColor;
pub use mapping::{BulkUpdateReport, MappingTable};
pub use mock::RecordingLightSink;
pub use sink::{create_light_sink, ConsoleLightSink, LightSink};
pub use state::{LightSpec, LightState};
