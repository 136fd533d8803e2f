mod error;
mod handlers;
mod server;
mod types;
mod websocket;

pub use error::{ApiError, ApiJson};
pub use server::{build_router, ApiServer, ApiServerBuilder, AppState};
pub use types::{MappingUpdateResponse, SystemStatus};
