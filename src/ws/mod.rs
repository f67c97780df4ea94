//! Live relay: WebSocket connections and event fan-out.

mod handler;
mod hub;
mod types;

pub use handler::ws_handler;
pub use hub::{ConnectionId, RelayHub};
pub use types::{ClientFrame, ServerEvent, trip_status};
