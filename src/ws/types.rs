//! Wire types for the live relay.
//!
//! Frames in both directions are JSON objects with an `event` name and
//! an optional `data` payload.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Event name a driver client sends with each position sample.
pub const EVENT_DRIVER_LOCATION: &str = "driverLocation";

/// Event name marking the start of a trip.
pub const EVENT_TRIP_START: &str = "trip:start";

/// Event name marking the end of a trip.
pub const EVENT_TRIP_END: &str = "trip:end";

/// A frame received from a client.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientFrame {
    pub event: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// A frame relayed to clients.
///
/// Serializes as `{"event": "...", "data": ...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// A driver's position, forwarded verbatim.
    #[serde(rename = "locationUpdate")]
    LocationUpdate(Value),
    /// A trip lifecycle change.
    #[serde(rename = "tripStatus")]
    TripStatus(Value),
}

/// Build a trip status payload: `status` and a server timestamp in
/// epoch milliseconds, merged with whatever the client sent. Client
/// keys win on collision.
pub fn trip_status(status: &str, payload: Option<Value>) -> Value {
    let mut merged = Map::new();
    merged.insert("status".to_string(), json!(status));
    merged.insert("at".to_string(), json!(Utc::now().timestamp_millis()));

    if let Some(Value::Object(extra)) = payload {
        for (key, value) in extra {
            merged.insert(key, value);
        }
    }

    Value::Object(merged)
}
