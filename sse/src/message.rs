use serde_json::{Map, Value};
use std::fmt;

/// Field name and value used for synthesized keep-alive events.
pub const EVENT_FIELD: &str = "event";
pub const KEEPALIVE: &str = "keepalive";

/// One decoded event: the JSON object carried by a `data:` line, or the
/// synthetic `{"event": "keepalive"}` produced for keep-alive comments.
pub type Event = Map<String, Value>;

/// Builds the event handed to callbacks when the server sends a keep-alive.
pub fn keepalive_event() -> Event {
    let mut event = Event::new();
    event.insert(EVENT_FIELD.to_string(), Value::String(KEEPALIVE.to_string()));
    event
}

pub fn is_keepalive(event: &Event) -> bool {
    event.len() == 1 && event.get(EVENT_FIELD).and_then(Value::as_str) == Some(KEEPALIVE)
}

/// Result of a connection attempt, reported exactly once per run on the
/// outcome channel. `StreamReadError` is reported mid-stream, after `Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// The server answered `200 OK` and the stream is being consumed.
    Connected,
    /// The GET request could not be built (e.g. the URL does not parse).
    ClientCreationFailed,
    /// The request could not be performed (DNS, refused connection, TLS...).
    RequestFailed,
    /// The server answered with a status other than `200 OK`.
    ConnectFailed,
    /// Reading the response body failed after the stream was established.
    StreamReadError,
}

impl ConnectionOutcome {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionOutcome::Connected)
    }
}

impl fmt::Display for ConnectionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConnectionOutcome::Connected => write!(f, "connected"),
            ConnectionOutcome::ClientCreationFailed => write!(f, "client creation failed"),
            ConnectionOutcome::RequestFailed => write!(f, "request failed"),
            ConnectionOutcome::ConnectFailed => write!(f, "connect failed"),
            ConnectionOutcome::StreamReadError => write!(f, "stream read error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keepalive_event_has_single_event_field() {
        let event = keepalive_event();
        assert_eq!(Value::Object(event), json!({"event": "keepalive"}));
    }

    #[test]
    fn is_keepalive_rejects_payload_events() {
        assert!(is_keepalive(&keepalive_event()));

        let mut event = keepalive_event();
        event.insert("extra".to_string(), json!(1));
        assert!(!is_keepalive(&event));

        let mut event = Event::new();
        event.insert("event".to_string(), json!("update"));
        assert!(!is_keepalive(&event));
    }

    #[test]
    fn only_connected_counts_as_connected() {
        assert!(ConnectionOutcome::Connected.is_connected());
        for outcome in [
            ConnectionOutcome::ClientCreationFailed,
            ConnectionOutcome::RequestFailed,
            ConnectionOutcome::ConnectFailed,
            ConnectionOutcome::StreamReadError,
        ] {
            assert!(!outcome.is_connected(), "{outcome} should not be connected");
        }
    }
}
