use crate::error::Error;
use axum::extract::ws::Message;
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque, case-sensitive name of a subscription channel.
pub type TopicKey = String;

/// Prefix of the text frame sent back to a connection whose control frame could not be decoded.
pub const SUBSCRIPTION_ERROR_PREFIX: &str = "SUBSCRIPTION ERROR: ";

/// The `{event, message}` structure delivered to every subscriber of a topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub event: TopicKey,
    pub message: Value,
}

impl Envelope {
    pub fn new(event: TopicKey, message: Value) -> Self {
        Self { event, message }
    }

    /// Builds an envelope from a raw publish body. A body that is not valid JSON is carried as
    /// `null` rather than rejected.
    pub fn from_body(event: TopicKey, body: &[u8]) -> Self {
        let message = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                debug!("Publish body for topic {event:?} is not JSON ({e}), sending null");
                Value::Null
            }
        };

        Self { event, message }
    }

    /// Serializes the envelope once into the text frame shared by all subscribers.
    pub fn to_frame(&self) -> Result<Message, Error> {
        let json = serde_json::to_string(self)?;
        Ok(Message::Text(json.into()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Subscribe,
    Unsubscribe,
    #[serde(other)]
    Unknown,
}

/// A frame sent by a subscriber to change its own subscriptions:
/// `{"action": "subscribe" | "unsubscribe", "events": ["topic", ...]}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ControlMessage {
    #[serde(default)]
    pub action: Option<Action>,
    #[serde(default)]
    pub events: Option<Vec<TopicKey>>,
}

impl ControlMessage {
    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// The requested topic keys with empty keys discarded.
    pub fn topics(&self) -> Vec<TopicKey> {
        self.events
            .iter()
            .flatten()
            .filter(|key| !key.is_empty())
            .cloned()
            .collect()
    }
}

pub fn subscription_error(err: &serde_json::Error) -> Message {
    Message::Text(format!("{SUBSCRIPTION_ERROR_PREFIX}{err}").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_carries_decoded_json_body() {
        let envelope = Envelope::from_body("orders".to_string(), br#"{"id":7}"#);
        assert_eq!(envelope.message, json!({"id": 7}));
    }

    #[test]
    fn test_envelope_degrades_invalid_body_to_null() {
        let envelope = Envelope::from_body("orders".to_string(), b"not json at all");
        assert_eq!(envelope.message, Value::Null);

        let envelope = Envelope::from_body("orders".to_string(), b"");
        assert_eq!(envelope.message, Value::Null);
    }

    #[test]
    fn test_envelope_frame_format() {
        let envelope = Envelope::new("orders".to_string(), json!({"id": 7}));
        let frame = envelope.to_frame().unwrap();

        match frame {
            Message::Text(text) => {
                let parsed: Value = serde_json::from_str(text.as_str()).unwrap();
                assert_eq!(parsed, json!({"event": "orders", "message": {"id": 7}}));
            }
            other => panic!("expected a text frame, got {other:?}"),
        }
    }

    #[test]
    fn test_control_message_subscribe() {
        let control =
            ControlMessage::decode(br#"{"action":"subscribe","events":["orders","fills"]}"#)
                .unwrap();

        assert_eq!(control.action, Some(Action::Subscribe));
        assert_eq!(control.topics(), vec!["orders".to_string(), "fills".to_string()]);
    }

    #[test]
    fn test_control_message_unknown_action_is_not_an_error() {
        let control = ControlMessage::decode(br#"{"action":"dance","events":["orders"]}"#).unwrap();
        assert_eq!(control.action, Some(Action::Unknown));
    }

    #[test]
    fn test_control_message_missing_fields_are_tolerated() {
        let control = ControlMessage::decode(br#"{}"#).unwrap();
        assert_eq!(control.action, None);
        assert!(control.topics().is_empty());

        let control = ControlMessage::decode(br#"{"action":null,"events":null}"#).unwrap();
        assert_eq!(control.action, None);
        assert!(control.topics().is_empty());
    }

    #[test]
    fn test_control_message_drops_empty_topic_keys() {
        let control =
            ControlMessage::decode(br#"{"action":"subscribe","events":["","orders"]}"#).unwrap();
        assert_eq!(control.topics(), vec!["orders".to_string()]);
    }

    #[test]
    fn test_control_message_rejects_malformed_frames() {
        assert!(ControlMessage::decode(b"{not json").is_err());
        assert!(ControlMessage::decode(br#"{"action":"subscribe","events":[1,2]}"#).is_err());
        assert!(ControlMessage::decode(br#"["subscribe"]"#).is_err());
    }

    #[test]
    fn test_subscription_error_is_prefixed() {
        let err = ControlMessage::decode(b"{").unwrap_err();
        match subscription_error(&err) {
            Message::Text(text) => assert!(text.as_str().starts_with(SUBSCRIPTION_ERROR_PREFIX)),
            other => panic!("expected a text frame, got {other:?}"),
        }
    }
}
