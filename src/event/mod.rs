#[cfg(test)]
mod event_test;

use serde::Serialize;
use tokio::sync::mpsc;

use crate::data_channel::data_channel_state::DataChannelState;
use crate::error::{Error, Result};

pub const DATA_CHANNEL_RECEIVE_RAW_MESSAGE: &str = "dataChannelReceiveRawMessage";
pub const DATA_CHANNEL_RECEIVE_MESSAGE: &str = "dataChannelReceiveMessage";
pub const DATA_CHANNEL_STATE_CHANGED: &str = "dataChannelStateChanged";

/// MessageType tells the host how the `data` field of a message event is
/// encoded: base64 for binary frames, plain text otherwise.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Binary,
    Text,
}

/// Payload of `dataChannelReceiveRawMessage`. The bytes are not part of it;
/// the host pulls them with `dataChannelReceive`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessagePayload {
    pub tag: String,
    pub connection_id: u32,
}

/// Payload of `dataChannelReceiveMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub tag: String,
    pub connection_id: u32,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub data: String,
}

/// Payload of `dataChannelStateChanged`. `state` is None when the native
/// library reported a value outside the four host states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateChangedPayload {
    pub tag: String,
    pub connection_id: u32,
    pub id: u16,
    pub state: Option<DataChannelState>,
}

/// DataChannelEvent is one host-visible event, named by its variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DataChannelEvent {
    ReceiveRawMessage(RawMessagePayload),
    ReceiveMessage(MessagePayload),
    StateChanged(StateChangedPayload),
}

impl DataChannelEvent {
    /// name returns the event name the host listens for.
    pub fn name(&self) -> &'static str {
        match self {
            DataChannelEvent::ReceiveRawMessage(_) => DATA_CHANNEL_RECEIVE_RAW_MESSAGE,
            DataChannelEvent::ReceiveMessage(_) => DATA_CHANNEL_RECEIVE_MESSAGE,
            DataChannelEvent::StateChanged(_) => DATA_CHANNEL_STATE_CHANGED,
        }
    }

    /// tag returns the tag of the channel the event belongs to.
    pub fn tag(&self) -> &str {
        match self {
            DataChannelEvent::ReceiveRawMessage(p) => &p.tag,
            DataChannelEvent::ReceiveMessage(p) => &p.tag,
            DataChannelEvent::StateChanged(p) => &p.tag,
        }
    }

    /// to_json renders the payload for hosts whose event emitter takes an
    /// untyped map.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| Error::ErrEventEncoding(e.to_string()))
    }
}

/// EventSink receives the events produced by data channel adapters.
///
/// Implementations are called from the native library's callback tasks and
/// must not block.
pub trait EventSink: Send + Sync {
    fn send_event(&self, event: DataChannelEvent);
}

impl EventSink for mpsc::UnboundedSender<DataChannelEvent> {
    fn send_event(&self, event: DataChannelEvent) {
        if let Err(err) = self.send(event) {
            log::warn!("dropping {}: event receiver is gone", err.0.name());
        }
    }
}
