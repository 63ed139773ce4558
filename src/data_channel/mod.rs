#[cfg(test)]
pub(crate) mod data_channel_test;

pub mod data_channel_buffer;
pub mod data_channel_config;
pub mod data_channel_state;
pub mod rtc_data_channel;

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use bytes::{Buf, Bytes};
use data_channel_buffer::DataChannelBuffer;
use data_channel_config::{DataChannelConfig, TextDecoding};
use data_channel_state::DataChannelState;

use crate::error::Result;
use crate::event::{
    DataChannelEvent, EventSink, MessagePayload, MessageType, RawMessagePayload,
    StateChangedPayload,
};

/// DataChannelHandle is the part of a native data channel the bridge needs.
#[async_trait]
pub trait DataChannelHandle: Send + Sync {
    /// id is the SCTP stream id of the channel.
    fn id(&self) -> u16;

    fn ready_state(&self) -> DataChannelState;

    /// buffered_amount is the number of bytes queued for send but not yet
    /// handed to the transport.
    async fn buffered_amount(&self) -> usize;

    async fn send(&self, data: &Bytes) -> Result<usize>;

    async fn send_text(&self, text: String) -> Result<usize>;

    async fn close(&self) -> Result<()>;
}

/// DataChannelNotification is one callback from the native data channel.
#[derive(Debug)]
pub enum DataChannelNotification {
    Message(DataChannelBuffer),
    StateChange,
    /// Not forwarded to the host. Kept as a no-op until the host defines a
    /// bufferedamountlow event.
    BufferedAmountChange(usize),
}

/// DataChannelEventAdapter turns the notifications of one native data channel
/// into host events. It lives in the owning peer connection's channel table
/// for as long as the channel does.
pub struct DataChannelEventAdapter {
    tag: String,
    connection_id: u32,
    config: DataChannelConfig,
    data_channel: Arc<dyn DataChannelHandle>,
    sink: Arc<dyn EventSink>,

    // Single slot, last write wins. A second raw frame arriving before the
    // host reads the first one replaces it.
    received: ArcSwapOption<Bytes>,
}

impl DataChannelEventAdapter {
    pub fn new(
        tag: impl Into<String>,
        connection_id: u32,
        data_channel: Arc<dyn DataChannelHandle>,
        sink: Arc<dyn EventSink>,
        config: DataChannelConfig,
    ) -> Self {
        DataChannelEventAdapter {
            tag: tag.into(),
            connection_id,
            config,
            data_channel,
            sink,
            received: ArcSwapOption::empty(),
        }
    }

    pub fn tag(&self) -> &str {
        self.tag.as_str()
    }

    pub fn connection_id(&self) -> u32 {
        self.connection_id
    }

    pub fn raw_binary(&self) -> bool {
        self.config.raw_binary
    }

    pub fn data_channel(&self) -> &Arc<dyn DataChannelHandle> {
        &self.data_channel
    }

    /// notify dispatches a native notification to its handler.
    pub fn notify(&self, notification: DataChannelNotification) {
        match notification {
            DataChannelNotification::Message(buffer) => self.on_message(buffer),
            DataChannelNotification::StateChange => self.on_state_change(),
            DataChannelNotification::BufferedAmountChange(amount) => {
                self.on_buffered_amount_change(amount)
            }
        }
    }

    /// on_buffered_amount_change is intentionally unhandled.
    pub fn on_buffered_amount_change(&self, amount: usize) {
        log::trace!(
            "data channel {}: buffered amount changed to {}",
            self.tag,
            amount
        );
    }

    pub fn on_message<B: Buf>(&self, buffer: DataChannelBuffer<B>) {
        let binary = buffer.binary;
        let bytes = buffer.into_bytes();

        if self.config.raw_binary && binary {
            self.receive_data(bytes);
            self.sink
                .send_event(DataChannelEvent::ReceiveRawMessage(RawMessagePayload {
                    tag: self.tag.clone(),
                    connection_id: self.connection_id,
                }));
            return;
        }

        let (message_type, data) = if binary {
            (MessageType::Binary, BASE64_STANDARD.encode(&bytes))
        } else {
            match self.decode_text(bytes) {
                Ok(text) => (MessageType::Text, text),
                Err(err) => {
                    log::warn!("data channel {}: dropping text message: {}", self.tag, err);
                    return;
                }
            }
        };

        self.sink
            .send_event(DataChannelEvent::ReceiveMessage(MessagePayload {
                tag: self.tag.clone(),
                connection_id: self.connection_id,
                message_type,
                data,
            }));
    }

    pub fn on_state_change(&self) {
        let state = self.data_channel.ready_state();
        log::debug!("data channel {}: state changed to {}", self.tag, state);

        self.sink
            .send_event(DataChannelEvent::StateChanged(StateChangedPayload {
                tag: self.tag.clone(),
                connection_id: self.connection_id,
                id: self.data_channel.id(),
                state: state.reportable(),
            }));
    }

    pub async fn buffered_amount(&self) -> usize {
        self.data_channel.buffered_amount().await
    }

    /// received_data returns the most recent raw binary frame, if any.
    pub fn received_data(&self) -> Option<Bytes> {
        self.received.load_full().map(|data| (*data).clone())
    }

    fn receive_data(&self, data: Bytes) {
        self.received.store(Some(Arc::new(data)));
    }

    fn decode_text(&self, bytes: Bytes) -> Result<String> {
        match self.config.text_decoding {
            TextDecoding::Lossy => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            TextDecoding::Strict => Ok(String::from_utf8(bytes.to_vec())?),
        }
    }
}
