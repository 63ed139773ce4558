use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::data_channel::RTCDataChannel;

use super::data_channel_state::DataChannelState;
use super::{DataChannelEventAdapter, DataChannelHandle, DataChannelNotification};
use crate::error::Result;

#[async_trait]
impl DataChannelHandle for RTCDataChannel {
    fn id(&self) -> u16 {
        RTCDataChannel::id(self)
    }

    fn ready_state(&self) -> DataChannelState {
        RTCDataChannel::ready_state(self).into()
    }

    async fn buffered_amount(&self) -> usize {
        RTCDataChannel::buffered_amount(self).await
    }

    async fn send(&self, data: &Bytes) -> Result<usize> {
        Ok(RTCDataChannel::send(self, data).await?)
    }

    async fn send_text(&self, text: String) -> Result<usize> {
        Ok(RTCDataChannel::send_text(self, text).await?)
    }

    async fn close(&self) -> Result<()> {
        Ok(RTCDataChannel::close(self).await?)
    }
}

/// bind_rtc_data_channel routes the callbacks of `dc` into `adapter`.
///
/// Open, close and error all surface as a state change. The handlers only
/// hold weak references, so dropping the adapter from the channel table
/// silences them.
pub async fn bind_rtc_data_channel(
    adapter: &Arc<DataChannelEventAdapter>,
    dc: &Arc<RTCDataChannel>,
) {
    let weak_adapter = Arc::downgrade(adapter);
    dc.on_message(Box::new(move |msg: DataChannelMessage| {
        if let Some(adapter) = weak_adapter.upgrade() {
            adapter.notify(DataChannelNotification::Message(msg.into()));
        }
        Box::pin(async {})
    }));

    let weak_adapter = Arc::downgrade(adapter);
    dc.on_open(Box::new(move || {
        if let Some(adapter) = weak_adapter.upgrade() {
            adapter.notify(DataChannelNotification::StateChange);
        }
        Box::pin(async {})
    }));

    let weak_adapter = Arc::downgrade(adapter);
    dc.on_close(Box::new(move || {
        if let Some(adapter) = weak_adapter.upgrade() {
            adapter.notify(DataChannelNotification::StateChange);
        }
        Box::pin(async {})
    }));

    let weak_adapter = Arc::downgrade(adapter);
    dc.on_error(Box::new(move |err: webrtc::Error| {
        if let Some(adapter) = weak_adapter.upgrade() {
            log::warn!("data channel {}: {}", adapter.tag(), err);
            adapter.notify(DataChannelNotification::StateChange);
        }
        Box::pin(async {})
    }));

    let weak_adapter = Arc::downgrade(adapter);
    let weak_dc = Arc::downgrade(dc);
    dc.on_buffered_amount_low(Box::new(move || {
        let weak_adapter = weak_adapter.clone();
        let weak_dc = weak_dc.clone();
        Box::pin(async move {
            if let (Some(adapter), Some(dc)) = (weak_adapter.upgrade(), weak_dc.upgrade()) {
                let amount = RTCDataChannel::buffered_amount(&dc).await;
                adapter.notify(DataChannelNotification::BufferedAmountChange(amount));
            }
        })
    }))
    .await;
}
