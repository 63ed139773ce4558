
pub mod engine_context;
pub mod module_installer;
pub mod module_settings;

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use engine_context::*;
use module_settings::ModuleSettings;
use rand::{thread_rng, Rng};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use webrtc::data_channel::RTCDataChannel;
use webrtc::util::sync::Mutex as SyncMutex;

use crate::data_channel::rtc_data_channel::bind_rtc_data_channel;
use crate::data_channel::{DataChannelEventAdapter, DataChannelHandle};
use crate::error::{Error, Result};
use crate::event::EventSink;

pub const DATA_CHANNEL_SEND: &str = "dataChannelSend";
pub const DATA_CHANNEL_RECEIVE: &str = "dataChannelReceive";

const RUNES_ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const TAG_LEN: usize = 16;

type ChannelKey = (u32, String);

/// DataChannelEntry is a row of the channel table. Frames queued on
/// `outgoing` are written to the native channel in order by a single send
/// loop, which exits once the entry is dropped.
struct DataChannelEntry {
    adapter: Arc<DataChannelEventAdapter>,
    outgoing: mpsc::UnboundedSender<Bytes>,
}

pub(crate) fn generate_tag() -> String {
    let mut rng = thread_rng();

    (0..TAG_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..RUNES_ALPHANUMERIC.len());
            RUNES_ALPHANUMERIC[idx] as char
        })
        .collect()
}

/// RTCModule is the native side of the host's RTC module. It owns the data
/// channel table of every peer connection and serves the host's requests
/// against it.
pub struct RTCModule {
    settings: ModuleSettings,
    sink: Arc<dyn EventSink>,
    runtime: Handle,
    data_channels: SyncMutex<HashMap<ChannelKey, DataChannelEntry>>,
}

impl RTCModule {
    /// new creates a module that reports events to `sink` and runs sends
    /// issued from script on `runtime`.
    pub fn new(settings: ModuleSettings, sink: Arc<dyn EventSink>, runtime: Handle) -> Self {
        RTCModule {
            settings,
            sink,
            runtime,
            data_channels: SyncMutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &ModuleSettings {
        &self.settings
    }

    /// register_data_channel adds a data channel created or accepted by peer
    /// connection `peer_connection_id` to the table under a fresh tag.
    /// `raw` overrides the module's default raw mode.
    pub fn register_data_channel(
        &self,
        peer_connection_id: u32,
        data_channel: Arc<dyn DataChannelHandle>,
        raw: Option<bool>,
    ) -> Arc<DataChannelEventAdapter> {
        let config = self.settings.data_channel_config(raw);
        let mut data_channels = self.data_channels.lock();

        let mut tag = generate_tag();
        while data_channels.contains_key(&(peer_connection_id, tag.clone())) {
            tag = generate_tag();
        }

        let adapter = Arc::new(DataChannelEventAdapter::new(
            tag.clone(),
            peer_connection_id,
            Arc::clone(&data_channel),
            Arc::clone(&self.sink),
            config,
        ));

        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        self.runtime.spawn(send_loop(tag.clone(), data_channel, outgoing_rx));

        data_channels.insert(
            (peer_connection_id, tag),
            DataChannelEntry {
                adapter: Arc::clone(&adapter),
                outgoing,
            },
        );

        log::debug!(
            "registered data channel {} on peer connection {} (raw: {})",
            adapter.tag(),
            peer_connection_id,
            config.raw_binary
        );

        adapter
    }

    /// register_rtc_data_channel registers a native data channel and routes
    /// its callbacks to the new adapter.
    pub async fn register_rtc_data_channel(
        &self,
        peer_connection_id: u32,
        dc: Arc<RTCDataChannel>,
        raw: Option<bool>,
    ) -> Arc<DataChannelEventAdapter> {
        let handle: Arc<dyn DataChannelHandle> = dc.clone();
        let adapter = self.register_data_channel(peer_connection_id, handle, raw);
        bind_rtc_data_channel(&adapter, &dc).await;
        adapter
    }

    /// data_channel looks up a registered channel.
    pub fn data_channel(
        &self,
        peer_connection_id: u32,
        tag: &str,
    ) -> Result<Arc<DataChannelEventAdapter>> {
        self.data_channels
            .lock()
            .get(&(peer_connection_id, tag.to_owned()))
            .map(|entry| Arc::clone(&entry.adapter))
            .ok_or_else(|| Error::ErrDataChannelNotFound {
                peer_connection_id,
                tag: tag.to_owned(),
            })
    }

    /// data_channel_send writes a frame directly and waits for the native
    /// channel. Frames from script go through `enqueue_send` instead.
    pub async fn data_channel_send(
        &self,
        peer_connection_id: u32,
        tag: &str,
        data: Bytes,
    ) -> Result<usize> {
        let adapter = self.data_channel(peer_connection_id, tag)?;
        adapter.data_channel().send(&data).await
    }

    /// enqueue_send queues a binary frame for the channel's send loop and
    /// returns without waiting for the native write.
    pub fn enqueue_send(&self, peer_connection_id: u32, tag: &str, data: Bytes) -> Result<()> {
        let data_channels = self.data_channels.lock();
        let entry = data_channels
            .get(&(peer_connection_id, tag.to_owned()))
            .ok_or_else(|| Error::ErrDataChannelNotFound {
                peer_connection_id,
                tag: tag.to_owned(),
            })?;
        entry
            .outgoing
            .send(data)
            .map_err(|_| Error::new(format!("data channel {tag}: send loop is gone")))
    }

    pub async fn data_channel_send_text(
        &self,
        peer_connection_id: u32,
        tag: &str,
        text: String,
    ) -> Result<usize> {
        let adapter = self.data_channel(peer_connection_id, tag)?;
        adapter.data_channel().send_text(text).await
    }

    /// data_channel_close closes the native channel and reports the new
    /// state, since a locally initiated close raises no callback.
    pub async fn data_channel_close(&self, peer_connection_id: u32, tag: &str) -> Result<()> {
        let adapter = self.data_channel(peer_connection_id, tag)?;
        adapter.data_channel().close().await?;
        adapter.on_state_change();
        Ok(())
    }

    /// data_channel_receive returns the last raw binary frame of a channel.
    pub fn data_channel_receive(
        &self,
        peer_connection_id: u32,
        tag: &str,
    ) -> Result<Option<Bytes>> {
        Ok(self.data_channel(peer_connection_id, tag)?.received_data())
    }

    /// data_channel_dispose drops a channel from the table.
    pub fn data_channel_dispose(
        &self,
        peer_connection_id: u32,
        tag: &str,
    ) -> Option<Arc<DataChannelEventAdapter>> {
        let removed = self
            .data_channels
            .lock()
            .remove(&(peer_connection_id, tag.to_owned()))
            .map(|entry| entry.adapter);
        if removed.is_some() {
            log::debug!(
                "disposed data channel {} on peer connection {}",
                tag,
                peer_connection_id
            );
        }
        removed
    }

    /// remove_peer_connection drops every channel of a peer connection and
    /// returns how many there were.
    pub fn remove_peer_connection(&self, peer_connection_id: u32) -> usize {
        let mut data_channels = self.data_channels.lock();
        let before = data_channels.len();
        data_channels.retain(|(pc_id, _), _| *pc_id != peer_connection_id);
        before - data_channels.len()
    }

    /// install_bindings exposes `dataChannelSend` and `dataChannelReceive` to
    /// script under the configured global object.
    pub fn install_bindings(self: &Arc<Self>, engine: &mut dyn EngineContext) -> Result<()> {
        let module = Arc::clone(self);
        let data_channel_send: HostFunction =
            Arc::new(move |args: &[HostValue]| -> Result<HostValue> {
                let peer_connection_id = arg_u32(DATA_CHANNEL_SEND, args, 0)?;
                let tag = arg_str(DATA_CHANNEL_SEND, args, 1)?;
                let data = arg_array_buffer(DATA_CHANNEL_SEND, args, 2)?;

                module.enqueue_send(peer_connection_id, tag, data)?;
                Ok(HostValue::Bool(true))
            });

        let module = Arc::clone(self);
        let data_channel_receive: HostFunction =
            Arc::new(move |args: &[HostValue]| -> Result<HostValue> {
                let peer_connection_id = arg_u32(DATA_CHANNEL_RECEIVE, args, 0)?;
                let tag = arg_str(DATA_CHANNEL_RECEIVE, args, 1)?;

                Ok(match module.data_channel_receive(peer_connection_id, tag)? {
                    Some(data) => HostValue::ArrayBuffer(data),
                    None => HostValue::Undefined,
                })
            });

        engine.set_global_object(
            self.settings.binding_object_name(),
            vec![
                (DATA_CHANNEL_SEND, data_channel_send),
                (DATA_CHANNEL_RECEIVE, data_channel_receive),
            ],
        )
    }
}

/// send_loop writes queued frames to `data_channel` one at a time until the
/// queue's sender is dropped.
async fn send_loop(
    tag: String,
    data_channel: Arc<dyn DataChannelHandle>,
    mut outgoing: mpsc::UnboundedReceiver<Bytes>,
) {
    while let Some(data) = outgoing.recv().await {
        if let Err(err) = data_channel.send(&data).await {
            log::warn!("data channel {}: send failed: {}", tag, err);
        }
    }
    log::trace!("data channel {}: send loop exited", tag);
}
