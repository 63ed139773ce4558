use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU8, AtomicUsize, Ordering};

use bytes::Buf;
use tokio::sync::mpsc;
use tokio::sync::Mutex;
use webrtc::data_channel::data_channel_message::DataChannelMessage;

use super::*;
use crate::error::Error;

const TAG: &str = "4f1c2b";
const CONNECTION_ID: u32 = 12;

/// MockDataChannel is a DataChannelHandle whose observable values are set
/// by the test.
#[derive(Default)]
pub(crate) struct MockDataChannel {
    pub(crate) id: AtomicU16,
    pub(crate) ready_state: AtomicU8,
    pub(crate) buffered_amount: AtomicUsize,
    pub(crate) closed: AtomicBool,
    pub(crate) sent: Mutex<Vec<(Bytes, bool)>>,
}

impl MockDataChannel {
    pub(crate) fn new(id: u16, state: DataChannelState) -> Self {
        let dc = MockDataChannel {
            id: AtomicU16::new(id),
            ..Default::default()
        };
        dc.set_ready_state(state);
        dc
    }

    pub(crate) fn set_ready_state(&self, state: DataChannelState) {
        let v = match state {
            DataChannelState::Unspecified => 0,
            DataChannelState::Connecting => 1,
            DataChannelState::Open => 2,
            DataChannelState::Closing => 3,
            DataChannelState::Closed => 4,
        };
        self.ready_state.store(v, Ordering::SeqCst);
    }
}

#[async_trait]
impl DataChannelHandle for MockDataChannel {
    fn id(&self) -> u16 {
        self.id.load(Ordering::SeqCst)
    }

    fn ready_state(&self) -> DataChannelState {
        self.ready_state.load(Ordering::SeqCst).into()
    }

    async fn buffered_amount(&self) -> usize {
        self.buffered_amount.load(Ordering::SeqCst)
    }

    async fn send(&self, data: &Bytes) -> Result<usize> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::new("closed pipe".to_owned()));
        }
        self.sent.lock().await.push((data.clone(), false));
        Ok(data.len())
    }

    async fn send_text(&self, text: String) -> Result<usize> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::new("closed pipe".to_owned()));
        }
        let n = text.len();
        self.sent.lock().await.push((Bytes::from(text), true));
        Ok(n)
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        self.set_ready_state(DataChannelState::Closing);
        Ok(())
    }
}

fn new_adapter(
    config: DataChannelConfig,
) -> (
    DataChannelEventAdapter,
    Arc<MockDataChannel>,
    mpsc::UnboundedReceiver<DataChannelEvent>,
) {
    let dc = Arc::new(MockDataChannel::new(3, DataChannelState::Open));
    let (tx, rx) = mpsc::unbounded_channel();
    let adapter =
        DataChannelEventAdapter::new(TAG, CONNECTION_ID, dc.clone(), Arc::new(tx), config);
    (adapter, dc, rx)
}

fn raw_config() -> DataChannelConfig {
    DataChannelConfig {
        raw_binary: true,
        ..Default::default()
    }
}

fn drain(rx: &mut mpsc::UnboundedReceiver<DataChannelEvent>) -> Vec<DataChannelEvent> {
    let mut events = vec![];
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[test]
fn test_state_change_reports_each_state() {
    let (adapter, dc, mut rx) = new_adapter(DataChannelConfig::default());

    let tests = vec![
        (DataChannelState::Connecting, Some("connecting")),
        (DataChannelState::Open, Some("open")),
        (DataChannelState::Closing, Some("closing")),
        (DataChannelState::Closed, Some("closed")),
        (DataChannelState::Unspecified, None),
    ];

    for (state, expected) in tests {
        dc.set_ready_state(state);
        adapter.on_state_change();

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        match &events[0] {
            DataChannelEvent::StateChanged(p) => {
                assert_eq!(p.tag, TAG);
                assert_eq!(p.connection_id, CONNECTION_ID);
                assert_eq!(p.id, 3);
                assert_eq!(p.state.and_then(|s| s.token()), expected);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}

#[test]
fn test_state_change_out_of_range_value() {
    let (adapter, dc, mut rx) = new_adapter(DataChannelConfig::default());
    dc.ready_state.store(200, Ordering::SeqCst);

    adapter.on_state_change();

    let events = drain(&mut rx);
    assert_eq!(
        events,
        vec![DataChannelEvent::StateChanged(StateChangedPayload {
            tag: TAG.to_owned(),
            connection_id: CONNECTION_ID,
            id: 3,
            state: None,
        })]
    );
}

#[test]
fn test_binary_message_is_base64() {
    let (adapter, _dc, mut rx) = new_adapter(DataChannelConfig::default());

    adapter.on_message(DataChannelBuffer::new(
        Bytes::from_static(&[0x00, 0x01, 0x02, 0xfa, 0xff]),
        true,
    ));

    let events = drain(&mut rx);
    assert_eq!(
        events,
        vec![DataChannelEvent::ReceiveMessage(MessagePayload {
            tag: TAG.to_owned(),
            connection_id: CONNECTION_ID,
            message_type: MessageType::Binary,
            data: "AAEC+v8=".to_owned(),
        })]
    );
    assert_eq!(adapter.received_data(), None);
}

#[test]
fn test_large_binary_message_is_not_wrapped() {
    let (adapter, _dc, mut rx) = new_adapter(DataChannelConfig::default());

    adapter.on_message(DataChannelBuffer::new(Bytes::from(vec![0xabu8; 300]), true));

    match drain(&mut rx).pop() {
        Some(DataChannelEvent::ReceiveMessage(p)) => {
            assert_eq!(p.data.len(), 400);
            assert!(!p.data.contains('\n'));
            assert_eq!(BASE64_STANDARD.decode(&p.data).ok(), Some(vec![0xabu8; 300]));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn test_text_message() {
    let (adapter, _dc, mut rx) = new_adapter(DataChannelConfig::default());

    adapter.on_message(DataChannelBuffer::new(Bytes::from_static(b"hello"), false));

    let events = drain(&mut rx);
    assert_eq!(
        events,
        vec![DataChannelEvent::ReceiveMessage(MessagePayload {
            tag: TAG.to_owned(),
            connection_id: CONNECTION_ID,
            message_type: MessageType::Text,
            data: "hello".to_owned(),
        })]
    );
}

#[test]
fn test_text_message_in_raw_mode_stays_inline() {
    let (adapter, _dc, mut rx) = new_adapter(raw_config());

    adapter.on_message(DataChannelBuffer::new(Bytes::from_static(b"hi"), false));

    match drain(&mut rx).as_slice() {
        [DataChannelEvent::ReceiveMessage(p)] => {
            assert_eq!(p.message_type, MessageType::Text);
            assert_eq!(p.data, "hi");
        }
        other => panic!("unexpected events {other:?}"),
    }
    assert_eq!(adapter.received_data(), None);
}

#[test]
fn test_raw_binary_message_fires_one_event() {
    let (adapter, _dc, mut rx) = new_adapter(raw_config());

    adapter.on_message(DataChannelBuffer::new(Bytes::from_static(b"\x01\x02"), true));

    let events = drain(&mut rx);
    assert_eq!(
        events,
        vec![DataChannelEvent::ReceiveRawMessage(RawMessagePayload {
            tag: TAG.to_owned(),
            connection_id: CONNECTION_ID,
        })]
    );
    assert_eq!(adapter.received_data(), Some(Bytes::from_static(b"\x01\x02")));
}

#[test]
fn test_raw_binary_last_write_wins() {
    let (adapter, _dc, mut rx) = new_adapter(raw_config());

    adapter.on_message(DataChannelBuffer::new(Bytes::from_static(b"first"), true));
    adapter.on_message(DataChannelBuffer::new(Bytes::from_static(b"second"), true));

    assert_eq!(drain(&mut rx).len(), 2);
    assert_eq!(adapter.received_data(), Some(Bytes::from_static(b"second")));

    // reading does not clear the slot
    assert_eq!(adapter.received_data(), Some(Bytes::from_static(b"second")));
}

#[test]
fn test_segmented_buffer_is_made_contiguous() {
    let (adapter, _dc, mut rx) = new_adapter(raw_config());

    let segmented = Bytes::from_static(b"abc").chain(Bytes::from_static(b"def"));
    adapter.on_message(DataChannelBuffer::new(segmented, true));

    assert_eq!(drain(&mut rx).len(), 1);
    assert_eq!(adapter.received_data(), Some(Bytes::from_static(b"abcdef")));
}

#[test]
fn test_into_bytes_takes_contiguous_view() {
    let data = Bytes::from_static(b"contiguous");
    let buffer = DataChannelBuffer::new(data.clone(), true);
    assert_eq!(buffer.into_bytes(), data);

    let slice: &[u8] = b"slice";
    assert_eq!(
        DataChannelBuffer::new(slice, false).into_bytes(),
        Bytes::from_static(b"slice")
    );
}

#[test]
fn test_malformed_text_lossy() {
    let (adapter, _dc, mut rx) = new_adapter(DataChannelConfig::default());

    adapter.on_message(DataChannelBuffer::new(Bytes::from_static(b"ok\xffok"), false));

    match drain(&mut rx).as_slice() {
        [DataChannelEvent::ReceiveMessage(p)] => assert_eq!(p.data, "ok\u{FFFD}ok"),
        other => panic!("unexpected events {other:?}"),
    }
}

#[test]
fn test_malformed_text_strict_is_dropped() {
    let (adapter, _dc, mut rx) = new_adapter(DataChannelConfig {
        text_decoding: TextDecoding::Strict,
        ..Default::default()
    });

    adapter.on_message(DataChannelBuffer::new(Bytes::from_static(b"ok\xffok"), false));
    assert!(drain(&mut rx).is_empty());

    adapter.on_message(DataChannelBuffer::new(Bytes::from_static(b"fine"), false));
    assert_eq!(drain(&mut rx).len(), 1);
}

#[test]
fn test_notify_dispatch() {
    let (adapter, _dc, mut rx) = new_adapter(DataChannelConfig::default());

    adapter.notify(DataChannelNotification::BufferedAmountChange(1024));
    assert!(drain(&mut rx).is_empty());

    adapter.notify(DataChannelNotification::StateChange);
    adapter.notify(DataChannelNotification::Message(DataChannelBuffer::new(
        Bytes::from_static(b"x"),
        false,
    )));

    let names: Vec<&str> = drain(&mut rx).iter().map(|e| e.name()).collect();
    assert_eq!(
        names,
        vec!["dataChannelStateChanged", "dataChannelReceiveMessage"]
    );
}

#[test]
fn test_native_message_conversion() {
    let msg = DataChannelMessage {
        is_string: true,
        data: Bytes::from_static(b"text"),
    };
    let buffer = DataChannelBuffer::from(msg);
    assert!(!buffer.binary);

    let msg = DataChannelMessage {
        is_string: false,
        data: Bytes::from_static(b"\x00"),
    };
    assert!(DataChannelBuffer::from(msg).binary);
}

#[tokio::test]
async fn test_buffered_amount_is_not_cached() {
    let (adapter, dc, _rx) = new_adapter(DataChannelConfig::default());

    dc.buffered_amount.store(100, Ordering::SeqCst);
    assert_eq!(adapter.buffered_amount().await, 100);

    dc.buffered_amount.store(7, Ordering::SeqCst);
    assert_eq!(adapter.buffered_amount().await, 7);
}

#[test]
fn test_accessors() {
    let (adapter, _dc, _rx) = new_adapter(raw_config());

    assert_eq!(adapter.tag(), TAG);
    assert_eq!(adapter.connection_id(), CONNECTION_ID);
    assert!(adapter.raw_binary());
    assert_eq!(adapter.data_channel().id(), 3);
}
