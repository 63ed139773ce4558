use bytes::{Buf, BufMut, Bytes, BytesMut};
use webrtc::data_channel::data_channel_message::DataChannelMessage;

/// DataChannelBuffer is a message delivered by the native data channel: a
/// view over the payload bytes and whether the sender framed it as binary.
#[derive(Debug, Clone)]
pub struct DataChannelBuffer<B = Bytes> {
    pub data: B,
    pub binary: bool,
}

impl<B: Buf> DataChannelBuffer<B> {
    pub fn new(data: B, binary: bool) -> Self {
        DataChannelBuffer { data, binary }
    }

    /// into_bytes extracts the payload as one contiguous, owned byte sequence.
    /// A view that already exposes all of its bytes in a single chunk is taken
    /// as is; a segmented view is copied chunk by chunk.
    pub fn into_bytes(mut self) -> Bytes {
        let remaining = self.data.remaining();
        if self.data.chunk().len() == remaining {
            return self.data.copy_to_bytes(remaining);
        }

        let mut bytes = BytesMut::with_capacity(remaining);
        while self.data.has_remaining() {
            let chunk = self.data.chunk();
            let n = chunk.len();
            bytes.put_slice(chunk);
            self.data.advance(n);
        }
        bytes.freeze()
    }
}

impl From<DataChannelMessage> for DataChannelBuffer {
    fn from(msg: DataChannelMessage) -> Self {
        DataChannelBuffer {
            data: msg.data,
            binary: !msg.is_string,
        }
    }
}
