use std::fmt;

use serde::Serialize;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;

/// DataChannelState is the lifecycle state of a data channel as reported to
/// the host. The native library owns the state machine; this is only an
/// observation of it.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataChannelState {
    /// A value the native library reported that has no host token.
    #[default]
    Unspecified,

    /// The channel is being established.
    Connecting,

    /// The underlying transport is established and messages can be sent.
    Open,

    /// The procedure to close down the underlying transport has started.
    Closing,

    /// The underlying transport has been closed or could not be established.
    Closed,
}

const DATA_CHANNEL_STATE_CONNECTING_STR: &str = "connecting";
const DATA_CHANNEL_STATE_OPEN_STR: &str = "open";
const DATA_CHANNEL_STATE_CLOSING_STR: &str = "closing";
const DATA_CHANNEL_STATE_CLOSED_STR: &str = "closed";
const UNSPECIFIED_STR: &str = "Unspecified";

impl DataChannelState {
    /// token returns the lowercase string the host expects, or None when the
    /// state has no host representation.
    pub fn token(&self) -> Option<&'static str> {
        match *self {
            DataChannelState::Connecting => Some(DATA_CHANNEL_STATE_CONNECTING_STR),
            DataChannelState::Open => Some(DATA_CHANNEL_STATE_OPEN_STR),
            DataChannelState::Closing => Some(DATA_CHANNEL_STATE_CLOSING_STR),
            DataChannelState::Closed => Some(DATA_CHANNEL_STATE_CLOSED_STR),
            DataChannelState::Unspecified => None,
        }
    }

    /// reportable returns the state if it has a host token.
    pub fn reportable(self) -> Option<Self> {
        self.token().map(|_| self)
    }
}

impl From<u8> for DataChannelState {
    fn from(v: u8) -> Self {
        match v {
            1 => DataChannelState::Connecting,
            2 => DataChannelState::Open,
            3 => DataChannelState::Closing,
            4 => DataChannelState::Closed,
            _ => DataChannelState::Unspecified,
        }
    }
}

impl From<RTCDataChannelState> for DataChannelState {
    fn from(state: RTCDataChannelState) -> Self {
        match state {
            RTCDataChannelState::Connecting => DataChannelState::Connecting,
            RTCDataChannelState::Open => DataChannelState::Open,
            RTCDataChannelState::Closing => DataChannelState::Closing,
            RTCDataChannelState::Closed => DataChannelState::Closed,
            RTCDataChannelState::Unspecified => DataChannelState::Unspecified,
        }
    }
}

impl fmt::Display for DataChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token().unwrap_or(UNSPECIFIED_STR))
    }
}
