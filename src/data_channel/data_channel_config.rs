use serde::Deserialize;

/// TextDecoding selects what happens to a text frame that is not valid UTF-8.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDecoding {
    /// Malformed sequences are replaced with U+FFFD and the event is emitted.
    #[default]
    Lossy,

    /// The event is dropped and a warning is logged.
    Strict,
}

/// DataChannelConfig is fixed when an adapter is created.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct DataChannelConfig {
    /// raw_binary delivers binary frames through the read-back slot instead
    /// of base64 text.
    pub raw_binary: bool,
    pub text_decoding: TextDecoding,
}
