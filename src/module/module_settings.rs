use serde::Deserialize;

use crate::data_channel::data_channel_config::{DataChannelConfig, TextDecoding};
use crate::error::{Error, Result};

pub(crate) const DEFAULT_BINDING_OBJECT_NAME: &str = "RTCBridge";

/// ModuleSettings influences how the module creates adapters and installs
/// its bindings. It can be built with the setters or parsed from the JSON
/// the host passes at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModuleSettings {
    pub(crate) raw_data_channels: bool,
    pub(crate) text_decoding: TextDecoding,
    pub(crate) binding_object_name: String,
}

impl Default for ModuleSettings {
    fn default() -> Self {
        ModuleSettings {
            raw_data_channels: false,
            text_decoding: TextDecoding::default(),
            binding_object_name: DEFAULT_BINDING_OBJECT_NAME.to_owned(),
        }
    }
}

impl ModuleSettings {
    /// from_json parses settings from the host. Missing keys keep their
    /// defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::ErrInvalidSettings(e.to_string()))
    }

    /// set_raw_data_channels sets the raw mode used when a channel is
    /// registered without an explicit one.
    pub fn set_raw_data_channels(&mut self, raw: bool) {
        self.raw_data_channels = raw;
    }

    pub fn set_text_decoding(&mut self, text_decoding: TextDecoding) {
        self.text_decoding = text_decoding;
    }

    /// set_binding_object_name sets the name of the global object the
    /// script bindings are installed under.
    pub fn set_binding_object_name(&mut self, name: impl Into<String>) {
        self.binding_object_name = name.into();
    }

    pub fn binding_object_name(&self) -> &str {
        self.binding_object_name.as_str()
    }

    pub(crate) fn data_channel_config(&self, raw: Option<bool>) -> DataChannelConfig {
        DataChannelConfig {
            raw_binary: raw.unwrap_or(self.raw_data_channels),
            text_decoding: self.text_decoding,
        }
    }
}
