use std::string::FromUtf8Error;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// ErrDataChannelNotFound indicates that no data channel is registered
    /// under the given peer connection id and tag.
    #[error("data channel {tag} not found on peer connection {peer_connection_id}")]
    ErrDataChannelNotFound { peer_connection_id: u32, tag: String },

    /// ErrInvalidArgument indicates that a host function was called with a
    /// missing or mistyped argument.
    #[error("{function}: invalid argument {index}, expected {expected}")]
    ErrInvalidArgument {
        function: &'static str,
        index: usize,
        expected: &'static str,
    },

    /// ErrBindingInstall indicates that the engine context refused the
    /// script bindings.
    #[error("failed to install script bindings: {0}")]
    ErrBindingInstall(String),

    /// ErrInvalidSettings indicates that host supplied settings could not
    /// be parsed.
    #[error("invalid module settings: {0}")]
    ErrInvalidSettings(String),

    /// ErrEventEncoding indicates that an event payload could not be
    /// converted to its JSON form.
    #[error("event encoding: {0}")]
    ErrEventEncoding(String),

    #[error("{0}")]
    WebRTC(#[from] webrtc::Error),

    #[error("utf-8 error: {0}")]
    Utf8(#[from] FromUtf8Error),

    #[allow(non_camel_case_types)]
    #[error("{0}")]
    new(String),
}
