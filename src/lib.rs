//! Bridges WebRTC data channels to a host application runtime.
//!
//! Each native data channel gets a [`DataChannelEventAdapter`] that turns
//! its callbacks into typed [`event::DataChannelEvent`]s for the host's event
//! emitter. The [`module::RTCModule`] keeps the channel table of every peer
//! connection and installs the synchronous script bindings the host uses to
//! send and pull raw binary frames.
//!
//! [`DataChannelEventAdapter`]: data_channel::DataChannelEventAdapter

#![warn(rust_2018_idioms)]
#![allow(dead_code)]

// re-export the wrapped native library
pub use webrtc;

pub mod data_channel;
pub mod error;
pub mod event;
pub mod module;

pub use error::Error;
