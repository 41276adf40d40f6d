//! WinRT-backed implementation of the platform stack (Windows only).
//!
//! - [`stack`] - device enumeration and resolution
//! - [`gatt`] - characteristic value access and UUID helpers
//! - [`socket`] - stream-socket channel for the Classic and direct-peer paths

pub mod gatt;
pub mod socket;
pub mod stack;

pub use stack::WinRtStack;

use crate::error::Error;

/// Maps a WinRT failure on an open channel to the transport error kind.
pub(crate) fn transport_err(e: windows::core::Error) -> Error {
    Error::Transport(e.to_string())
}
