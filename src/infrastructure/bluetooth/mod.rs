//! Bluetooth Module
//!
//! Adapts the platform Bluetooth stack into the transport contract the
//! communication service consumes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                   BluetoothTransport                     │
//! │   (facade: discovery, connect sequence, state machine)   │
//! └─────────────────────┬───────────────────────────────────┘
//!                       │
//!         ┌─────────────┼─────────────┐
//!         │             │             │
//!         ▼             ▼             ▼
//! ┌───────────┐  ┌────────────┐  ┌──────────┐
//! │ Discovery │  │  Connect   │  │ Streams  │
//! │           │  │            │  │          │
//! │ - RFCOMM  │  │ - endpoint │  │ - char.  │
//! │   + BLE   │  │   resolve  │  │   read/  │
//! │   merge   │  │ - char.    │  │   write  │
//! │           │  │   pairing  │  │  adapters│
//! └───────────┘  └────────────┘  └──────────┘
//!         │             │             │
//!         └─────────────┴──────┬──────┘
//!                              ▼
//!                    ┌──────────────────┐
//!                    │  BluetoothStack  │
//!                    │ (platform seam;  │
//!                    │  WinRT on win)   │
//!                    └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`stack`] - the platform capability seam consumed by this layer
//! - [`discovery`] - merged Classic + BLE device enumeration
//! - [`connect`] - descriptor resolution and channel establishment
//! - [`streams`] - characteristic stream adapters and property selection
//! - [`service`] - the transport facade handed to the service framework
//! - [`winrt`] - WinRT-backed stack implementation (Windows only)

pub mod connect;
pub mod discovery;
pub mod service;
pub mod stack;
pub mod streams;

#[cfg(windows)]
pub mod winrt;

#[cfg(test)]
pub(crate) mod fake;

// Re-export the facade for convenience
pub use service::BluetoothTransport;
