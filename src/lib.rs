//! Bluetooth transport adapter for a multi-transport communication service.
//!
//! Discovers nearby Bluetooth Classic (RFCOMM serial-port profile) and
//! Bluetooth Low Energy peers, merges them into one ordered connection list,
//! and turns a selected entry into a live byte channel: a stream socket for
//! Classic and direct peers, or a GATT characteristic pair wrapped in stream
//! adapters for BLE. The opened channel is handed to a [`ChannelSink`] owned
//! by the surrounding service framework, which drives all send/receive
//! traffic from then on.
//!
//! The platform's native Bluetooth stack sits behind the [`BluetoothStack`]
//! trait; [`WinRtStack`] is the production implementation on Windows. The
//! rest of the crate is platform-neutral and testable anywhere.

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use domain::channel::{
    CancelFlag, Channel, ChannelEvent, ChannelReader, ChannelSink, ChannelWriter, EventSender,
};
pub use domain::connection::{
    Connection, ConnectionState, ConnectionTarget, Connections, ServiceEndpoint, Transport,
};
pub use domain::settings::{BleDiscoveryMode, LogSettings, TransportSettings};
pub use error::{Error, Resource, Result};
pub use infrastructure::bluetooth::service::BluetoothTransport;
pub use infrastructure::bluetooth::stack::{
    BleDeviceInfo, BluetoothStack, GattCharacteristicHandle, SerialDeviceInfo,
};
pub use infrastructure::bluetooth::streams::{
    CharacteristicInputStream, CharacteristicIo, CharacteristicOutputStream,
};

#[cfg(windows)]
pub use infrastructure::bluetooth::winrt::WinRtStack;
