//! Error taxonomy for discovery and connection attempts.
//!
//! Expected failure paths (a missing service, a characteristic that is not
//! there, a socket that never answers) are values, not panics. The transport
//! facade catches everything at the `connect` boundary and normalizes it to
//! a boolean result, logging the error kind once.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// What a failed resolution step was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// The RFCOMM serial service behind a Classic device id.
    SerialService,
    /// The BLE device behind a device id.
    BleDevice,
    /// A qualifying GATT service on the resolved device.
    GattService,
    /// A read- or notify-capable characteristic.
    ReadCharacteristic,
    /// A write-capable characteristic.
    WriteCharacteristic,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::SerialService => "serial service",
            Resource::BleDevice => "BLE device",
            Resource::GattService => "GATT service",
            Resource::ReadCharacteristic => "read characteristic",
            Resource::WriteCharacteristic => "write characteristic",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// Device enumeration failed; discovery returns no partial list.
    #[error("device enumeration failed: {0}")]
    Enumeration(String),

    /// A platform handle named by a descriptor could not be obtained.
    #[error("{0} not obtainable")]
    Resolution(Resource),

    /// Opening or using the underlying transport failed.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The socket connect did not complete within the deadline.
    #[error("connection attempt timed out after {0:?}")]
    Timeout(Duration),

    /// A caller-supplied argument was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A connect attempt is already in flight on this transport.
    #[error("connect already in progress")]
    Busy,
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_message_names_the_missing_resource() {
        let err = Error::Resolution(Resource::WriteCharacteristic);
        assert_eq!(err.to_string(), "write characteristic not obtainable");
    }

    #[test]
    fn timeout_message_carries_the_deadline() {
        let err = Error::Timeout(Duration::from_secs(10));
        assert!(err.to_string().contains("10s"));
    }
}
