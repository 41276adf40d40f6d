//! Connection descriptors produced by discovery and consumed by connect.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Originating transport of a discovered peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transport {
    /// Bluetooth Classic, RFCOMM serial-port profile.
    Classic,
    /// Bluetooth Low Energy, GATT characteristic pair.
    Ble,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Classic => write!(f, "Classic"),
            Transport::Ble => write!(f, "BLE"),
        }
    }
}

/// Remote service identifier used when a descriptor already carries its own
/// host and no RFCOMM resolution runs.
pub const DIRECT_PEER_SERVICE: &str = "1";

/// Remote endpoint of the socket path: a host name plus the platform's
/// remote service name (the RFCOMM channel selector).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub host: String,
    pub service: String,
}

impl ServiceEndpoint {
    /// Endpoint for a direct peer, fixed to remote service `"1"`.
    pub fn direct(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            service: DIRECT_PEER_SERVICE.to_string(),
        }
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.service)
    }
}

/// How a descriptor is turned into a live channel, matched exhaustively at
/// connect time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    /// A peer that already carries its own host; connects straight to the
    /// fixed remote service.
    DirectPeer { host: String },
    /// An RFCOMM serial-port device, resolved to an endpoint at connect
    /// time.
    ClassicDevice { device_id: String },
    /// A BLE device. `service_uuid` scopes the characteristic search to one
    /// GATT service when discovery ran per-service; `None` searches every
    /// non-reserved service on the device.
    BleDevice {
        device_id: String,
        service_uuid: Option<String>,
    },
}

/// One discovered peer. Immutable after discovery; a new scan produces a
/// fresh collection rather than patching the old one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub name: String,
    pub transport: Transport,
    pub target: ConnectionTarget,
}

impl Connection {
    pub fn direct_peer(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transport: Transport::Classic,
            target: ConnectionTarget::DirectPeer { host: host.into() },
        }
    }

    pub fn classic(name: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transport: Transport::Classic,
            target: ConnectionTarget::ClassicDevice {
                device_id: device_id.into(),
            },
        }
    }

    pub fn ble(
        name: impl Into<String>,
        device_id: impl Into<String>,
        service_uuid: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            transport: Transport::Ble,
            target: ConnectionTarget::BleDevice {
                device_id: device_id.into(),
                service_uuid,
            },
        }
    }
}

/// Ordered discovery result: Classic serial-port entries first, then BLE.
pub type Connections = Vec<Connection>;

/// Lifecycle of the transport's single connection slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Unconnected,
    Connecting,
    Open,
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_endpoint_uses_fixed_service() {
        let endpoint = ServiceEndpoint::direct("bthost");
        assert_eq!(endpoint.host, "bthost");
        assert_eq!(endpoint.service, "1");
    }

    #[test]
    fn constructors_tag_the_transport() {
        assert_eq!(Connection::classic("a", "id").transport, Transport::Classic);
        assert_eq!(Connection::direct_peer("a", "h").transport, Transport::Classic);
        assert_eq!(Connection::ble("a", "id", None).transport, Transport::Ble);
    }
}
