//! Platform capability seam consumed by discovery and connect.
//!
//! Everything this adapter needs from the native Bluetooth stack is behind
//! [`BluetoothStack`]: device enumeration for both transports, pre-paired
//! identity registration, endpoint/characteristic resolution, and the raw
//! socket primitive. The WinRT implementation lives in
//! [`super::winrt`]; tests drive the same contract with a fake.

use crate::domain::channel::Channel;
use crate::domain::connection::ServiceEndpoint;
use crate::error::Result;
use crate::infrastructure::bluetooth::streams::CharacteristicIo;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// One RFCOMM serial-port-profile device, as enumerated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialDeviceInfo {
    pub name: String,
    pub id: String,
}

/// One BLE device, as enumerated, with the UUIDs of its hosted GATT
/// services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BleDeviceInfo {
    pub name: String,
    pub id: String,
    pub service_uuids: Vec<String>,
}

/// A resolved GATT characteristic: its property bits plus the live handle
/// used for value reads and writes.
#[derive(Clone)]
pub struct GattCharacteristicHandle {
    pub properties: u32,
    pub io: Arc<dyn CharacteristicIo>,
}

impl fmt::Debug for GattCharacteristicHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GattCharacteristicHandle")
            .field("properties", &format_args!("{:#06x}", self.properties))
            .finish_non_exhaustive()
    }
}

/// Native Bluetooth capabilities this adapter layers over.
#[async_trait]
pub trait BluetoothStack: Send + Sync {
    /// Registers the `Bluetooth:Paired` alternate identity with the
    /// platform peer-discovery subsystem. Idempotent; not a connection.
    fn register_paired_identity(&self) -> Result<()>;

    /// Enumerates RFCOMM serial-port-profile devices.
    async fn serial_port_devices(&self) -> Result<Vec<SerialDeviceInfo>>;

    /// Enumerates BLE devices together with their hosted service UUIDs.
    async fn ble_devices(&self) -> Result<Vec<BleDeviceInfo>>;

    /// Resolves a Classic device id to its RFCOMM connection endpoint.
    async fn resolve_serial_endpoint(&self, device_id: &str) -> Result<ServiceEndpoint>;

    /// Resolves the characteristics of a BLE device. With a `service_uuid`
    /// the search is scoped to that GATT service; without one every
    /// non-reserved service on the device contributes its characteristics,
    /// in service order.
    async fn ble_characteristics(
        &self,
        device_id: &str,
        service_uuid: Option<&str>,
    ) -> Result<Vec<GattCharacteristicHandle>>;

    /// Opens a stream socket to `endpoint`, giving up after `timeout`.
    async fn open_socket(&self, endpoint: &ServiceEndpoint, timeout: Duration) -> Result<Channel>;
}
