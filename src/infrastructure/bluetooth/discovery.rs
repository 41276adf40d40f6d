//! Merged device discovery across the Classic and BLE enumeration paths.

use crate::domain::connection::{Connection, Connections};
use crate::domain::settings::{BleDiscoveryMode, TransportSettings};
use crate::error::Result;
use crate::infrastructure::bluetooth::stack::{BleDeviceInfo, BluetoothStack};
use tracing::info;

/// Standard GATT profile services (Generic Access, Generic Attribute,
/// Battery, ...) share this UUID prefix and never carry application data.
pub const RESERVED_SERVICE_PREFIX: &str = "000018";

pub fn is_reserved_service(uuid: &str) -> bool {
    uuid.to_ascii_lowercase().starts_with(RESERVED_SERVICE_PREFIX)
}

/// Enumerates both transports and merges the results into one ordered
/// collection: serial-port devices first, then BLE entries.
///
/// Any enumeration failure fails the whole scan; no partial list is
/// returned. When the adapter operates as a pre-paired device, the peer
/// identity is registered before enumerating.
pub(crate) async fn discover<S: BluetoothStack>(
    stack: &S,
    settings: &TransportSettings,
) -> Result<Connections> {
    if settings.pre_paired {
        stack.register_paired_identity()?;
    }

    let mut connections = Connections::new();

    let serial = stack.serial_port_devices().await?;
    info!("Enumerated {} serial-port device(s)", serial.len());
    for device in serial {
        connections.push(Connection::classic(device.name, device.id));
    }

    let ble = stack.ble_devices().await?;
    info!("Enumerated {} BLE device(s)", ble.len());
    for device in ble {
        push_ble_entries(&mut connections, device, settings.ble_discovery);
    }

    Ok(connections)
}

/// Turns one enumerated BLE device into descriptors according to the
/// configured mode. Per-service, a device with several qualifying services
/// gets `-N` name suffixes; a single qualifying service gets none.
fn push_ble_entries(
    connections: &mut Connections,
    device: BleDeviceInfo,
    mode: BleDiscoveryMode,
) {
    match mode {
        BleDiscoveryMode::PerDevice => {
            connections.push(Connection::ble(
                format!("{} (BLE)", device.name),
                device.id,
                None,
            ));
        }
        BleDiscoveryMode::PerService => {
            let services: Vec<&String> = device
                .service_uuids
                .iter()
                .filter(|uuid| !is_reserved_service(uuid))
                .collect();
            let multiple = services.len() > 1;

            for (index, uuid) in services.into_iter().enumerate() {
                let name = if multiple {
                    format!("{} (BLE-{})", device.name, index + 1)
                } else {
                    format!("{} (BLE)", device.name)
                };
                connections.push(Connection::ble(name, device.id.clone(), Some(uuid.clone())));
            }
        }
    }
}
