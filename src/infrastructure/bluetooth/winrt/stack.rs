//! Device enumeration and resolution over the Windows Bluetooth stack.

use crate::domain::channel::Channel;
use crate::domain::connection::ServiceEndpoint;
use crate::error::{Error, Resource, Result};
use crate::infrastructure::bluetooth::discovery::is_reserved_service;
use crate::infrastructure::bluetooth::stack::{
    BleDeviceInfo, BluetoothStack, GattCharacteristicHandle, SerialDeviceInfo,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use windows::core::HSTRING;
use windows::Devices::Bluetooth::BluetoothLEDevice;
use windows::Devices::Bluetooth::GenericAttributeProfile::{
    GattCharacteristic, GattCommunicationStatus, GattDeviceService,
};
use windows::Devices::Bluetooth::Rfcomm::{RfcommDeviceService, RfcommServiceId};
use windows::Devices::Enumeration::DeviceInformation;
use windows::Networking::Proximity::PeerFinder;

use super::gatt::{self, WinRtCharacteristic};
use super::socket;

/// Production [`BluetoothStack`] over the WinRT Bluetooth APIs.
#[derive(Debug, Default, Clone, Copy)]
pub struct WinRtStack;

impl WinRtStack {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BluetoothStack for WinRtStack {
    fn register_paired_identity(&self) -> Result<()> {
        register_identity().map_err(|e| Error::Enumeration(e.to_string()))
    }

    async fn serial_port_devices(&self) -> Result<Vec<SerialDeviceInfo>> {
        enumerate_serial()
            .await
            .map_err(|e| Error::Enumeration(e.to_string()))
    }

    async fn ble_devices(&self) -> Result<Vec<BleDeviceInfo>> {
        enumerate_ble()
            .await
            .map_err(|e| Error::Enumeration(e.to_string()))
    }

    async fn resolve_serial_endpoint(&self, device_id: &str) -> Result<ServiceEndpoint> {
        resolve_serial(device_id).await.map_err(|e| {
            debug!("Serial service resolution for {} failed: {}", device_id, e);
            Error::Resolution(Resource::SerialService)
        })
    }

    async fn ble_characteristics(
        &self,
        device_id: &str,
        service_uuid: Option<&str>,
    ) -> Result<Vec<GattCharacteristicHandle>> {
        let device = BluetoothLEDevice::FromIdAsync(&HSTRING::from(device_id))
            .map_err(|_| Error::Resolution(Resource::BleDevice))?
            .await
            .map_err(|_| Error::Resolution(Resource::BleDevice))?;

        let services = device_services(&device).await.map_err(|e| {
            debug!("GATT service query for {} failed: {}", device_id, e);
            Error::Resolution(Resource::GattService)
        })?;
        let selected = select_services(services, service_uuid)?;

        let mut handles = Vec::new();
        for service in selected {
            let characteristics = service_characteristics(&service)
                .await
                .map_err(|e| Error::Transport(e.to_string()))?;
            for characteristic in characteristics {
                let properties = characteristic
                    .CharacteristicProperties()
                    .map_err(|e| Error::Transport(e.to_string()))?
                    .0;
                handles.push(GattCharacteristicHandle {
                    properties,
                    io: Arc::new(WinRtCharacteristic::new(characteristic)),
                });
            }
        }
        Ok(handles)
    }

    async fn open_socket(&self, endpoint: &ServiceEndpoint, timeout: Duration) -> Result<Channel> {
        socket::open(endpoint, timeout).await
    }
}

fn register_identity() -> anyhow::Result<()> {
    let identities = PeerFinder::AlternateIdentities()?;
    identities.Insert(&HSTRING::from("Bluetooth:Paired"), &HSTRING::new())?;
    Ok(())
}

async fn enumerate_serial() -> anyhow::Result<Vec<SerialDeviceInfo>> {
    let service_id = RfcommServiceId::SerialPort()?;
    let selector = RfcommDeviceService::GetDeviceSelector(&service_id)?;
    let peers = DeviceInformation::FindAllAsyncAqsFilter(&selector)?.await?;

    let mut devices = Vec::new();
    for i in 0..peers.Size()? {
        let peer = peers.GetAt(i)?;
        devices.push(SerialDeviceInfo {
            name: peer.Name()?.to_string(),
            id: peer.Id()?.to_string(),
        });
    }
    Ok(devices)
}

async fn enumerate_ble() -> anyhow::Result<Vec<BleDeviceInfo>> {
    let selector = BluetoothLEDevice::GetDeviceSelector()?;
    let peers = DeviceInformation::FindAllAsyncAqsFilter(&selector)?.await?;

    let mut devices = Vec::new();
    for i in 0..peers.Size()? {
        let peer = peers.GetAt(i)?;
        let id = peer.Id()?;
        let device = BluetoothLEDevice::FromIdAsync(&id)?.await?;

        let services = device_services(&device).await?;
        let mut service_uuids = Vec::with_capacity(services.len());
        for service in &services {
            service_uuids.push(gatt::format_guid(&service.Uuid()?));
        }

        devices.push(BleDeviceInfo {
            name: peer.Name()?.to_string(),
            id: id.to_string(),
            service_uuids,
        });
    }
    Ok(devices)
}

async fn resolve_serial(device_id: &str) -> anyhow::Result<ServiceEndpoint> {
    let service = RfcommDeviceService::FromIdAsync(&HSTRING::from(device_id))?.await?;
    Ok(ServiceEndpoint {
        host: service.ConnectionHostName()?.DisplayName()?.to_string(),
        service: service.ConnectionServiceName()?.to_string(),
    })
}

async fn device_services(device: &BluetoothLEDevice) -> anyhow::Result<Vec<GattDeviceService>> {
    let result = device.GetGattServicesAsync()?.await?;
    if result.Status()? != GattCommunicationStatus::Success {
        anyhow::bail!("GATT service query returned {:?}", result.Status()?);
    }

    let services = result.Services()?;
    let mut all = Vec::with_capacity(services.Size()? as usize);
    for i in 0..services.Size()? {
        all.push(services.GetAt(i)?);
    }
    Ok(all)
}

/// Scopes the service list to the descriptor's UUID, or to every
/// non-reserved service when the descriptor carries none.
fn select_services(
    services: Vec<GattDeviceService>,
    service_uuid: Option<&str>,
) -> Result<Vec<GattDeviceService>> {
    let selected: Vec<GattDeviceService> = match service_uuid {
        Some(uuid) => {
            let target =
                gatt::parse_uuid(uuid).map_err(|_| Error::Resolution(Resource::GattService))?;
            services
                .into_iter()
                .filter(|service| service.Uuid().map(|u| u == target).unwrap_or(false))
                .collect()
        }
        None => services
            .into_iter()
            .filter(|service| {
                service
                    .Uuid()
                    .map(|u| !is_reserved_service(&gatt::format_guid(&u)))
                    .unwrap_or(false)
            })
            .collect(),
    };

    if selected.is_empty() {
        return Err(Error::Resolution(Resource::GattService));
    }
    Ok(selected)
}

async fn service_characteristics(
    service: &GattDeviceService,
) -> anyhow::Result<Vec<GattCharacteristic>> {
    let result = service.GetCharacteristicsAsync()?.await?;
    if result.Status()? != GattCommunicationStatus::Success {
        anyhow::bail!("characteristic query returned {:?}", result.Status()?);
    }

    let characteristics = result.Characteristics()?;
    let mut all = Vec::with_capacity(characteristics.Size()? as usize);
    for i in 0..characteristics.Size()? {
        all.push(characteristics.GetAt(i)?);
    }
    Ok(all)
}
