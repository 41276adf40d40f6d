//! Hand-rolled test doubles for the platform stack and the channel sink.

use crate::domain::channel::{CancelFlag, Channel, ChannelReader, ChannelSink, ChannelWriter};
use crate::domain::connection::ServiceEndpoint;
use crate::error::{Error, Resource, Result};
use crate::infrastructure::bluetooth::stack::{
    BleDeviceInfo, BluetoothStack, GattCharacteristicHandle, SerialDeviceInfo,
};
use crate::infrastructure::bluetooth::streams::CharacteristicIo;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Characteristic whose reads are always empty and writes always succeed.
struct NullCharacteristic;

#[async_trait]
impl CharacteristicIo for NullCharacteristic {
    async fn read_value(&self) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    async fn write_value(&self, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

struct NullReader;

#[async_trait]
impl ChannelReader for NullReader {
    async fn read(
        &mut self,
        _buf: &mut Vec<u8>,
        _count: usize,
        _cancel: &CancelFlag,
    ) -> Result<usize> {
        Ok(0)
    }
}

struct NullWriter;

#[async_trait]
impl ChannelWriter for NullWriter {
    async fn write(&mut self, data: &[u8]) -> Result<usize> {
        Ok(data.len())
    }

    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

fn null_channel() -> Channel {
    Channel::new(Box::new(NullReader), Box::new(NullWriter))
}

/// Scriptable [`BluetoothStack`] recording every capability call.
#[derive(Default)]
pub(crate) struct FakeStack {
    serial: Vec<SerialDeviceInfo>,
    ble: Vec<BleDeviceInfo>,
    endpoints: HashMap<String, ServiceEndpoint>,
    characteristics: HashMap<String, Vec<u32>>,
    serial_fail: bool,
    ble_fail: bool,
    socket_fail: bool,
    socket_hang: bool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_serial_device(mut self, name: &str, id: &str) -> Self {
        self.serial.push(SerialDeviceInfo {
            name: name.to_string(),
            id: id.to_string(),
        });
        self
    }

    pub fn with_ble_device(mut self, name: &str, id: &str, service_uuids: Vec<&str>) -> Self {
        self.ble.push(BleDeviceInfo {
            name: name.to_string(),
            id: id.to_string(),
            service_uuids: service_uuids.into_iter().map(str::to_string).collect(),
        });
        self
    }

    pub fn with_endpoint(mut self, device_id: &str, host: &str, service: &str) -> Self {
        self.endpoints.insert(
            device_id.to_string(),
            ServiceEndpoint {
                host: host.to_string(),
                service: service.to_string(),
            },
        );
        self
    }

    pub fn with_characteristics(mut self, device_id: &str, properties: Vec<u32>) -> Self {
        self.characteristics
            .insert(device_id.to_string(), properties);
        self
    }

    pub fn with_serial_failure(mut self) -> Self {
        self.serial_fail = true;
        self
    }

    pub fn with_ble_failure(mut self) -> Self {
        self.ble_fail = true;
        self
    }

    pub fn with_socket_failure(mut self) -> Self {
        self.socket_fail = true;
        self
    }

    pub fn with_socket_hang(mut self) -> Self {
        self.socket_hang = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Shared handle to the call log, for tests that move the stack.
    pub fn call_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BluetoothStack for FakeStack {
    fn register_paired_identity(&self) -> Result<()> {
        self.record("register_paired_identity".to_string());
        Ok(())
    }

    async fn serial_port_devices(&self) -> Result<Vec<SerialDeviceInfo>> {
        self.record("serial_port_devices".to_string());
        if self.serial_fail {
            return Err(Error::Enumeration("serial enumeration failed".to_string()));
        }
        Ok(self.serial.clone())
    }

    async fn ble_devices(&self) -> Result<Vec<BleDeviceInfo>> {
        self.record("ble_devices".to_string());
        if self.ble_fail {
            return Err(Error::Enumeration("BLE enumeration failed".to_string()));
        }
        Ok(self.ble.clone())
    }

    async fn resolve_serial_endpoint(&self, device_id: &str) -> Result<ServiceEndpoint> {
        self.record(format!("resolve_serial:{device_id}"));
        self.endpoints
            .get(device_id)
            .cloned()
            .ok_or(Error::Resolution(Resource::SerialService))
    }

    async fn ble_characteristics(
        &self,
        device_id: &str,
        _service_uuid: Option<&str>,
    ) -> Result<Vec<GattCharacteristicHandle>> {
        self.record(format!("ble_characteristics:{device_id}"));
        let properties = self
            .characteristics
            .get(device_id)
            .ok_or(Error::Resolution(Resource::BleDevice))?;
        Ok(properties
            .iter()
            .map(|&properties| GattCharacteristicHandle {
                properties,
                io: Arc::new(NullCharacteristic),
            })
            .collect())
    }

    async fn open_socket(&self, endpoint: &ServiceEndpoint, timeout: Duration) -> Result<Channel> {
        self.record(format!("open_socket:{endpoint}"));
        if self.socket_hang {
            return std::future::pending().await;
        }
        if self.socket_fail {
            return Err(Error::Timeout(timeout));
        }
        Ok(null_channel())
    }
}

/// Counters observable after the sink has been moved into the transport.
#[derive(Debug, Default, Clone)]
pub(crate) struct SinkProbe {
    attached: Arc<Mutex<usize>>,
    detached: Arc<Mutex<usize>>,
}

impl SinkProbe {
    pub fn attached(&self) -> usize {
        *self.attached.lock().unwrap()
    }

    pub fn detached(&self) -> usize {
        *self.detached.lock().unwrap()
    }
}

/// Sink that counts attach/detach calls, optionally refusing channels.
pub(crate) struct RecordingSink {
    probe: SinkProbe,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> (Box<dyn ChannelSink>, SinkProbe) {
        let probe = SinkProbe::default();
        (
            Box::new(Self {
                probe: probe.clone(),
                fail: false,
            }),
            probe,
        )
    }

    pub fn failing() -> (Box<dyn ChannelSink>, SinkProbe) {
        let probe = SinkProbe::default();
        (
            Box::new(Self {
                probe: probe.clone(),
                fail: true,
            }),
            probe,
        )
    }
}

impl ChannelSink for RecordingSink {
    fn attach(&mut self, _channel: Channel) -> Result<()> {
        if self.fail {
            return Err(Error::Transport("sink refused the channel".to_string()));
        }
        *self.probe.attached.lock().unwrap() += 1;
        Ok(())
    }

    fn detach(&mut self) {
        *self.probe.detached.lock().unwrap() += 1;
    }
}
