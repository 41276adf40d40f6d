//! GATT characteristic value access over WinRT.

use crate::error::{Error, Result};
use crate::infrastructure::bluetooth::streams::CharacteristicIo;
use async_trait::async_trait;
use windows::core::GUID;
use windows::Devices::Bluetooth::GenericAttributeProfile::{
    GattCharacteristic, GattCommunicationStatus,
};
use windows::Storage::Streams::{DataReader, DataWriter};

/// Live characteristic handle driven by the stream adapters.
pub struct WinRtCharacteristic {
    inner: GattCharacteristic,
}

impl WinRtCharacteristic {
    pub fn new(inner: GattCharacteristic) -> Self {
        Self { inner }
    }

    async fn read_inner(&self) -> anyhow::Result<Vec<u8>> {
        let result = self.inner.ReadValueAsync()?.await?;
        if result.Status()? != GattCommunicationStatus::Success {
            anyhow::bail!("characteristic read returned {:?}", result.Status()?);
        }

        let buffer = result.Value()?;
        let reader = DataReader::FromBuffer(&buffer)?;
        let length = reader.UnconsumedBufferLength()? as usize;
        let mut bytes = vec![0u8; length];
        if length > 0 {
            reader.ReadBytes(&mut bytes)?;
        }
        Ok(bytes)
    }

    async fn write_inner(&self, data: &[u8]) -> anyhow::Result<()> {
        let writer = DataWriter::new()?;
        writer.WriteBytes(data)?;
        let buffer = writer.DetachBuffer()?;

        let status = self.inner.WriteValueAsync(&buffer)?.await?;
        if status != GattCommunicationStatus::Success {
            anyhow::bail!("characteristic write returned {:?}", status);
        }
        Ok(())
    }
}

#[async_trait]
impl CharacteristicIo for WinRtCharacteristic {
    async fn read_value(&self) -> Result<Vec<u8>> {
        self.read_inner()
            .await
            .map_err(|e| Error::Transport(e.to_string()))
    }

    async fn write_value(&self, data: &[u8]) -> Result<()> {
        self.write_inner(data)
            .await
            .map_err(|e| Error::Transport(e.to_string()))
    }
}

/// Parses a UUID string into a Windows GUID.
pub fn parse_uuid(uuid_str: &str) -> anyhow::Result<GUID> {
    let uuid_str = uuid_str.replace('-', "");

    if uuid_str.len() != 32 {
        return Err(anyhow::anyhow!("Invalid UUID format"));
    }

    let d1 = u32::from_str_radix(&uuid_str[0..8], 16)?;
    let d2 = u16::from_str_radix(&uuid_str[8..12], 16)?;
    let d3 = u16::from_str_radix(&uuid_str[12..16], 16)?;

    let mut d4 = [0u8; 8];
    for i in 0..8 {
        d4[i] = u8::from_str_radix(&uuid_str[16 + i * 2..18 + i * 2], 16)?;
    }

    Ok(GUID {
        data1: d1,
        data2: d2,
        data3: d3,
        data4: d4,
    })
}

/// Canonical lowercase form of a GUID, matching the strings carried by
/// descriptors and settings.
pub fn format_guid(guid: &GUID) -> String {
    format!(
        "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        guid.data1,
        guid.data2,
        guid.data3,
        guid.data4[0],
        guid.data4[1],
        guid.data4[2],
        guid.data4[3],
        guid.data4[4],
        guid.data4[5],
        guid.data4[6],
        guid.data4[7]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uuid() {
        let guid = parse_uuid("6e400001-b5a3-f393-e0a9-e50e24dcca9e").unwrap();
        assert_eq!(guid.data1, 0x6e400001);
        assert_eq!(guid.data2, 0xb5a3);
    }

    #[test]
    fn test_uuid_round_trip() {
        let canonical = "6e400001-b5a3-f393-e0a9-e50e24dcca9e";
        let guid = parse_uuid(canonical).unwrap();
        assert_eq!(format_guid(&guid), canonical);
    }

    #[test]
    fn test_parse_uuid_rejects_short_input() {
        assert!(parse_uuid("6e400001").is_err());
    }
}
