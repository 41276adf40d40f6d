//! Characteristic stream adapters.
//!
//! BLE exchanges application data through GATT characteristic values, not a
//! stream socket. These adapters wrap one read/notify-capable and one
//! write-capable characteristic behind the byte-channel contract so the
//! service framework drives BLE exactly like a socket.

use crate::domain::channel::{
    CancelFlag, ChannelEvent, ChannelReader, ChannelWriter, EventSender,
};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// GATT characteristic property bits (Bluetooth Core spec, Vol 3 Part G).
pub mod props {
    pub const BROADCAST: u32 = 0x0001;
    pub const READ: u32 = 0x0002;
    pub const WRITE_WITHOUT_RESPONSE: u32 = 0x0004;
    pub const WRITE: u32 = 0x0008;
    pub const NOTIFY: u32 = 0x0010;
    pub const INDICATE: u32 = 0x0020;
}

/// Write or WriteWithoutResponse: usable as the outbound half.
pub fn is_write_capable(properties: u32) -> bool {
    properties & (props::WRITE | props::WRITE_WITHOUT_RESPONSE) != 0
}

/// Read or Notify: usable as the inbound half.
pub fn is_read_capable(properties: u32) -> bool {
    properties & (props::READ | props::NOTIFY) != 0
}

/// Raw value reads and writes on a single characteristic.
///
/// Takes `&self` so one characteristic can serve as both halves when it
/// carries read and write properties at once.
#[async_trait]
pub trait CharacteristicIo: Send + Sync {
    async fn read_value(&self) -> Result<Vec<u8>>;
    async fn write_value(&self, data: &[u8]) -> Result<()>;
}

/// Read adapter over one read/notify-capable characteristic.
///
/// No owned buffering; each call re-reads the characteristic until a short
/// chunk signals that no more data is available right now.
pub struct CharacteristicInputStream {
    characteristic: Arc<dyn CharacteristicIo>,
    events: Option<EventSender>,
}

impl CharacteristicInputStream {
    pub fn new(characteristic: Arc<dyn CharacteristicIo>) -> Self {
        Self {
            characteristic,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    fn report(&self, pct: u32) {
        if let Some(events) = &self.events {
            let _ = events.send(ChannelEvent::ReadProgress(pct));
        }
    }
}

#[async_trait]
impl ChannelReader for CharacteristicInputStream {
    /// Keeps issuing characteristic reads while full-sized chunks arrive.
    /// A short chunk means end-of-available-data, not end-of-stream, so the
    /// returned count may fall short of `count`.
    async fn read(
        &mut self,
        buf: &mut Vec<u8>,
        count: usize,
        cancel: &CancelFlag,
    ) -> Result<usize> {
        let mut received = 0usize;
        let mut expecting = count > 0;

        while expecting {
            let chunk = self.characteristic.read_value().await?;
            if !chunk.is_empty() {
                buf.extend_from_slice(&chunk);
                received += chunk.len();
            }
            expecting = chunk.len() >= count && !cancel.is_cancelled();
            self.report(progress_pct(received, count));
        }

        Ok(received)
    }
}

/// Write adapter over one write-capable characteristic.
pub struct CharacteristicOutputStream {
    characteristic: Arc<dyn CharacteristicIo>,
    events: Option<EventSender>,
}

impl CharacteristicOutputStream {
    pub fn new(characteristic: Arc<dyn CharacteristicIo>) -> Self {
        Self {
            characteristic,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    fn report(&self, pct: u32) {
        if let Some(events) = &self.events {
            let _ = events.send(ChannelEvent::WriteProgress(pct));
        }
    }
}

#[async_trait]
impl ChannelWriter for CharacteristicOutputStream {
    /// Single-shot: the whole buffer goes out as one characteristic write.
    async fn write(&mut self, data: &[u8]) -> Result<usize> {
        if data.is_empty() {
            return Err(Error::InvalidArgument("write buffer is empty"));
        }

        self.characteristic.write_value(data).await?;
        self.report(100);
        Ok(data.len())
    }

    /// Characteristic writes are not buffered client-side.
    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Percent of the requested count received, saturating at 100.
fn progress_pct(received: usize, count: usize) -> u32 {
    if count == 0 {
        return 100;
    }
    (received.saturating_mul(100) / count).min(100) as u32
}
