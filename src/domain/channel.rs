//! Byte-channel contract shared with the communication service.
//!
//! A [`Channel`] is an established bidirectional link, backed by either a
//! stream socket or a GATT characteristic pair. The service framework
//! receives it through [`ChannelSink::attach`] and owns it for the
//! connection's lifetime.

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Transfer notifications emitted by the stream adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Coarse read progress: percent of the requested byte count received,
    /// saturating at 100.
    ReadProgress(u32),
    /// Write progress; a completed single-shot write reports 100.
    WriteProgress(u32),
}

pub type EventSender = mpsc::UnboundedSender<ChannelEvent>;

/// Cooperative cancellation, observed between characteristic reads.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Read half of an established channel.
#[async_trait]
pub trait ChannelReader: Send {
    /// Reads up to `count` bytes, appending them to `buf`. Returns the
    /// number of bytes appended. A short result means no more data was
    /// available, not that the channel is closed.
    async fn read(&mut self, buf: &mut Vec<u8>, count: usize, cancel: &CancelFlag)
        -> Result<usize>;
}

/// Write half of an established channel.
#[async_trait]
pub trait ChannelWriter: Send {
    /// Writes the whole buffer, returning the byte count written.
    async fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Flushes buffered output, if the transport buffers any.
    async fn flush(&mut self) -> Result<()>;
}

/// An established bidirectional channel.
pub struct Channel {
    pub reader: Box<dyn ChannelReader>,
    pub writer: Box<dyn ChannelWriter>,
}

impl Channel {
    pub fn new(reader: Box<dyn ChannelReader>, writer: Box<dyn ChannelWriter>) -> Self {
        Self { reader, writer }
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel").finish_non_exhaustive()
    }
}

/// The external collaborator that accepts an opened channel and drives
/// send/receive from then on.
pub trait ChannelSink: Send {
    /// Takes ownership of the channel. Called once per successful connect;
    /// a repeated call replaces the previous channel.
    fn attach(&mut self, channel: Channel) -> Result<()>;

    /// Drops the active channel, if any.
    fn detach(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_flag_is_shared_across_clones() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_cancelled());
        flag.cancel();
        assert!(clone.is_cancelled());
    }
}
