//! Stream-socket channel for the Classic and direct-peer paths.

use crate::domain::channel::{CancelFlag, Channel, ChannelReader, ChannelWriter};
use crate::domain::connection::ServiceEndpoint;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use windows::core::{Interface, HSTRING};
use windows::Foundation::IAsyncInfo;
use windows::Networking::HostName;
use windows::Networking::Sockets::StreamSocket;
use windows::Storage::Streams::{DataReader, DataWriter, InputStreamOptions};

use super::transport_err;

/// Opens a fresh socket to `endpoint`, cancelling the attempt once
/// `timeout` elapses.
pub(crate) async fn open(endpoint: &ServiceEndpoint, timeout: Duration) -> Result<Channel> {
    let socket = StreamSocket::new().map_err(transport_err)?;
    let host =
        HostName::CreateHostName(&HSTRING::from(endpoint.host.as_str())).map_err(transport_err)?;
    let connect = socket
        .ConnectAsync(&host, &HSTRING::from(endpoint.service.as_str()))
        .map_err(transport_err)?;
    let info: IAsyncInfo = connect.cast().map_err(transport_err)?;

    match tokio::time::timeout(timeout, connect).await {
        Ok(result) => result.map_err(transport_err)?,
        Err(_) => {
            debug!("Socket connect to {} timed out, cancelling", endpoint);
            let _ = info.Cancel();
            return Err(Error::Timeout(timeout));
        }
    }

    let reader = SocketInputStream::new(&socket).map_err(transport_err)?;
    let writer = SocketOutputStream::new(socket).map_err(transport_err)?;
    Ok(Channel::new(Box::new(reader), Box::new(writer)))
}

/// Read half of an open socket.
struct SocketInputStream {
    reader: DataReader,
    // Keeps the socket alive for as long as this half exists
    _socket: StreamSocket,
}

impl SocketInputStream {
    fn new(socket: &StreamSocket) -> windows::core::Result<Self> {
        let reader = DataReader::CreateDataReader(&socket.InputStream()?)?;
        reader.SetInputStreamOptions(InputStreamOptions::Partial)?;
        Ok(Self {
            reader,
            _socket: socket.clone(),
        })
    }
}

#[async_trait]
impl ChannelReader for SocketInputStream {
    async fn read(
        &mut self,
        buf: &mut Vec<u8>,
        count: usize,
        cancel: &CancelFlag,
    ) -> Result<usize> {
        if count == 0 || cancel.is_cancelled() {
            return Ok(0);
        }

        let loaded = self
            .reader
            .LoadAsync(count as u32)
            .map_err(transport_err)?
            .await
            .map_err(transport_err)? as usize;
        if loaded == 0 {
            return Ok(0);
        }

        let mut chunk = vec![0u8; loaded];
        self.reader.ReadBytes(&mut chunk).map_err(transport_err)?;
        buf.extend_from_slice(&chunk);
        Ok(loaded)
    }
}

/// Write half of an open socket.
struct SocketOutputStream {
    writer: DataWriter,
    _socket: StreamSocket,
}

impl SocketOutputStream {
    fn new(socket: StreamSocket) -> windows::core::Result<Self> {
        let writer = DataWriter::CreateDataWriter(&socket.OutputStream()?)?;
        Ok(Self {
            writer,
            _socket: socket,
        })
    }
}

#[async_trait]
impl ChannelWriter for SocketOutputStream {
    async fn write(&mut self, data: &[u8]) -> Result<usize> {
        if data.is_empty() {
            return Err(Error::InvalidArgument("write buffer is empty"));
        }

        self.writer.WriteBytes(data).map_err(transport_err)?;
        let written = self
            .writer
            .StoreAsync()
            .map_err(transport_err)?
            .await
            .map_err(transport_err)? as usize;
        Ok(written)
    }

    async fn flush(&mut self) -> Result<()> {
        self.writer
            .FlushAsync()
            .map_err(transport_err)?
            .await
            .map_err(transport_err)?;
        Ok(())
    }
}
