//! Transport facade handed to the communication service.
//!
//! Coordinates discovery and the per-attempt connect sequence, and owns the
//! connection-state machine guarding the single connection slot. Opened
//! channels are handed to the [`ChannelSink`] collaborator, which drives
//! send/receive from then on.

use crate::domain::channel::{ChannelSink, EventSender};
use crate::domain::connection::{
    Connection, ConnectionState, ConnectionTarget, Connections, ServiceEndpoint,
};
use crate::domain::settings::TransportSettings;
use crate::error::{Error, Result};
use crate::infrastructure::bluetooth::stack::BluetoothStack;
use crate::infrastructure::bluetooth::{connect, discovery};
use tracing::{info, warn};

pub struct BluetoothTransport<S> {
    stack: S,
    sink: Box<dyn ChannelSink>,
    settings: TransportSettings,
    events: Option<EventSender>,
    state: ConnectionState,
    current: Option<Connection>,
}

impl<S: BluetoothStack> BluetoothTransport<S> {
    pub fn new(stack: S, sink: Box<dyn ChannelSink>, settings: TransportSettings) -> Self {
        Self {
            stack,
            sink,
            settings,
            events: None,
            state: ConnectionState::Unconnected,
            current: None,
        }
    }

    /// Wires transfer progress events from the stream adapters to the host
    /// application.
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// The service framework polls this transport for outbound data.
    pub fn polls_to_send(&self) -> bool {
        true
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The descriptor of the active connection, if any.
    pub fn current(&self) -> Option<&Connection> {
        self.current.as_ref()
    }

    /// Enumerates both transports into one ordered connection list. Any
    /// enumeration failure fails the whole scan.
    pub async fn connections(&self) -> Result<Connections> {
        match discovery::discover(&self.stack, &self.settings).await {
            Ok(connections) => {
                info!("Discovery produced {} connection(s)", connections.len());
                Ok(connections)
            }
            Err(e) => {
                warn!("Discovery failed: {}", e);
                Err(e)
            }
        }
    }

    /// Establishes `connection`, normalizing every failure to `false`.
    /// The error kind is logged; retry policy belongs to the caller.
    pub async fn connect(&mut self, connection: &Connection) -> bool {
        match self.try_connect(connection).await {
            Ok(()) => {
                info!("Connected to {}", connection.name);
                true
            }
            Err(e) => {
                warn!("Connect to {} failed: {}", connection.name, e);
                false
            }
        }
    }

    async fn try_connect(&mut self, connection: &Connection) -> Result<()> {
        if self.state == ConnectionState::Connecting {
            return Err(Error::Busy);
        }

        let prior = self.state;
        self.state = ConnectionState::Connecting;

        match self.establish(connection, prior).await {
            Ok(()) => {
                self.state = ConnectionState::Open;
                self.current = Some(connection.clone());
                Ok(())
            }
            Err(e) => {
                // A failed attempt leaves any previously open channel as it was.
                self.state = prior;
                Err(e)
            }
        }
    }

    /// Runs the per-attempt sequence. The BLE path registers the adapter
    /// pair and returns without touching a socket; the other paths produce
    /// an endpoint and open a socket unless one is already open.
    async fn establish(&mut self, connection: &Connection, prior: ConnectionState) -> Result<()> {
        let endpoint = match &connection.target {
            ConnectionTarget::BleDevice {
                device_id,
                service_uuid,
            } => {
                let channel = connect::open_characteristic_channel(
                    &self.stack,
                    device_id,
                    service_uuid.as_deref(),
                    self.events.clone(),
                )
                .await?;
                self.sink.attach(channel)?;
                return Ok(());
            }
            ConnectionTarget::DirectPeer { host } => ServiceEndpoint::direct(host.clone()),
            ConnectionTarget::ClassicDevice { device_id } => {
                connect::resolve_classic_endpoint(&self.stack, device_id).await?
            }
        };

        if prior == ConnectionState::Open {
            // Socket already open; only the current descriptor changes.
            info!("Already connected, keeping the open socket");
            return Ok(());
        }

        info!("Opening socket to {}", endpoint);
        let channel = self
            .stack
            .open_socket(&endpoint, self.settings.connect_timeout())
            .await?;
        self.sink.attach(channel)?;
        Ok(())
    }

    /// Drops the sink's channel and closes the connection slot.
    pub fn disconnect(&mut self) {
        self.sink.detach();
        self.current = None;
        if self.state != ConnectionState::Unconnected {
            self.state = ConnectionState::Closed;
        }
        info!("Disconnected");
    }
}
