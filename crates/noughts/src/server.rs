//! `NoughtsServer` builder and server loop.
//!
//! This is the entry point for running a Noughts server. It ties together
//! all the layers: transport → protocol → room registry.

use std::sync::Arc;
use std::time::Duration;

use noughts_protocol::{Codec, JsonCodec};
use noughts_room::{RoomConfig, RoomRegistry};
use noughts_transport::{Pending, Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::NoughtsError;
use crate::handler::handle_connection;
use crate::hub::Hub;

/// Settings for a server instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: String,

    /// A connection that sends nothing for this long is dropped. Any
    /// inbound frame counts, including WebSocket pings and `Heartbeat`.
    pub idle_timeout: Duration,

    /// How long a freshly accepted socket gets to finish the WebSocket
    /// upgrade before it is dropped.
    pub handshake_timeout: Duration,

    /// Limits applied to every room.
    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:4000".to_string(),
            idle_timeout: Duration::from_secs(60),
            handshake_timeout: Duration::from_secs(10),
            room: RoomConfig::default(),
        }
    }
}

/// Shared server state passed to each connection handler task.
///
/// Lock order is always `rooms` then `hub`.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: Mutex<RoomRegistry>,
    pub(crate) hub: Mutex<Hub>,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Noughts server.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use noughts::prelude::*;
///
/// # async fn start() -> Result<(), NoughtsError> {
/// let server = NoughtsServer::builder()
///     .bind("0.0.0.0:4000")
///     .idle_timeout(Duration::from_secs(30))
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct NoughtsServerBuilder {
    config: ServerConfig,
    registry: Option<RoomRegistry>,
}

impl NoughtsServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            registry: None,
        }
    }

    /// Replaces every setting at once.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind = addr.to_string();
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.config.room = config;
        self
    }

    /// Uses a pre-built registry (custom code generator or clock).
    /// Its own config wins over [`room_config`](Self::room_config).
    pub fn registry(mut self, registry: RoomRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Binds the listener.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<NoughtsServer<JsonCodec>, NoughtsError> {
        let transport = WebSocketTransport::bind(&self.config.bind).await?;
        let registry = self
            .registry
            .unwrap_or_else(|| RoomRegistry::with_config(self.config.room.clone()));

        let state = Arc::new(ServerState {
            rooms: Mutex::new(registry),
            hub: Mutex::new(Hub::new()),
            codec: JsonCodec,
            idle_timeout: self.config.idle_timeout,
        });

        Ok(NoughtsServer {
            transport,
            state,
            handshake_timeout: self.config.handshake_timeout,
        })
    }
}

impl Default for NoughtsServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Noughts server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct NoughtsServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
    handshake_timeout: Duration,
}

impl NoughtsServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> NoughtsServerBuilder {
        NoughtsServerBuilder::new()
    }
}

impl<C: Codec> NoughtsServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a task for each accepted socket, which finishes the WebSocket
    /// handshake (bounded by the handshake timeout) and then runs the
    /// connection handler. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), NoughtsError> {
        let addr = self.local_addr()?;
        tracing::info!(%addr, "noughts server running");

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    let handshake_timeout = self.handshake_timeout;
                    tokio::spawn(async move {
                        let peer = pending.peer_addr();
                        let conn = match tokio::time::timeout(handshake_timeout, pending.upgrade())
                            .await
                        {
                            Ok(Ok(conn)) => conn,
                            Ok(Err(e)) => {
                                tracing::debug!(%peer, error = %e, "handshake failed");
                                return;
                            }
                            Err(_) => {
                                tracing::debug!(%peer, "handshake timed out");
                                return;
                            }
                        };
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
