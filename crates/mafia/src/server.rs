//! `MafiaServer` builder and accept loop.
//!
//! This ties the layers together: transport → protocol → coordinator.

use std::sync::Arc;
use std::time::Duration;

use mafia_protocol::{Codec, JsonCodec};
use mafia_transport::{Transport, WebSocketTransport};
use tokio::sync::mpsc;

use crate::coordinator::{self, Command};
use crate::handler::handle_connection;
use crate::{MafiaError, ServerConfig};

/// Shared state handed to each connection task.
///
/// Read-only: all room state lives in the coordinator task and is
/// reached through `commands`.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) commands: mpsc::Sender<Command>,
    pub(crate) codec: C,
    pub(crate) outbound_buffer: usize,
    pub(crate) idle_timeout: Option<Duration>,
}

/// Builder for configuring and starting a Mafia server.
///
/// # Example
///
/// ```rust,no_run
/// use mafia::prelude::*;
///
/// # async fn launch() -> Result<(), MafiaError> {
/// let server = MafiaServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MafiaServerBuilder {
    config: ServerConfig,
    bind_addr: Option<String>,
}

impl MafiaServerBuilder {
    /// Creates a builder with [`ServerConfig::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the address to bind to. Takes precedence over
    /// [`ServerConfig::bind_addr`].
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = Some(addr.to_string());
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and starts the coordinator task.
    ///
    /// Must be called from inside a Tokio runtime.
    pub async fn build(self) -> Result<MafiaServer<JsonCodec>, MafiaError> {
        let mut config = self.config;
        if let Some(addr) = self.bind_addr {
            config.bind_addr = addr;
        }
        config.validate()?;

        let transport = WebSocketTransport::bind(&config.bind_addr).await?;
        let commands = coordinator::spawn(config.coordinator.clone(), config.command_buffer);

        let state = Arc::new(ServerState {
            commands,
            codec: JsonCodec,
            outbound_buffer: config.outbound_buffer,
            idle_timeout: config.idle_timeout,
        });

        Ok(MafiaServer { transport, state })
    }
}

/// A bound Mafia server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct MafiaServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl MafiaServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> MafiaServerBuilder {
        MafiaServerBuilder::new()
    }
}

impl<C: Codec> MafiaServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop.
    ///
    /// Spawns a handler task per connection. A failed accept is logged and
    /// the loop carries on after a short pause (see [`accept_backoff`]);
    /// this only returns if the process is stopped.
    pub async fn run(mut self) -> Result<(), MafiaError> {
        tracing::info!(addr = ?self.local_addr().ok(), "Mafia server running");

        let mut failures: u32 = 0;
        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    failures = 0;
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    let delay = accept_backoff(failures);
                    tracing::error!(error = %e, failures, delay_ms = delay.as_millis() as u64, "accept failed");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

const ACCEPT_BACKOFF_INITIAL: Duration = Duration::from_millis(10);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Pause after the `failures`-th accept error in a row: 10ms, doubling
/// each time, capped at one second. Persistent errors such as fd
/// exhaustion would otherwise spin the loop.
fn accept_backoff(failures: u32) -> Duration {
    let exponent = failures.saturating_sub(1).min(16);
    ACCEPT_BACKOFF_INITIAL
        .saturating_mul(2u32.saturating_pow(exponent))
        .min(ACCEPT_BACKOFF_MAX)
}
