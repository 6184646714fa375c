//! Unix domain socket server for IPC
//!
//! Provides request-response communication and pushes gesture and mode
//! events to subscribed clients.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::unix::OwnedReadHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::events::DaemonEvent;
use crate::gesture::{ControlCommand, SessionStatus};

use super::protocol::{DaemonStatus, Request, Response, MAX_MESSAGE_LEN};

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    shared: Arc<Shared>,
    shutdown_tx: broadcast::Sender<()>,
}

/// Handles into the gesture session, shared by all clients
struct Shared {
    start_time: Instant,
    status_rx: watch::Receiver<SessionStatus>,
    control_tx: mpsc::Sender<ControlCommand>,
    /// Never read; subscribers are created from it
    event_rx: broadcast::Receiver<DaemonEvent>,
}

/// A request as read off the wire, or the reason it could not be parsed
type IncomingRequest = std::result::Result<Request, String>;

impl Server {
    /// Create a new IPC server bound to `socket_path`
    pub fn new(
        socket_path: &Path,
        status_rx: watch::Receiver<SessionStatus>,
        control_tx: mpsc::Sender<ControlCommand>,
        event_rx: broadcast::Receiver<DaemonEvent>,
    ) -> Result<Self> {
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: Some(listener),
            shared: Arc::new(Shared {
                start_time: Instant::now(),
                status_rx,
                control_tx,
                event_rx,
            }),
            shutdown_tx,
        })
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref().context("server not initialized")?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let shared = Arc::clone(&self.shared);
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, shared) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection
    async fn handle_client(stream: UnixStream, shared: Arc<Shared>) -> Result<()> {
        let (reader, mut writer) = stream.into_split();

        // Reads run on their own task so that waiting for the next request
        // never cancels a partially read message.
        let (request_tx, mut request_rx) = mpsc::channel(8);
        let reader_task = tokio::spawn(Self::read_requests(reader, request_tx));

        let mut events: Option<broadcast::Receiver<DaemonEvent>> = None;

        loop {
            tokio::select! {
                incoming = request_rx.recv() => {
                    let Some(incoming) = incoming else {
                        break;
                    };

                    let response = match incoming {
                        Ok(request) => {
                            debug!(?request, "received request");
                            let (response, subscribe) = Self::process_request(request, &shared).await;
                            if subscribe && events.is_none() {
                                events = Some(shared.event_rx.resubscribe());
                                debug!("client subscribed to notifications");
                            }
                            response
                        }
                        Err(message) => Response::error("invalid_request", message),
                    };

                    Self::send_message(&mut writer, &response).await?;
                }
                event = Self::next_event(&mut events) => {
                    match event {
                        Ok(event) => Self::send_message(&mut writer, &event).await?,
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!(skipped = n, "subscriber lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            events = None;
                        }
                    }
                }
            }
        }

        reader_task.await.context("request reader panicked")?
    }

    /// Read length-prefixed requests until the client disconnects
    async fn read_requests(mut reader: OwnedReadHalf, request_tx: mpsc::Sender<IncomingRequest>) -> Result<()> {
        let mut len_buf = [0u8; 4];

        loop {
            match reader.read_exact(&mut len_buf).await {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    debug!("client disconnected");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }

            let len = u32::from_le_bytes(len_buf) as usize;
            if len > MAX_MESSAGE_LEN {
                warn!(len, "message too large, disconnecting");
                return Ok(());
            }

            let mut msg_buf = vec![0u8; len];
            reader.read_exact(&mut msg_buf).await?;

            let incoming = serde_json::from_slice::<Request>(&msg_buf).map_err(|e| {
                debug!(?e, "failed to parse request");
                e.to_string()
            });

            if request_tx.send(incoming).await.is_err() {
                return Ok(());
            }
        }
    }

    /// Wait for the next event if subscribed, otherwise forever
    async fn next_event(
        events: &mut Option<broadcast::Receiver<DaemonEvent>>,
    ) -> std::result::Result<DaemonEvent, broadcast::error::RecvError> {
        match events {
            Some(rx) => rx.recv().await,
            None => std::future::pending().await,
        }
    }

    /// Send a length-prefixed JSON message
    async fn send_message<W, T>(writer: &mut W, msg: &T) -> Result<()>
    where
        W: AsyncWrite + Unpin,
        T: serde::Serialize,
    {
        let msg_bytes = serde_json::to_vec(msg)?;
        let msg_len = (msg_bytes.len() as u32).to_le_bytes();

        writer.write_all(&msg_len).await?;
        writer.write_all(&msg_bytes).await?;

        Ok(())
    }

    /// Process a request and return a response
    /// Returns (Response, should_subscribe)
    async fn process_request(request: Request, shared: &Shared) -> (Response, bool) {
        match request {
            Request::Ping => (Response::Pong, false),

            Request::GetStatus => {
                let session = shared.status_rx.borrow().clone();
                let uptime_secs = shared.start_time.elapsed().as_secs();
                (Response::Status(DaemonStatus::new(uptime_secs, session)), false)
            }

            Request::SetMode { mode } => {
                if shared.control_tx.send(ControlCommand::SetMode(mode)).await.is_err() {
                    return (Response::error("session_closed", "gesture session is not running"), false);
                }
                info!(%mode, "mode change requested via IPC");
                (Response::ModeChange { mode }, false)
            }

            Request::Subscribe => (Response::Subscribed, true),
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}
