// ABOUTME: Unix socket server for controlling the running recorder.
// ABOUTME: Enforces a single live instance and relays one command per connection.

use crate::error::ControlError;
use scrast_core::ControlMessage;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Longest command text the server will read from one connection.
const MAX_COMMAND_BYTES: u64 = 1024;

/// Commands for the recorder loop, from the socket handler or local signals
#[derive(Debug)]
pub enum ControlCommand {
    Stop,
    Pause,
    Resume,
    Info { reply: oneshot::Sender<String> },
}

/// What occupies the well-known socket path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    /// Nothing on the filesystem.
    Absent,
    /// Something accepts connections there.
    Live,
    /// An entry exists but nobody listens; left by an unclean exit.
    Stale,
}

pub async fn probe(path: &Path) -> SocketState {
    if std::fs::symlink_metadata(path).is_err() {
        return SocketState::Absent;
    }
    match UnixStream::connect(path).await {
        Ok(_) => SocketState::Live,
        Err(_) => SocketState::Stale,
    }
}

/// Bound control socket. The socket file is removed when the server is dropped.
#[derive(Debug)]
pub struct ControlServer {
    listener: UnixListener,
    path: PathBuf,
    timeout: Duration,
}

impl ControlServer {
    /// Probe `path` and bind it. A live instance is left untouched; a stale entry
    /// is removed first. Two launches racing here can both pass the probe.
    pub async fn bind(path: &Path, timeout: Duration) -> Result<Self, ControlError> {
        match probe(path).await {
            SocketState::Absent => {}
            SocketState::Live => {
                return Err(ControlError::InstanceAlreadyActive {
                    path: path.to_path_buf(),
                });
            }
            SocketState::Stale => {
                tracing::info!(path = %path.display(), "Removing stale control socket");
                match std::fs::remove_file(path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }

        let listener = UnixListener::bind(path)?;
        tracing::info!(path = %path.display(), "Control socket listening");

        Ok(Self {
            listener,
            path: path.to_path_buf(),
            timeout,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run the server on its own task until the returned handle is shut down.
    pub fn spawn(self, cmd_tx: mpsc::Sender<ControlCommand>) -> ServerHandle {
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(self.run(cmd_tx, shutdown.clone()));
        ServerHandle { shutdown, task }
    }

    /// Accept connections until `shutdown` fires. Connections are served one at a
    /// time so commands reach the recorder in arrival order.
    pub async fn run(self, cmd_tx: mpsc::Sender<ControlCommand>, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = self.listener.accept() => {
                    let stream = match accepted {
                        Ok((stream, _)) => stream,
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to accept control connection");
                            continue;
                        }
                    };
                    let handled =
                        tokio::time::timeout(self.timeout, handle_connection(stream, &cmd_tx));
                    match handled.await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => tracing::warn!(error = %e, "Control connection error"),
                        Err(_) => tracing::warn!("Control connection timed out"),
                    }
                }
            }
        }
        tracing::debug!(path = %self.path.display(), "Control socket closed");
    }
}

impl Drop for ControlServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// A running control server.
#[derive(Debug)]
pub struct ServerHandle {
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Stop accepting connections and wait until the socket file is gone.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Control server task failed");
        }
    }
}

async fn handle_connection(
    mut stream: UnixStream,
    cmd_tx: &mpsc::Sender<ControlCommand>,
) -> std::io::Result<()> {
    let mut raw = Vec::new();
    (&mut stream)
        .take(MAX_COMMAND_BYTES)
        .read_to_end(&mut raw)
        .await?;
    let text = String::from_utf8_lossy(&raw);

    let Some(message) = ControlMessage::parse(&text) else {
        tracing::debug!(command = %text.trim(), "Ignoring unknown control command");
        return stream.shutdown().await;
    };
    tracing::debug!(command = %message, "Control command received");

    let command = match message {
        ControlMessage::Stop => Some(ControlCommand::Stop),
        ControlMessage::Pause => Some(ControlCommand::Pause),
        ControlMessage::Resume => Some(ControlCommand::Resume),
        ControlMessage::Info => {
            let (reply, rx) = oneshot::channel();
            if cmd_tx.send(ControlCommand::Info { reply }).await.is_err() {
                tracing::warn!("Recorder unavailable for info query");
            } else if let Ok(info) = rx.await {
                stream.write_all(info.as_bytes()).await?;
            }
            None
        }
        ControlMessage::Ping | ControlMessage::PingPong | ControlMessage::PingPongRing => {
            if let Some(reply) = message.echo_reply() {
                stream.write_all(reply.as_bytes()).await?;
            }
            None
        }
    };

    if let Some(command) = command {
        if cmd_tx.send(command).await.is_err() {
            tracing::warn!(command = %message, "Recorder unavailable, command dropped");
        }
    }

    stream.shutdown().await
}
