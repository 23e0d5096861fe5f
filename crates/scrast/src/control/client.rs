// ABOUTME: Client side of the control socket, used by `scrast stop|pause|resume|info`.
// ABOUTME: Makes exactly one attempt and reports a missing instance distinctly.

use crate::error::ControlError;
use scrast_core::ControlMessage;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

pub struct ControlClient {
    path: PathBuf,
    timeout: Duration,
}

impl ControlClient {
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether anything accepts connections on the socket path.
    pub async fn is_active(&self) -> bool {
        matches!(
            tokio::time::timeout(self.timeout, UnixStream::connect(&self.path)).await,
            Ok(Ok(_))
        )
    }

    /// Send one command. Commands that carry a reply (`info`, `ping`) return the
    /// text the server wrote before closing; the rest return `None`.
    pub async fn send(&self, message: ControlMessage) -> Result<Option<String>, ControlError> {
        let connect = tokio::time::timeout(self.timeout, UnixStream::connect(&self.path)).await;
        let mut stream = match connect {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                tracing::debug!(
                    path = %self.path.display(),
                    error = %e,
                    "Control socket unreachable"
                );
                return Err(self.not_active());
            }
            Err(_) => return Err(self.not_active()),
        };

        match tokio::time::timeout(self.timeout, exchange(&mut stream, message)).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                tracing::debug!(command = %message, "No reply from control socket");
                Err(self.not_active())
            }
        }
    }

    fn not_active(&self) -> ControlError {
        ControlError::InstanceNotActive {
            path: self.path.clone(),
        }
    }
}

async fn exchange(
    stream: &mut UnixStream,
    message: ControlMessage,
) -> std::io::Result<Option<String>> {
    if message.expects_reply() {
        // write-then-read: the server answers once it sees end of input
        stream.write_all(message.as_str().as_bytes()).await?;
        stream.shutdown().await?;
        let mut reply = String::new();
        stream.read_to_string(&mut reply).await?;
        return Ok(Some(reply));
    }

    stream.writable().await?;
    stream.write_all(message.as_str().as_bytes()).await?;
    stream.shutdown().await?;
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{ControlCommand, ControlServer};
    use tokio::sync::mpsc;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_no_server_is_not_active() {
        let dir = tempfile::tempdir().unwrap();
        let client = ControlClient::new(dir.path().join("scrast.sock"), TIMEOUT);

        assert!(!client.is_active().await);
        let err = client.send(ControlMessage::Stop).await.unwrap_err();
        assert!(matches!(err, ControlError::InstanceNotActive { .. }));
    }

    #[tokio::test]
    async fn test_stale_socket_is_not_active() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scrast.sock");
        drop(std::os::unix::net::UnixListener::bind(&path).unwrap());

        let client = ControlClient::new(&path, TIMEOUT);
        let err = client.send(ControlMessage::Info).await.unwrap_err();
        assert!(matches!(err, ControlError::InstanceNotActive { .. }));
    }

    #[tokio::test]
    async fn test_silent_server_times_out_as_not_active() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scrast.sock");
        // Accepts connections but never answers.
        let _listener = tokio::net::UnixListener::bind(&path).unwrap();

        let client = ControlClient::new(&path, Duration::from_millis(200));
        let err = client.send(ControlMessage::Info).await.unwrap_err();
        assert!(matches!(err, ControlError::InstanceNotActive { .. }));
    }

    #[tokio::test]
    async fn test_fire_and_forget_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scrast.sock");
        let (tx, mut rx) = mpsc::channel(16);
        let handle = ControlServer::bind(&path, TIMEOUT).await.unwrap().spawn(tx);

        let client = ControlClient::new(&path, TIMEOUT);
        assert!(client.is_active().await);
        assert_eq!(client.send(ControlMessage::Pause).await.unwrap(), None);
        assert!(matches!(rx.recv().await, Some(ControlCommand::Pause)));

        handle.shutdown().await;
        assert!(!client.is_active().await);
    }

    #[tokio::test]
    async fn test_ping_reply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scrast.sock");
        let (tx, _rx) = mpsc::channel(16);
        let handle = ControlServer::bind(&path, TIMEOUT).await.unwrap().spawn(tx);

        let reply = ControlClient::new(&path, TIMEOUT)
            .send(ControlMessage::Ping)
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some("pong\n"));

        handle.shutdown().await;
    }
}
