// ABOUTME: Spawns the encoder subprocess and forwards its lifecycle as events.
// ABOUTME: One task drains stderr into Output events, then reports the exit.

use super::{EncoderEvent, ExitReport};
use crate::error::SupervisorError;
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::mpsc;

const READ_CHUNK: usize = 4096;

/// Start `binary` with `args` verbatim. Sends `Spawned` before returning, then
/// `Output` for every stderr chunk and a final `Exited` once stderr is drained
/// and the process has been reaped.
pub(crate) fn spawn_encoder(
    binary: &str,
    args: &[String],
    events: mpsc::UnboundedSender<EncoderEvent>,
) -> Result<u32, SupervisorError> {
    let mut child = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| match source.kind() {
            ErrorKind::NotFound => SupervisorError::EncoderNotFound {
                binary: binary.to_string(),
            },
            _ => SupervisorError::Spawn {
                binary: binary.to_string(),
                source,
            },
        })?;

    let pid = child.id().ok_or_else(|| SupervisorError::Spawn {
        binary: binary.to_string(),
        source: std::io::Error::other("process exited before reporting a pid"),
    })?;
    tracing::info!(binary = %binary, pid, "Spawned encoder");

    let _ = events.send(EncoderEvent::Spawned { pid });

    let stderr = child.stderr.take();
    tokio::spawn(async move {
        if let Some(mut stderr) = stderr {
            let mut buf = vec![0u8; READ_CHUNK];
            loop {
                match stderr.read(&mut buf).await {
                    Ok(0) => break,
                    Ok(n) => {
                        let chunk = String::from_utf8_lossy(&buf[..n]).into_owned();
                        let _ = events.send(EncoderEvent::Output(chunk));
                    }
                    Err(e) => {
                        tracing::warn!(pid, error = %e, "Failed to read encoder output");
                        break;
                    }
                }
            }
        }

        let report = match child.wait().await {
            Ok(status) => ExitReport::from(status),
            Err(e) => {
                tracing::error!(pid, error = %e, "Failed to wait for encoder");
                ExitReport {
                    code: None,
                    signal: None,
                }
            }
        };
        let _ = events.send(EncoderEvent::Exited(report));
    });

    Ok(pid)
}
