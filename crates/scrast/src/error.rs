// ABOUTME: Error types for the scrast supervisor and control socket.
// ABOUTME: Fatal encoder failures and user-facing instance conditions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the encoder subprocess. All of them end the recording.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A second encoder was started while one is live.
    #[error("an encoder process is already running")]
    ProcessAlreadyRunning,

    /// The encoder binary is not installed.
    #[error("{binary} binary not found, is it installed and on PATH?")]
    EncoderNotFound { binary: String },

    /// Spawning failed for another reason.
    #[error("failed to start {binary}")]
    Spawn {
        binary: String,
        #[source]
        source: io::Error,
    },

    /// The encoder exited with an unexpected code and no signal.
    #[error(
        "abnormal termination of the encoder (exit code {code}), dumping error buffer:\n\n{output}"
    )]
    AbnormalTermination { code: i32, output: String },

    /// The encoder was reaped but its exit status could not be read.
    #[error("lost the exit status of the encoder, dumping error buffer:\n\n{output}")]
    ExitStatusLost { output: String },
}

/// Failures of the control socket.
#[derive(Debug, Error)]
pub enum ControlError {
    /// Another launcher answers on the control socket.
    #[error("there is already an instance running (control socket {})", path.display())]
    InstanceAlreadyActive { path: PathBuf },

    /// Nothing answers on the control socket.
    #[error("there is no instance running (control socket {})", path.display())]
    InstanceNotActive { path: PathBuf },

    #[error("control socket error: {0}")]
    Io(#[from] io::Error),
}
