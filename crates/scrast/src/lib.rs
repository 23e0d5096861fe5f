// ABOUTME: scrast library: encoder supervisor, control socket and recorder loop.
// ABOUTME: Entry points for recording and for controlling a running recording.

pub mod control;
pub mod error;
pub mod recorder;
pub mod recording;
pub mod status;
pub mod supervisor;

pub use control::{ControlClient, ControlCommand, ControlServer};
pub use error::{ControlError, SupervisorError};
pub use recorder::{Recorder, RecorderOptions};
pub use recording::RecordingOptions;
pub use scrast_core::{Config, ControlMessage, Session, SessionStore, Status};
pub use supervisor::{EncoderEvent, ExitKind, Supervisor};

use anyhow::Result;
use status::StatusLine;

/// Run a recording until the encoder exits, drawing the status line meanwhile
pub async fn run_recorder(config: Config, options: RecorderOptions) -> Result<ExitKind> {
    let store = SessionStore::new();
    let status_line = StatusLine::attach(&store);

    let result = Recorder::new(store, config).run(options).await;
    status_line.finish();
    result
}

/// Send one command to the running instance and return its reply, if any
pub async fn send_command(config: &Config, message: ControlMessage) -> Result<Option<String>> {
    let client = ControlClient::new(&config.socket_path, config.reply_timeout());
    Ok(client.send(message).await?)
}
