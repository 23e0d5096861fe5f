// ABOUTME: The recorder loop: encoder events, control commands and local signals.
// ABOUTME: Owns the single shutdown routine that runs on every exit path.

use crate::control::{ControlCommand, ControlServer, ServerHandle};
use crate::supervisor::{EncoderEvent, ExitKind, Supervisor};
use anyhow::Result;
use nix::sys::signal::Signal as OsSignal;
use scrast_core::format::render_info;
use scrast_core::{Config, SessionStore};
use std::time::Duration;
use tokio::signal::unix::{signal, Signal, SignalKind};
use tokio::sync::mpsc;

/// How long shutdown waits for the encoder to finish its file.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Options for running the recorder
pub struct RecorderOptions {
    /// Passed to the encoder verbatim
    pub encoder_args: Vec<String>,
    /// Bind the control socket (disable to run several instances)
    pub control: bool,
}

/// Launcher state. Every field is touched only from the task running the loop.
pub struct Recorder {
    config: Config,
    supervisor: Supervisor,
    events_tx: mpsc::UnboundedSender<EncoderEvent>,
    events_rx: mpsc::UnboundedReceiver<EncoderEvent>,
    commands: Option<mpsc::Receiver<ControlCommand>>,
    server: Option<ServerHandle>,
}

impl Recorder {
    pub fn new(store: SessionStore, config: Config) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            supervisor: Supervisor::new(store, config.error_buffer_bytes),
            config,
            events_tx,
            events_rx,
            commands: None,
            server: None,
        }
    }

    /// Record until the encoder exits, then tear everything down. Errors from any
    /// step still run the shutdown routine before being returned.
    pub async fn run(mut self, options: RecorderOptions) -> Result<ExitKind> {
        let result = self.record(options).await;
        self.shutdown().await;
        result
    }

    async fn record(&mut self, options: RecorderOptions) -> Result<ExitKind> {
        if options.control {
            let server =
                ControlServer::bind(&self.config.socket_path, self.config.reply_timeout()).await?;
            let (cmd_tx, cmd_rx) = mpsc::channel(16);
            self.server = Some(server.spawn(cmd_tx));
            self.commands = Some(cmd_rx);
        }

        self.supervisor.start(
            &self.config.encoder,
            &options.encoder_args,
            self.events_tx.clone(),
        )?;

        let mut signals = LocalSignals::install()?;

        loop {
            tokio::select! {
                biased;
                Some(event) = self.events_rx.recv() => {
                    if let Some(kind) = self.supervisor.handle_event(event)? {
                        return Ok(kind);
                    }
                }
                Some(command) = next_command(&mut self.commands) => self.apply(command),
                Some(command) = signals.recv() => {
                    tracing::info!(?command, "Local signal received");
                    self.apply(command);
                }
            }
        }
    }

    fn apply(&mut self, command: ControlCommand) {
        match command {
            ControlCommand::Stop => self.supervisor.stop(),
            ControlCommand::Pause => self.supervisor.pause(),
            ControlCommand::Resume => self.supervisor.resume(),
            ControlCommand::Info { reply } => {
                let _ = reply.send(render_info(&self.supervisor.store().read()));
            }
        }
    }

    /// Best-effort teardown: stop the encoder if it still runs, then close the
    /// control socket. Safe when either was never started.
    async fn shutdown(&mut self) {
        if let Some(commands) = self.commands.as_mut() {
            // Dropping queued info requests releases any waiting client.
            commands.close();
            while commands.try_recv().is_ok() {}
        }

        if self.supervisor.is_running() {
            self.supervisor.stop();
            let Self {
                supervisor,
                events_rx,
                ..
            } = self;
            let drain = async {
                while let Some(event) = events_rx.recv().await {
                    match supervisor.handle_event(event) {
                        Ok(Some(_)) => break,
                        Ok(None) => {}
                        Err(e) => {
                            tracing::warn!(error = %e, "Encoder failed during shutdown");
                            break;
                        }
                    }
                }
            };
            if tokio::time::timeout(SHUTDOWN_GRACE, drain).await.is_err() {
                tracing::warn!("Encoder did not exit within the shutdown grace period");
            }
        }

        if let Some(server) = self.server.take() {
            server.shutdown().await;
        }
    }
}

async fn next_command(
    commands: &mut Option<mpsc::Receiver<ControlCommand>>,
) -> Option<ControlCommand> {
    match commands {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Signals the launcher answers like the matching socket commands.
struct LocalSignals {
    interrupt: Signal,
    terminate: Signal,
    suspend: Signal,
    resume: Signal,
}

impl LocalSignals {
    fn install() -> std::io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            suspend: signal(SignalKind::from_raw(OsSignal::SIGTSTP as i32))?,
            resume: signal(SignalKind::from_raw(OsSignal::SIGCONT as i32))?,
        })
    }

    async fn recv(&mut self) -> Option<ControlCommand> {
        tokio::select! {
            Some(()) = self.interrupt.recv() => Some(ControlCommand::Stop),
            Some(()) = self.terminate.recv() => Some(ControlCommand::Stop),
            Some(()) = self.suspend.recv() => Some(ControlCommand::Pause),
            Some(()) = self.resume.recv() => Some(ControlCommand::Resume),
            else => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlClient;
    use scrast_core::{ControlMessage, Status};
    use std::path::Path;

    fn config_for(dir: &Path, encoder: &str) -> Config {
        Config {
            encoder: encoder.to_string(),
            socket_path: dir.join("scrast.sock"),
            ..Config::default()
        }
    }

    fn script(body: &str) -> Vec<String> {
        vec!["-c".to_string(), body.to_string()]
    }

    #[tokio::test]
    async fn test_clean_exit_finishes_and_removes_socket() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), "sh");
        let socket = config.socket_path.clone();
        let store = SessionStore::new();

        let kind = Recorder::new(store.clone(), config)
            .run(RecorderOptions {
                encoder_args: script("echo 'size=       8kB time=00:00:00.50' >&2; exit 0"),
                control: true,
            })
            .await
            .unwrap();

        assert_eq!(kind, ExitKind::Completed);
        assert_eq!(store.read().status, Status::Stopped);
        assert_eq!(store.read().byte_count, 8 * 1024);
        assert!(!socket.exists());
    }

    #[tokio::test]
    async fn test_abnormal_exit_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), "sh");
        let socket = config.socket_path.clone();

        let err = Recorder::new(SessionStore::new(), config)
            .run(RecorderOptions {
                encoder_args: script("echo 'No such device' >&2; exit 1"),
                control: true,
            })
            .await
            .unwrap_err();

        assert!(err.to_string().contains("No such device"));
        assert!(!socket.exists());
    }

    #[tokio::test]
    async fn test_missing_encoder_is_fatal_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), "scrast-missing-encoder");
        let socket = config.socket_path.clone();

        let err = Recorder::new(SessionStore::new(), config)
            .run(RecorderOptions {
                encoder_args: vec![],
                control: true,
            })
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("scrast-missing-encoder binary not found"));
        assert!(!socket.exists());
    }

    #[tokio::test]
    async fn test_socket_commands_drive_the_encoder() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), "sleep");
        let socket = config.socket_path.clone();
        let store = SessionStore::new();

        let recorder = Recorder::new(store.clone(), config);
        let run = tokio::spawn(recorder.run(RecorderOptions {
            encoder_args: vec!["30".to_string()],
            control: true,
        }));

        let client = ControlClient::new(&socket, Duration::from_secs(5));
        while !client.is_active().await {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        client.send(ControlMessage::Pause).await.unwrap();
        let info = client.send(ControlMessage::Info).await.unwrap().unwrap();
        assert!(info.starts_with("Status: paused\n"), "{info}");

        client.send(ControlMessage::Stop).await.unwrap();
        let kind = tokio::time::timeout(Duration::from_secs(10), run)
            .await
            .expect("recorder did not stop")
            .unwrap()
            .unwrap();

        assert_eq!(kind, ExitKind::Signalled(OsSignal::SIGINT as i32));
        assert_eq!(store.read().status, Status::Stopped);
        assert!(!socket.exists());
    }
}
