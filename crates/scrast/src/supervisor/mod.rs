// ABOUTME: Encoder supervisor: owns the encoder process and drives the session state.
// ABOUTME: Maps control requests to signals and process events to session updates.

pub mod signal;
mod spawn;

pub use signal::{ControlSignal, OsSignaller, Signaller};

use crate::error::SupervisorError;
use scrast_core::{parse_progress, Session, SessionStore, Status};
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use tokio::sync::mpsc;

/// Something that happened to the encoder process.
#[derive(Debug, Clone, PartialEq)]
pub enum EncoderEvent {
    /// The OS confirmed the launch.
    Spawned { pid: u32 },
    /// A chunk of diagnostic output.
    Output(String),
    /// The process exited and its output stream is drained.
    Exited(ExitReport),
}

/// Exit code and terminating signal of the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl From<ExitStatus> for ExitReport {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
            signal: status.signal(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    /// Exit code 0, or 255 after a stop signal.
    Completed,
    /// Killed by a signal without an exit code.
    Signalled(i32),
    /// Any other exit code.
    Abnormal(i32),
    /// The exit status could not be collected.
    Unknown,
}

impl ExitReport {
    pub fn classify(&self) -> ExitKind {
        match (self.code, self.signal) {
            (Some(0 | 255), _) => ExitKind::Completed,
            (Some(code), None) => ExitKind::Abnormal(code),
            (_, Some(signal)) => ExitKind::Signalled(signal),
            (None, None) => ExitKind::Unknown,
        }
    }
}

/// Tail of the encoder's diagnostic output, bounded to `limit` bytes.
#[derive(Debug)]
struct DiagnosticBuffer {
    text: String,
    limit: usize,
}

impl DiagnosticBuffer {
    fn new(limit: usize) -> Self {
        Self {
            text: String::new(),
            limit,
        }
    }

    fn push(&mut self, chunk: &str) {
        self.text.push_str(chunk);
        if self.text.len() > self.limit {
            let mut cut = self.text.len() - self.limit;
            while !self.text.is_char_boundary(cut) {
                cut += 1;
            }
            self.text.drain(..cut);
        }
    }

    fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}

/// Owns the encoder process handle and is the only writer of the session store.
///
/// All methods are meant to be called from one task; the supervisor itself holds
/// no locks.
pub struct Supervisor<S: Signaller = OsSignaller> {
    store: SessionStore,
    signaller: S,
    pid: Option<u32>,
    diagnostics: DiagnosticBuffer,
}

impl Supervisor<OsSignaller> {
    pub fn new(store: SessionStore, error_buffer_bytes: usize) -> Self {
        Self::with_signaller(store, OsSignaller, error_buffer_bytes)
    }
}

impl<S: Signaller> Supervisor<S> {
    pub fn with_signaller(store: SessionStore, signaller: S, error_buffer_bytes: usize) -> Self {
        Self {
            store,
            signaller,
            pid: None,
            diagnostics: DiagnosticBuffer::new(error_buffer_bytes),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Pid of the live encoder, if any.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn is_running(&self) -> bool {
        self.pid.is_some()
    }

    /// Spawn the encoder. Lifecycle events arrive on `events` and must be fed back
    /// through [`Supervisor::handle_event`].
    pub fn start(
        &mut self,
        binary: &str,
        args: &[String],
        events: mpsc::UnboundedSender<EncoderEvent>,
    ) -> Result<u32, SupervisorError> {
        if self.pid.is_some() {
            return Err(SupervisorError::ProcessAlreadyRunning);
        }
        let pid = spawn::spawn_encoder(binary, args, events)?;
        self.attach(pid)?;
        Ok(pid)
    }

    /// Take ownership of an already launched encoder process.
    pub fn attach(&mut self, pid: u32) -> Result<(), SupervisorError> {
        if self.pid.is_some() {
            return Err(SupervisorError::ProcessAlreadyRunning);
        }
        self.pid = Some(pid);
        Ok(())
    }

    /// Apply one encoder event. Returns how the encoder ended once it has exited;
    /// an abnormal exit or an unreadable exit status is returned as an error
    /// carrying the collected output.
    pub fn handle_event(
        &mut self,
        event: EncoderEvent,
    ) -> Result<Option<ExitKind>, SupervisorError> {
        match event {
            EncoderEvent::Spawned { pid } => {
                tracing::debug!(pid, "Encoder launch confirmed");
                // A command handled before this event already moved the status on.
                self.store.update(|s| match s.status {
                    Status::Stopped => s.with_status(Status::Recording),
                    _ => s,
                });
                Ok(None)
            }
            EncoderEvent::Output(chunk) => {
                self.diagnostics.push(&chunk);
                if let Some(progress) = parse_progress(&chunk) {
                    self.store.update(|s| Session {
                        elapsed_seconds: progress.elapsed_seconds,
                        byte_count: progress.byte_count,
                        ..s
                    });
                }
                Ok(None)
            }
            EncoderEvent::Exited(report) => {
                let pid = self.pid.take();
                self.store.update(|s| s.with_status(Status::Stopped));
                let output = self.diagnostics.take();

                let kind = report.classify();
                match kind {
                    ExitKind::Completed => {
                        tracing::info!(?pid, code = ?report.code, "Encoder finished");
                        Ok(Some(kind))
                    }
                    ExitKind::Signalled(signal) => {
                        tracing::warn!(?pid, signal, "Encoder closed by signal");
                        Ok(Some(kind))
                    }
                    ExitKind::Abnormal(code) => {
                        tracing::error!(?pid, code, "Encoder terminated abnormally");
                        Err(SupervisorError::AbnormalTermination { code, output })
                    }
                    ExitKind::Unknown => {
                        tracing::error!(?pid, "Encoder exit status unavailable");
                        Err(SupervisorError::ExitStatusLost { output })
                    }
                }
            }
        }
    }

    /// Suspend the encoder. Ignored without a live encoder or while stopping.
    pub fn pause(&mut self) {
        let Some(pid) = self.pid else { return };
        if self.store.read().status == Status::Stopping {
            tracing::debug!(pid, "Ignoring pause while stopping");
            return;
        }
        self.signal(pid, ControlSignal::Suspend);
        self.store.update(|s| s.with_status(Status::Paused));
    }

    /// Continue a suspended encoder. Ignored without a live encoder or while stopping.
    pub fn resume(&mut self) {
        let Some(pid) = self.pid else { return };
        if self.store.read().status == Status::Stopping {
            tracing::debug!(pid, "Ignoring resume while stopping");
            return;
        }
        self.signal(pid, ControlSignal::Continue);
        self.store.update(|s| s.with_status(Status::Recording));
    }

    /// Ask the encoder to finish. A suspended encoder is continued first, since it
    /// would not act on the interrupt while stopped.
    pub fn stop(&mut self) {
        let Some(pid) = self.pid else { return };
        if self.store.read().status == Status::Paused {
            self.signal(pid, ControlSignal::Continue);
        }
        self.store.update(|s| s.with_status(Status::Stopping));
        self.signal(pid, ControlSignal::Interrupt);
    }

    fn signal(&self, pid: u32, signal: ControlSignal) {
        tracing::debug!(pid, ?signal, "Signalling encoder");
        if let Err(e) = self.signaller.send(pid, signal) {
            tracing::warn!(pid, ?signal, error = %e, "Failed to signal encoder");
        }
    }
}
