// ABOUTME: Translates supervisor actions into OS signals for the encoder.
// ABOUTME: The Signaller trait keeps the state machine testable without processes.

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::io;

/// What the supervisor asks of the encoder process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    Suspend,
    Continue,
    /// Graceful termination; the encoder finalizes its output file.
    Interrupt,
}

impl ControlSignal {
    pub fn to_os(self) -> Signal {
        match self {
            ControlSignal::Suspend => Signal::SIGSTOP,
            ControlSignal::Continue => Signal::SIGCONT,
            ControlSignal::Interrupt => Signal::SIGINT,
        }
    }
}

/// Delivers control signals to a process.
pub trait Signaller: Send {
    fn send(&self, pid: u32, signal: ControlSignal) -> io::Result<()>;
}

/// Signals real processes with kill(2).
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSignaller;

impl Signaller for OsSignaller {
    fn send(&self, pid: u32, signal: ControlSignal) -> io::Result<()> {
        let pid = i32::try_from(pid)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;
        kill(Pid::from_raw(pid), signal.to_os()).map_err(io::Error::from)
    }
}
