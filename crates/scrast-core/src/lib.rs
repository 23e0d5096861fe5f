// ABOUTME: Shared types and configuration for scrast.
// ABOUTME: Everything here is free of processes and sockets.

pub mod config;
pub mod format;
pub mod message;
pub mod progress;
pub mod session;

pub use config::Config;
pub use message::ControlMessage;
pub use progress::{parse_progress, Progress};
pub use session::{Session, SessionStore, Status};
