// ABOUTME: Local control channel between a running recorder and later invocations.
// ABOUTME: The server relays commands to the recorder loop; the client sends one.

pub mod client;
pub mod socket;

pub use client::ControlClient;
pub use socket::{probe, ControlCommand, ControlServer, ServerHandle, SocketState};
