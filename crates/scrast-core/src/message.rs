// ABOUTME: Wire vocabulary of the control socket.
// ABOUTME: One trimmed line per connection; unknown text maps to None.

use std::fmt;

/// Reply to `ping`.
pub const PONG: &str = "pong\n";
const PING_PONG_REPLY: &str = "pong taiken shiyo!\n";
const PING_PONG_RING_REPLY: &str = "ping pong pong, girls ganbare!\u{1F340}\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    Stop,
    Pause,
    Resume,
    Info,
    /// Liveness echoes, answered by the server without touching the encoder.
    Ping,
    PingPong,
    PingPongRing,
}

impl ControlMessage {
    /// Parse the text a client sent. Surrounding whitespace is ignored.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "stop" => Some(Self::Stop),
            "pause" => Some(Self::Pause),
            "resume" => Some(Self::Resume),
            "info" => Some(Self::Info),
            "ping" => Some(Self::Ping),
            "ping pong" => Some(Self::PingPong),
            "ping pong narashite" => Some(Self::PingPongRing),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Info => "info",
            Self::Ping => "ping",
            Self::PingPong => "ping pong",
            Self::PingPongRing => "ping pong narashite",
        }
    }

    /// Fixed reply of a liveness echo, `None` for every other message.
    pub fn echo_reply(&self) -> Option<&'static str> {
        match self {
            Self::Ping => Some(PONG),
            Self::PingPong => Some(PING_PONG_REPLY),
            Self::PingPongRing => Some(PING_PONG_RING_REPLY),
            _ => None,
        }
    }

    /// Whether the client waits for a reply body after writing.
    pub fn expects_reply(&self) -> bool {
        matches!(self, Self::Info) || self.echo_reply().is_some()
    }
}

impl fmt::Display for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(ControlMessage::parse("stop"), Some(ControlMessage::Stop));
        assert_eq!(ControlMessage::parse("pause"), Some(ControlMessage::Pause));
        assert_eq!(
            ControlMessage::parse("resume"),
            Some(ControlMessage::Resume)
        );
        assert_eq!(ControlMessage::parse("info"), Some(ControlMessage::Info));
        assert_eq!(ControlMessage::parse("ping"), Some(ControlMessage::Ping));
        assert_eq!(
            ControlMessage::parse("ping pong"),
            Some(ControlMessage::PingPong)
        );
        assert_eq!(
            ControlMessage::parse(" ping pong narashite\n"),
            Some(ControlMessage::PingPongRing)
        );
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(
            ControlMessage::parse("  stop\n"),
            Some(ControlMessage::Stop)
        );
        assert_eq!(
            ControlMessage::parse("\tinfo\r\n"),
            Some(ControlMessage::Info)
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(ControlMessage::parse(""), None);
        assert_eq!(ControlMessage::parse("STOP"), None);
        assert_eq!(ControlMessage::parse("stop now"), None);
    }

    #[test]
    fn test_as_str_matches_parse() {
        for message in [
            ControlMessage::Stop,
            ControlMessage::Pause,
            ControlMessage::Resume,
            ControlMessage::Info,
            ControlMessage::Ping,
            ControlMessage::PingPong,
            ControlMessage::PingPongRing,
        ] {
            assert_eq!(ControlMessage::parse(message.as_str()), Some(message));
        }
    }

    #[test]
    fn test_expects_reply() {
        assert!(ControlMessage::Info.expects_reply());
        assert!(ControlMessage::Ping.expects_reply());
        assert!(!ControlMessage::Stop.expects_reply());
        assert!(!ControlMessage::Pause.expects_reply());
        assert!(ControlMessage::PingPongRing.expects_reply());
    }

    #[test]
    fn test_each_echo_has_its_own_reply() {
        assert_eq!(ControlMessage::Ping.echo_reply(), Some("pong\n"));
        assert_eq!(
            ControlMessage::PingPong.echo_reply(),
            Some("pong taiken shiyo!\n")
        );
        assert!(ControlMessage::PingPongRing
            .echo_reply()
            .is_some_and(|reply| reply.starts_with("ping pong pong")));
        assert_eq!(ControlMessage::Info.echo_reply(), None);
        assert_eq!(ControlMessage::Stop.echo_reply(), None);
    }
}
