// ABOUTME: Extracts written size and elapsed time from encoder diagnostic output.
// ABOUTME: Matches the `<n>kB time=HH:MM:SS.ff` fragment of a progress line.

use regex::Regex;
use std::sync::OnceLock;

/// Size and position reported by one encoder progress line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub byte_count: u64,
    pub elapsed_seconds: f64,
}

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?P<size>[0-9]+)(?:kB|KiB)\s+time=(?P<time>\d{2,}:\d{2}:\d{2}\.\d{2})")
            .expect("progress pattern is valid")
    })
}

/// Parse a chunk of diagnostic text. A chunk may hold several `\r`-separated
/// progress lines; the last one wins. Returns `None` when nothing matches.
pub fn parse_progress(chunk: &str) -> Option<Progress> {
    let captures = pattern().captures_iter(chunk).last()?;
    let kilobytes: u64 = captures["size"].parse().ok()?;
    let elapsed_seconds = parse_timestamp(&captures["time"])?;

    Some(Progress {
        byte_count: kilobytes.checked_mul(1024)?,
        elapsed_seconds,
    })
}

/// `HH:MM:SS.ff` to total seconds, rounded to three decimal places.
pub fn parse_timestamp(timestamp: &str) -> Option<f64> {
    let mut total = 0.0;
    for part in timestamp.split(':') {
        let value: f64 = part.parse().ok()?;
        total = total * 60.0 + value;
    }
    Some((total * 1000.0).round() / 1000.0)
}
