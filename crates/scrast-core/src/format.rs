// ABOUTME: Human-readable rendering of session values.
// ABOUTME: Durations as "2 minutes, 5 seconds", sizes in binary units.

use crate::session::Session;

const SIZE_UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

/// Whole hours, minutes and seconds, skipping zero components.
pub fn human_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    if total == 0 {
        return "0 seconds".to_string();
    }

    let parts = [
        (total / 3600, "hour"),
        ((total % 3600) / 60, "minute"),
        (total % 60, "second"),
    ];

    parts
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| {
            if *value == 1 {
                format!("{value} {unit}")
            } else {
                format!("{value} {unit}s")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn human_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = SIZE_UNITS[0];
    for next in &SIZE_UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.2} {unit}")
}

/// Reply body for the `info` command.
pub fn render_info(session: &Session) -> String {
    format!(
        "Status: {}\nElapsed: {}\nSize: {}\n",
        session.status,
        human_duration(session.elapsed_seconds),
        human_size(session.byte_count)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Status;

    #[test]
    fn test_human_duration() {
        assert_eq!(human_duration(0.0), "0 seconds");
        assert_eq!(human_duration(0.9), "0 seconds");
        assert_eq!(human_duration(1.0), "1 second");
        assert_eq!(human_duration(62.5), "1 minute, 2 seconds");
        assert_eq!(human_duration(125.0), "2 minutes, 5 seconds");
        assert_eq!(human_duration(3600.0), "1 hour");
        assert_eq!(human_duration(7322.0), "2 hours, 2 minutes, 2 seconds");
        assert_eq!(human_duration(f64::NAN), "0 seconds");
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(1023), "1023 B");
        assert_eq!(human_size(1024), "1.00 KiB");
        assert_eq!(human_size(1536), "1.50 KiB");
        assert_eq!(human_size(2_097_152), "2.00 MiB");
        assert_eq!(human_size(3 * 1024 * 1024 * 1024), "3.00 GiB");
    }

    #[test]
    fn test_render_info() {
        let session = Session {
            status: Status::Recording,
            elapsed_seconds: 125.0,
            byte_count: 2_097_152,
        };
        assert_eq!(
            render_info(&session),
            "Status: recording\nElapsed: 2 minutes, 5 seconds\nSize: 2.00 MiB\n"
        );
    }
}
