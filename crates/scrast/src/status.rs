// ABOUTME: Terminal status line for the running recorder.
// ABOUTME: Redraws one line on every session change and prints fatal errors.

use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::{Print, Stylize};
use crossterm::terminal::{Clear, ClearType};
use scrast_core::format::{human_duration, human_size};
use scrast_core::{Session, SessionStore, Status};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Presentation sink subscribed to the session store.
pub struct StatusLine {
    drawn: Arc<AtomicBool>,
}

impl StatusLine {
    pub fn attach(store: &SessionStore) -> Self {
        let drawn = Arc::new(AtomicBool::new(false));
        let reader = store.clone();
        let flag = drawn.clone();
        store.subscribe(move || {
            flag.store(true, Ordering::Relaxed);
            draw(&format_line(&reader.read()));
        });
        Self { drawn }
    }

    /// End the status line so later output starts on a fresh line.
    pub fn finish(&self) {
        if self.drawn.swap(false, Ordering::Relaxed) {
            println!();
        }
    }
}

pub fn format_line(session: &Session) -> String {
    let name = session.status.as_str();
    let status = match session.status {
        Status::Recording => name.red().bold(),
        Status::Paused => name.yellow().bold(),
        Status::Stopped | Status::Stopping => name.white().bold(),
    };
    format!(
        "Status: {}, Elapsed: {}, Size: {}",
        status,
        human_duration(session.elapsed_seconds).white().bold(),
        human_size(session.byte_count).white().bold()
    )
}

fn draw(line: &str) {
    let mut out = io::stdout();
    let _ = queue!(
        out,
        MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(line)
    );
    let _ = out.flush();
}

pub fn print_error(message: &str) {
    eprintln!("{}", message.red().bold());
}
