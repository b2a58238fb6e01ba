//! Console stop command
//!
//! Cancels the run when the operator types `exit`.

use std::io::BufRead;
use tokio_util::sync::CancellationToken;

pub const EXIT_COMMAND: &str = "exit";

/// Cancel `cancel` once a line reading `exit` arrives
///
/// Returns when the command is seen, the reader closes, or the token was
/// cancelled elsewhere by the time the next line arrives.
pub fn watch_for_exit<R: BufRead>(reader: R, cancel: &CancellationToken) {
    for line in reader.lines() {
        match line {
            Ok(line) if line.trim().eq_ignore_ascii_case(EXIT_COMMAND) => {
                tracing::info!("Exit command received, stopping monitor");
                cancel.cancel();
                return;
            }
            Ok(_) if cancel.is_cancelled() => return,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("Console input closed: {}", e);
                return;
            }
        }
    }
}

/// Watch stdin on a detached thread
///
/// A pending `tokio::io::stdin` read holds up runtime shutdown; a plain
/// thread does not.
pub fn spawn_stdin_watch(cancel: CancellationToken) {
    std::thread::spawn(move || watch_for_exit(std::io::stdin().lock(), &cancel));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_exit_line_cancels() {
        let cancel = CancellationToken::new();
        watch_for_exit(Cursor::new("status\n  EXIT \nmore\n"), &cancel);
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_closed_reader_does_not_cancel() {
        let cancel = CancellationToken::new();
        watch_for_exit(Cursor::new("hello\n"), &cancel);
        assert!(!cancel.is_cancelled());
    }

    #[test]
    fn test_stops_reading_after_external_cancel() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        watch_for_exit(Cursor::new("one\ntwo\n"), &cancel);
        assert!(cancel.is_cancelled());
    }
}
