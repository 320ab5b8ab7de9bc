use brahe_core::{Digest, Discrepancy, Progress, ProgressState, Reporter};
use chrono::Local;
use colored::*;
use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

/// Width of the `[hh:mm:ss] ` prefix drawn by the template.
const ELAPSED_WIDTH: usize = 11;

/// Background thread that samples the shared tracker and redraws one status
/// line. It never touches the tracker except to read it.
pub struct StatusDisplay {
    bar: ProgressBar,
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

impl StatusDisplay {
    pub fn start(progress: Arc<Progress>, interval: Duration) -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let (stop, rx) = mpsc::channel::<()>();
        let thread_bar = bar.clone();
        let handle = thread::spawn(move || {
            let term = Term::stderr();
            loop {
                render(&thread_bar, &term, &progress.snapshot());
                match rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            render(&thread_bar, &term, &progress.snapshot());
            thread_bar.finish();
        });

        Self { bar, stop, handle }
    }

    /// Handle for printing above the status line.
    pub fn bar(&self) -> ProgressBar {
        self.bar.clone()
    }

    /// Signals the thread, which draws once more and exits, and waits for it.
    pub fn finish(self) {
        let _ = self.stop.send(());
        if self.handle.join().is_err() {
            debug!("Status display thread panicked");
        }
    }
}

fn render(bar: &ProgressBar, term: &Term, state: &ProgressState) {
    let counts = format!(
        "[{:.1}% {}✓ {}D {}M {}I {}C]",
        state.percent_complete,
        state.counts.matched,
        state.counts.mismatched,
        state.counts.missing,
        state.counts.ignored,
        state.counts.copied,
    );
    let (_, columns) = term.size();
    let room = (columns as usize).saturating_sub(ELAPSED_WIDTH + counts.chars().count() + 1);

    bar.set_position(state.percent_complete.clamp(0.0, 100.0) as u64);
    bar.set_message(format!(
        "{} {}",
        counts,
        truncate_left(&state.current_path, room)
    ));
}

/// Keeps the tail of `text`, the part of a path that tells entries apart.
fn truncate_left(text: &str, max_chars: usize) -> String {
    let len = text.chars().count();
    if len <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let tail: String = text.chars().skip(len - (max_chars - 1)).collect();
    format!("…{}", tail)
}

fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// Prints discrepancies and file operations above the status line.
pub struct CliReporter {
    bar: ProgressBar,
}

impl CliReporter {
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl Reporter for CliReporter {
    fn on_discrepancy(&self, discrepancy: &Discrepancy) {
        let line = match discrepancy {
            Discrepancy::Missing { .. }
            | Discrepancy::GapMissing { .. }
            | Discrepancy::NotInDatabase { .. } => discrepancy.to_string().yellow(),
            _ => discrepancy.to_string().red(),
        };
        self.bar.println(format!("[{}] {}", timestamp(), line));
    }

    fn on_verified(&self, path: &Path, digest: &Digest, mb_per_sec: f64) {
        debug!("{} {} ({:.1} MB/s)", digest, path.display(), mb_per_sec);
    }

    fn on_copied(&self, from: &Path, to: &Path) {
        self.bar.println(format!(
            "[{}] {} {} -> {}",
            timestamp(),
            "Copied".green(),
            from.display(),
            to.display()
        ));
    }

    fn on_duplicate_removed(&self, path: &Path, digest: &Digest) {
        self.bar.println(format!(
            "[{}] {} {} ({})",
            timestamp(),
            "Removed duplicate".cyan(),
            path.display(),
            digest
        ));
    }
}
