use crate::digest::Digest;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Matched,
    Mismatched,
    Missing,
    Ignored,
    Copied,
}

/// Event counts for one walk (or a whole run).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub matched: u64,
    pub mismatched: u64,
    pub missing: u64,
    pub ignored: u64,
    pub copied: u64,
}

impl Tally {
    pub fn add(&mut self, counter: Counter, n: u64) {
        match counter {
            Counter::Matched => self.matched += n,
            Counter::Mismatched => self.mismatched += n,
            Counter::Missing => self.missing += n,
            Counter::Ignored => self.ignored += n,
            Counter::Copied => self.copied += n,
        }
    }

    pub fn subtract(&mut self, counter: Counter, n: u64) {
        match counter {
            Counter::Matched => self.matched -= n,
            Counter::Mismatched => self.mismatched -= n,
            Counter::Missing => self.missing -= n,
            Counter::Ignored => self.ignored -= n,
            Counter::Copied => self.copied -= n,
        }
    }

    pub fn merge(&mut self, other: &Tally) {
        self.matched += other.matched;
        self.mismatched += other.mismatched;
        self.missing += other.missing;
        self.ignored += other.ignored;
        self.copied += other.copied;
    }
}

#[derive(Debug, Default, Clone)]
pub struct ProgressState {
    /// Additive completion on the 0..=100 scale.
    pub percent_complete: f64,
    pub current_path: String,
    pub counts: Tally,
}

/// Process-wide progress and statistics, shared between the walk and the
/// status display. Every access goes through one mutex.
#[derive(Debug, Default)]
pub struct Progress {
    state: Mutex<ProgressState>,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn advance(&self, delta: f64) {
        self.lock().percent_complete += delta;
    }

    pub fn set_current_path(&self, path: &Path) {
        self.lock().current_path = path.display().to_string();
    }

    pub fn clear_current_path(&self) {
        self.lock().current_path.clear();
    }

    pub fn increment(&self, counter: Counter) {
        self.lock().counts.add(counter, 1);
    }

    pub fn decrement(&self, counter: Counter) {
        self.lock().counts.subtract(counter, 1);
    }

    pub fn snapshot(&self) -> ProgressState {
        self.lock().clone()
    }
}

/// Divides `budget` evenly over `count` children. The second value is the
/// rounding remainder the caller adds back once all children are done, so
/// the children plus the remainder always sum to `budget`.
pub fn split_budget(budget: f64, count: usize) -> (f64, f64) {
    if count == 0 {
        return (0.0, budget);
    }
    let chunk = budget / count as f64;
    let extra = budget - chunk * count as f64;
    (chunk, extra)
}

/// A discrepancy found while walking. These never stop a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discrepancy {
    Missing {
        path: PathBuf,
    },
    KindMismatch {
        source: PathBuf,
        target: PathBuf,
        source_is_dir: bool,
    },
    WrongHash {
        path: PathBuf,
        expected: Digest,
        actual: Digest,
    },
    NotInDatabase {
        path: PathBuf,
    },
    GapMissing {
        dir: PathBuf,
        name: String,
    },
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discrepancy::Missing { path } => write!(f, "Missing: {}", path.display()),
            Discrepancy::KindMismatch {
                source,
                target,
                source_is_dir,
            } => {
                let (expected, found) = if *source_is_dir {
                    ("directory", "file")
                } else {
                    ("file", "directory")
                };
                write!(
                    f,
                    "Type mismatch: {} is a {} but {} is a {}",
                    source.display(),
                    expected,
                    target.display(),
                    found
                )
            }
            Discrepancy::WrongHash {
                path,
                expected,
                actual,
            } => write!(
                f,
                "Hash wrong for file: {} - Expected {} - Got {}",
                path.display(),
                expected,
                actual
            ),
            Discrepancy::NotInDatabase { path } => {
                write!(f, "Not in database: {}", path.display())
            }
            Discrepancy::GapMissing { dir, name } => {
                write!(f, "Gap: {} missing from {}", name, dir.display())
            }
        }
    }
}

/// Trait for observing a run.
///
/// The CLI prints these above its status line; tests record them.
/// All methods have default no-op implementations.
pub trait Reporter: Send + Sync {
    fn on_discrepancy(&self, _discrepancy: &Discrepancy) {}
    fn on_verified(&self, _path: &Path, _digest: &Digest, _mb_per_sec: f64) {}
    fn on_copied(&self, _from: &Path, _to: &Path) {}
    fn on_duplicate_removed(&self, _path: &Path, _digest: &Digest) {}
}

/// No-op reporter for silent operation.
pub struct SilentReporter;

impl Reporter for SilentReporter {}
