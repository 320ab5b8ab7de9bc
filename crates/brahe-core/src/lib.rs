pub mod compare;
pub mod config;
pub mod copy;
pub mod database;
pub mod dedupe;
pub mod digest;
pub mod engine;
pub mod error;
pub mod gaps;
pub mod listing;
pub mod progress;
pub mod walk;

pub use config::{AppConfig, Mode, RunConfig, RunOptions};
pub use digest::Digest;
pub use engine::{Context, Engine, RunSummary};
pub use error::Error;
pub use gaps::GapPattern;
pub use progress::{Discrepancy, Progress, ProgressState, Reporter, SilentReporter, Tally};
