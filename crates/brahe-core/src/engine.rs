use crate::compare;
use crate::config::{Mode, RunConfig};
use crate::database;
use crate::dedupe;
use crate::error::Error;
use crate::gaps;
use crate::progress::{split_budget, Counter, Discrepancy, Progress, Reporter, Tally};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Completion scale handed to the top-level walk.
pub const FULL_BUDGET: f64 = 100.0;

/// What every walk needs: the configuration, the shared tracker and the
/// reporter. Cheap to copy around by reference.
pub struct Context<'a> {
    pub config: &'a RunConfig,
    pub progress: &'a Progress,
    pub reporter: &'a dyn Reporter,
}

impl<'a> Context<'a> {
    pub fn new(config: &'a RunConfig, progress: &'a Progress, reporter: &'a dyn Reporter) -> Self {
        Self {
            config,
            progress,
            reporter,
        }
    }

    /// Counts one event both in the caller's tally and in the shared tracker.
    pub fn count(&self, tally: &mut Tally, counter: Counter) {
        tally.add(counter, 1);
        self.progress.increment(counter);
    }

    pub fn uncount(&self, tally: &mut Tally, counter: Counter) {
        tally.subtract(counter, 1);
        self.progress.decrement(counter);
    }

    pub fn report(&self, discrepancy: Discrepancy) {
        debug!("{}", discrepancy);
        self.reporter.on_discrepancy(&discrepancy);
    }
}

pub struct Engine {
    config: RunConfig,
    progress: Arc<Progress>,
    reporter: Arc<dyn Reporter>,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub counts: Tally,
    pub percent_complete: f64,
    pub duration: Duration,
}

impl Engine {
    pub fn new(config: RunConfig, progress: Arc<Progress>, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            config,
            progress,
            reporter,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn progress(&self) -> Arc<Progress> {
        Arc::clone(&self.progress)
    }

    /// Runs the configured mode to completion. The first fatal error aborts
    /// the run; discrepancies are reported and counted instead.
    pub fn run(&self) -> Result<RunSummary, Error> {
        let started = Instant::now();
        let ctx = Context::new(&self.config, &self.progress, self.reporter.as_ref());
        let entries = &self.config.entries;
        let depth = self.config.depth;

        info!("Starting {:?} over {} entries", self.config.mode, entries.len());

        let counts = match &self.config.mode {
            Mode::FindGaps(pattern) => gaps::find_gaps(&ctx, FULL_BUDGET, pattern, entries)?,
            Mode::Dedupe => {
                let mut seen = HashSet::new();
                dedupe::delete_dupes(&ctx, FULL_BUDGET, &entries[0], depth, &mut seen)?
            }
            Mode::BuildDatabase => {
                let db_root = database::db_root(&entries[1]);
                database::initialize(&db_root)?;
                database::build_walk(&ctx, &db_root, FULL_BUDGET, &entries[0], depth)?
            }
            Mode::CheckDatabase { copy_to } => {
                let db_root = database::db_root(&entries[0]);
                database::verify_exists(&db_root)?;
                let targets = &entries[1..];
                let (chunk, extra) = split_budget(FULL_BUDGET, targets.len());
                let mut tally = Tally::default();
                for target in targets {
                    let sub = database::check_walk(
                        &ctx,
                        &db_root,
                        chunk,
                        target,
                        depth,
                        copy_to.as_deref(),
                    )?;
                    tally.merge(&sub);
                }
                self.progress.advance(extra);
                tally
            }
            Mode::Compare => compare::compare_dir(&ctx, FULL_BUDGET, entries, depth)?,
        };

        let duration = started.elapsed();
        info!(
            "Completed in {:.2}s: {} matched, {} mismatched, {} missing, {} ignored, {} copied",
            duration.as_secs_f64(),
            counts.matched,
            counts.mismatched,
            counts.missing,
            counts.ignored,
            counts.copied,
        );

        Ok(RunSummary {
            counts,
            percent_complete: self.progress.snapshot().percent_complete,
            duration,
        })
    }
}
