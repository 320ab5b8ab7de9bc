#![allow(dead_code)]

use brahe_core::{
    AppConfig, Digest, Discrepancy, Engine, Error, Mode, Progress, Reporter, RunConfig,
    RunOptions, RunSummary,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Reporter that keeps everything it is told, for assertions.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub discrepancies: Mutex<Vec<Discrepancy>>,
    pub verified: Mutex<Vec<PathBuf>>,
    pub copied: Mutex<Vec<(PathBuf, PathBuf)>>,
    pub removed: Mutex<Vec<PathBuf>>,
}

impl RecordingReporter {
    pub fn discrepancies(&self) -> Vec<Discrepancy> {
        self.discrepancies.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn on_discrepancy(&self, discrepancy: &Discrepancy) {
        self.discrepancies.lock().unwrap().push(discrepancy.clone());
    }

    fn on_verified(&self, path: &Path, _digest: &Digest, _mb_per_sec: f64) {
        self.verified.lock().unwrap().push(path.to_path_buf());
    }

    fn on_copied(&self, from: &Path, to: &Path) {
        self.copied
            .lock()
            .unwrap()
            .push((from.to_path_buf(), to.to_path_buf()));
    }

    fn on_duplicate_removed(&self, path: &Path, _digest: &Digest) {
        self.removed.lock().unwrap().push(path.to_path_buf());
    }
}

pub fn run_mode(
    paths: &[&Path],
    mode: Mode,
    options: RunOptions,
) -> Result<(RunSummary, Arc<RecordingReporter>), Error> {
    let config = RunConfig::new(
        paths.iter().map(|p| p.to_path_buf()).collect(),
        mode,
        options,
        &AppConfig::default(),
    )?;
    let reporter = Arc::new(RecordingReporter::default());
    let engine = Engine::new(config, Arc::new(Progress::new()), reporter.clone());
    let summary = engine.run()?;
    Ok((summary, reporter))
}

pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

pub fn assert_full_progress(summary: &RunSummary) {
    assert!(
        (summary.percent_complete - 100.0).abs() < 1e-6,
        "progress ended at {}",
        summary.percent_complete
    );
}
