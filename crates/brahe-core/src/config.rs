use crate::database::DATABASE_DIR_NAME;
use crate::error::Error;
use crate::gaps::GapPattern;
use crate::listing::DirectoryEntry;
use config::{Config, File as ConfigFile};
use serde::Deserialize;
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{self, Path, PathBuf};

/// Optional settings read from `Brahe.toml` (or any format the `config`
/// crate understands) in the working directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub system_dir_names: Vec<String>,
    pub system_file_names: Vec<String>,
    pub refresh_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            system_dir_names: vec![
                "$RECYCLE.BIN".to_string(),
                "$Recycle.Bin".to_string(),
                "System Volume Information".to_string(),
                "found.000".to_string(),
            ],
            system_file_names: vec!["Thumbs.db".to_string()],
            refresh_interval_ms: 100,
        }
    }
}

pub fn load_configuration() -> Result<AppConfig, Error> {
    let settings = Config::builder()
        .add_source(ConfigFile::with_name("Brahe").required(false))
        .build()?;
    Ok(settings.try_deserialize::<AppConfig>()?)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Compare,
    BuildDatabase,
    CheckDatabase { copy_to: Option<PathBuf> },
    Dedupe,
    FindGaps(GapPattern),
}

impl Mode {
    fn min_entries(&self) -> usize {
        match self {
            Mode::Dedupe | Mode::FindGaps(_) => 1,
            _ => 2,
        }
    }

    fn uses_database(&self) -> bool {
        matches!(self, Mode::BuildDatabase | Mode::CheckDatabase { .. })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// -1 for no limit, 0 to look only at the immediate entries.
    pub depth: i32,
    pub compare_contents: bool,
    pub include_system_names: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            depth: -1,
            compare_contents: true,
            include_system_names: false,
        }
    }
}

/// Resolved, validated configuration for one run. Read-only once built.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Index 0 is the source.
    pub entries: Vec<PathBuf>,
    pub depth: i32,
    pub compare_contents: bool,
    pub include_system_names: bool,
    pub ignored_dirs: HashSet<PathBuf>,
    pub ignored_files: HashSet<OsString>,
    pub mode: Mode,
}

impl RunConfig {
    pub fn new(
        paths: Vec<PathBuf>,
        mode: Mode,
        options: RunOptions,
        settings: &AppConfig,
    ) -> Result<Self, Error> {
        if !options.compare_contents && mode.uses_database() {
            return Err(Error::InvalidArguments(
                "Can't deal with the hash database without looking at file contents".to_string(),
            ));
        }

        let min_entries = mode.min_entries();
        if paths.len() < min_entries {
            return Err(Error::InvalidArguments(format!(
                "Expected at least {} paths, got {}",
                min_entries,
                paths.len()
            )));
        }

        let entries = paths
            .iter()
            .map(|p| absolute(p))
            .collect::<Result<Vec<_>, _>>()?;

        let mode = match mode {
            Mode::CheckDatabase {
                copy_to: Some(dest),
            } => Mode::CheckDatabase {
                copy_to: Some(absolute(&dest)?),
            },
            other => other,
        };

        let mut ignored_dirs = HashSet::new();
        let mut ignored_files = HashSet::new();
        for entry in &entries {
            ignored_dirs.insert(entry.join(DATABASE_DIR_NAME));
            if !options.include_system_names {
                for name in &settings.system_dir_names {
                    ignored_dirs.insert(entry.join(name));
                }
            }
        }
        if !options.include_system_names {
            ignored_files.extend(settings.system_file_names.iter().map(OsString::from));
        }

        Ok(Self {
            entries,
            depth: options.depth,
            compare_contents: options.compare_contents,
            include_system_names: options.include_system_names,
            ignored_dirs,
            ignored_files,
            mode,
        })
    }

    /// Whether `entry`, found at `path`, is skipped by an ignore rule.
    pub fn is_ignored(&self, path: &Path, entry: &DirectoryEntry) -> bool {
        self.ignored_dirs.contains(path)
            || (!entry.is_dir && self.ignored_files.contains(&entry.name))
    }
}

fn absolute(path: &Path) -> Result<PathBuf, Error> {
    path::absolute(path).map_err(|e| Error::io("resolve path", path, e))
}

/// The depth to hand to a child directory, or `None` when the limit is
/// reached. Negative depths never run out.
pub fn descend(depth: i32) -> Option<i32> {
    match depth {
        0 => None,
        d if d < 0 => Some(d),
        d => Some(d - 1),
    }
}
