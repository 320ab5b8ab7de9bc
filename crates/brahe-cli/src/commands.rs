use brahe_core::{GapPattern, Mode, RunOptions};
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "brahe")]
#[command(version, about = "Compare directory trees by name and content, hunt duplicates and gaps", long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .args(["build_db", "check_db", "delete_dupes", "find_gaps"])
        .multiple(false)
))]
pub struct Cli {
    /// Source directory followed by one or more targets
    #[arg(required = true, value_name = "PATHS")]
    pub paths: Vec<PathBuf>,

    /// Compare names and types only, never file contents
    #[arg(long)]
    pub no_data: bool,

    /// Include OS artifacts such as Thumbs.db and $RECYCLE.BIN
    #[arg(long)]
    pub system_names: bool,

    /// Recursion limit; -1 walks the whole tree, 0 stays at the top level
    #[arg(long, default_value_t = -1, allow_negative_numbers = true, value_name = "N")]
    pub depth: i32,

    /// Record every file of the first path into <second path>/BraheDB
    #[arg(long)]
    pub build_db: bool,

    /// Check the remaining paths against <first path>/BraheDB
    #[arg(long)]
    pub check_db: bool,

    /// Delete files in the first path whose content appeared earlier in the walk
    #[arg(long)]
    pub delete_dupes: bool,

    /// With --check-db, copy files unknown to the database into DIR
    #[arg(long, value_name = "DIR", requires = "check_db")]
    pub copy: Option<PathBuf>,

    /// Report names missing from a sequence: PREFIX/WIDTH:BEGIN-END/SUFFIX
    #[arg(long, value_name = "PATTERN", value_parser = parse_gap_pattern)]
    pub find_gaps: Option<GapPattern>,

    /// Start without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

fn parse_gap_pattern(value: &str) -> Result<GapPattern, String> {
    value.parse::<GapPattern>().map_err(|e| e.to_string())
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.build_db {
            Mode::BuildDatabase
        } else if self.check_db {
            Mode::CheckDatabase {
                copy_to: self.copy.clone(),
            }
        } else if self.delete_dupes {
            Mode::Dedupe
        } else if let Some(pattern) = &self.find_gaps {
            Mode::FindGaps(pattern.clone())
        } else {
            Mode::Compare
        }
    }

    pub fn options(&self) -> RunOptions {
        RunOptions {
            depth: self.depth,
            compare_contents: !self.no_data,
            include_system_names: self.system_names,
        }
    }
}
