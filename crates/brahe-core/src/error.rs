use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to {op} {}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    #[error("Hash database not found at {} (build it first)", .0.display())]
    DatabaseMissing(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Invalid gap pattern '{pattern}': {reason}")]
    GapPattern { pattern: String, reason: String },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{} is not under any configured entry", .0.display())]
    Unrooted(PathBuf),

    #[error("Failed to load configuration")]
    Config(#[from] config::ConfigError),
}

impl Error {
    pub fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        Error::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn gap_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        Error::GapPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_io_display_leaves_cause_to_source() {
        let err = Error::io(
            "list directory",
            Path::new("/nope"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.to_string(), "Failed to list directory /nope");
        assert_eq!(err.source().unwrap().to_string(), "gone");
    }
}
