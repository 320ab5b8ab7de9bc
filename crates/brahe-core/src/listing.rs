use crate::error::Error;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::Path;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: OsString,
    pub is_dir: bool,
}

/// Lists the immediate entries of `dir` in the order the filesystem returns
/// them. Symlinks are not followed when deciding `is_dir`.
pub fn list_dir(dir: &Path) -> Result<Vec<DirectoryEntry>, Error> {
    let read_dir = fs::read_dir(dir).map_err(|e| Error::io("list directory", dir, e))?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| Error::io("list directory", dir, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| Error::io("stat", &entry.path(), e))?;
        entries.push(DirectoryEntry {
            name: entry.file_name(),
            is_dir: file_type.is_dir(),
        });
    }

    trace!("Listed {} entries in {}", entries.len(), dir.display());
    Ok(entries)
}

pub fn find_entry<'a>(entries: &'a [DirectoryEntry], name: &OsStr) -> Option<&'a DirectoryEntry> {
    entries.iter().find(|entry| entry.name == name)
}
