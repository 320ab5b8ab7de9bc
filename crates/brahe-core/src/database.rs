//! Content-addressed store of file digests.
//!
//! Layout: `<dir>/BraheDB/<first byte hex>/<remaining 31 bytes hex>`, where
//! each entry file lists, one per line, the absolute paths that produced that
//! digest. Entry files are append-only and never list a path twice.

use crate::copy;
use crate::digest::{self, Digest};
use crate::engine::Context;
use crate::error::Error;
use crate::progress::{Counter, Discrepancy, Tally};
use crate::walk::walk_files;
use std::borrow::Cow;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DATABASE_DIR_NAME: &str = "BraheDB";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    Added,
    AlreadyPresent,
}

pub fn db_root(dir: &Path) -> PathBuf {
    dir.join(DATABASE_DIR_NAME)
}

/// Creates the database root if needed. Safe to call on an existing database.
pub fn initialize(root: &Path) -> Result<(), Error> {
    match fs::create_dir(root) {
        Ok(()) => {
            info!("Created hash database at {}", root.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => verify_exists(root),
        Err(e) => Err(Error::io("create directory", root, e)),
    }
}

pub fn verify_exists(root: &Path) -> Result<(), Error> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(Error::NotADirectory(root.to_path_buf())),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::DatabaseMissing(root.to_path_buf())),
        Err(e) => Err(Error::io("stat", root, e)),
    }
}

fn entry_path(root: &Path, digest: &Digest) -> (PathBuf, PathBuf) {
    let (shard, rest) = digest.shard_parts();
    let shard_dir = root.join(shard);
    let file = shard_dir.join(rest);
    (shard_dir, file)
}

/// Appends `origin` to the entry file for `digest` unless it is already
/// listed there.
pub fn record_entry(root: &Path, digest: &Digest, origin: &Path) -> Result<Recorded, Error> {
    let (shard_dir, entry_file) = entry_path(root, digest);
    match fs::create_dir(&shard_dir) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
        Err(e) => return Err(Error::io("create directory", &shard_dir, e)),
    }

    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(&entry_file)
        .map_err(|e| Error::io("open", &entry_file, e))?;

    let mut existing = Vec::new();
    file.read_to_end(&mut existing)
        .map_err(|e| Error::io("read", &entry_file, e))?;

    let origin_line = path_bytes(origin);
    if existing
        .split(|b| *b == b'\n')
        .any(|line| line == &*origin_line)
    {
        return Ok(Recorded::AlreadyPresent);
    }

    let mut record = origin_line.into_owned();
    record.push(b'\n');
    file.write_all(&record)
        .map_err(|e| Error::io("write", &entry_file, e))?;
    Ok(Recorded::Added)
}

/// Entry lines hold the raw bytes of the path, so names that are not valid
/// UTF-8 stay distinct.
#[cfg(unix)]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    match path.to_string_lossy() {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    }
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

/// Membership test. Only the presence of the entry file matters.
pub fn has_entry(root: &Path, digest: &Digest) -> Result<bool, Error> {
    let (_, entry_file) = entry_path(root, digest);
    match fs::metadata(&entry_file) {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io("stat", &entry_file, e)),
    }
}

/// Paths recorded for `digest`, in insertion order. Empty when absent.
pub fn read_entry(root: &Path, digest: &Digest) -> Result<Vec<PathBuf>, Error> {
    let (_, entry_file) = entry_path(root, digest);
    match fs::read(&entry_file) {
        Ok(contents) => Ok(contents
            .split(|b| *b == b'\n')
            .filter(|line| !line.is_empty())
            .map(path_from_bytes)
            .collect()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(Error::io("read", &entry_file, e)),
    }
}

/// Records every file under `source_dir` into the database at `db_root`.
/// Re-adds of a known path count as matched, new writes as copied.
pub fn build_walk(
    ctx: &Context<'_>,
    db_root: &Path,
    budget: f64,
    source_dir: &Path,
    depth: i32,
) -> Result<Tally, Error> {
    info!(
        "Building hash database {} from {}",
        db_root.display(),
        source_dir.display()
    );
    walk_files(ctx, budget, source_dir, depth, &mut |path: &Path, tally: &mut Tally| {
        let hashed = digest::hash_file(path)?;
        match record_entry(db_root, &hashed.digest, path)? {
            Recorded::Added => {
                debug!("Recorded {} {}", hashed.digest, path.display());
                ctx.count(tally, Counter::Copied);
            }
            Recorded::AlreadyPresent => ctx.count(tally, Counter::Matched),
        }
        Ok(())
    })
}

/// Checks every file under `target_dir` against the database at `db_root`.
/// Files whose content is unknown are copied under `copy_to` when given,
/// otherwise reported.
pub fn check_walk(
    ctx: &Context<'_>,
    db_root: &Path,
    budget: f64,
    target_dir: &Path,
    depth: i32,
    copy_to: Option<&Path>,
) -> Result<Tally, Error> {
    info!(
        "Checking {} against hash database {}",
        target_dir.display(),
        db_root.display()
    );
    walk_files(ctx, budget, target_dir, depth, &mut |path: &Path, tally: &mut Tally| {
        let hashed = digest::hash_file(path)?;
        if has_entry(db_root, &hashed.digest)? {
            ctx.count(tally, Counter::Matched);
            return Ok(());
        }

        match copy_to {
            Some(dest) => {
                let relative = relative_to_entries(&ctx.config.entries, path)?;
                let destination = dest.join(relative);
                copy::copy_file(path, &destination)?;
                ctx.count(tally, Counter::Copied);
                ctx.reporter.on_copied(path, &destination);
            }
            None => {
                ctx.count(tally, Counter::Missing);
                ctx.report(Discrepancy::NotInDatabase {
                    path: path.to_path_buf(),
                });
            }
        }
        Ok(())
    })
}

/// Strips the deepest configured entry that contains `path`.
fn relative_to_entries<'p>(entries: &[PathBuf], path: &'p Path) -> Result<&'p Path, Error> {
    entries
        .iter()
        .filter_map(|entry| path.strip_prefix(entry).ok())
        .min_by_key(|relative| relative.components().count())
        .ok_or_else(|| Error::Unrooted(path.to_path_buf()))
}
