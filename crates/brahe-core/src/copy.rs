use crate::error::Error;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

/// Copies `src` to `dst` byte for byte, creating missing parent directories.
/// An existing `dst` is an error; nothing is overwritten.
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64, Error> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io("create directory", parent, e))?;
    }

    let mut input = File::open(src).map_err(|e| Error::io("open", src, e))?;
    let mut output = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dst)
        .map_err(|e| Error::io("create", dst, e))?;

    let copied = io::copy(&mut input, &mut output).map_err(|e| Error::io("copy", src, e))?;
    output.sync_all().map_err(|e| Error::io("sync", dst, e))?;
    Ok(copied)
}
