use crate::digest::{self, Digest};
use crate::engine::Context;
use crate::error::Error;
use crate::progress::{Counter, Tally};
use crate::walk::walk_files;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Deletes every file under `dir` whose content was already seen earlier in
/// the walk. `seen` spans the whole walk so duplicates in sibling
/// directories are caught too.
///
/// Counters are repurposed: `matched` is a removed duplicate, `mismatched`
/// a first (kept) occurrence.
pub fn delete_dupes(
    ctx: &Context<'_>,
    budget: f64,
    dir: &Path,
    depth: i32,
    seen: &mut HashSet<Digest>,
) -> Result<Tally, Error> {
    info!("Deleting duplicate files under {}", dir.display());
    walk_files(ctx, budget, dir, depth, &mut |path: &Path, tally: &mut Tally| {
        let hashed = digest::hash_file(path)?;
        if seen.insert(hashed.digest) {
            ctx.count(tally, Counter::Mismatched);
            return Ok(());
        }

        fs::remove_file(path).map_err(|e| Error::io("remove", path, e))?;
        debug!("Removed duplicate {} ({})", path.display(), hashed.digest);
        ctx.count(tally, Counter::Matched);
        ctx.reporter.on_duplicate_removed(path, &hashed.digest);
        Ok(())
    })
}
