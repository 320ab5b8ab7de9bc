use crate::config::descend;
use crate::digest::{self, HashedFile};
use crate::engine::Context;
use crate::error::Error;
use crate::listing::{find_entry, list_dir};
use crate::progress::{split_budget, Counter, Discrepancy, Tally};
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::trace;

/// Haystack comparison of `dirs[0]` (the source at this level) against every
/// other directory in `dirs`.
///
/// Only the source listing is enumerated: extra entries in the targets are
/// never reported. `budget` is split evenly across the source entries and
/// fully consumed by the time this returns. Counts are pushed to the shared
/// tracker as they happen; the returned tally covers this whole subtree.
pub fn compare_dir(
    ctx: &Context<'_>,
    budget: f64,
    dirs: &[PathBuf],
    depth: i32,
) -> Result<Tally, Error> {
    let mut tally = Tally::default();
    let Some((source_dir, target_dirs)) = dirs.split_first() else {
        ctx.progress.advance(budget);
        return Ok(tally);
    };

    let source_entries = list_dir(source_dir)?;
    let target_listings = target_dirs
        .iter()
        .map(|dir| list_dir(dir))
        .collect::<Result<Vec<_>, _>>()?;

    let (chunk, extra) = split_budget(budget, source_entries.len());

    for entry in &source_entries {
        let source_path = source_dir.join(&entry.name);
        ctx.progress.set_current_path(&source_path);

        if ctx.config.is_ignored(&source_path, entry) {
            trace!("Ignoring {}", source_path.display());
            ctx.count(&mut tally, Counter::Ignored);
            ctx.progress.advance(chunk);
            continue;
        }

        let mut candidates = Vec::with_capacity(dirs.len());
        candidates.push(source_path.clone());

        for (target_dir, target_entries) in target_dirs.iter().zip(&target_listings) {
            let target_path = target_dir.join(&entry.name);
            match find_entry(target_entries, &entry.name) {
                None => {
                    ctx.count(&mut tally, Counter::Missing);
                    ctx.report(Discrepancy::Missing { path: target_path });
                }
                Some(found) if found.is_dir != entry.is_dir => {
                    ctx.count(&mut tally, Counter::Mismatched);
                    ctx.report(Discrepancy::KindMismatch {
                        source: source_path.clone(),
                        target: target_path,
                        source_is_dir: entry.is_dir,
                    });
                }
                Some(_) => {
                    ctx.count(&mut tally, Counter::Matched);
                    candidates.push(target_path);
                }
            }
        }

        if entry.is_dir {
            match descend(depth) {
                Some(child_depth) if candidates.len() > 1 => {
                    let sub = compare_dir(ctx, chunk, &candidates, child_depth)?;
                    tally.merge(&sub);
                }
                _ => ctx.progress.advance(chunk),
            }
        } else {
            if ctx.config.compare_contents && candidates.len() > 1 {
                compare_contents(ctx, &mut tally, &candidates)?;
            }
            ctx.progress.advance(chunk);
        }
    }

    ctx.progress.advance(extra);
    ctx.progress.clear_current_path();
    Ok(tally)
}

/// Hashes every copy of one file at the same time and checks each target
/// copy against the source copy (`candidates[0]`).
fn compare_contents(
    ctx: &Context<'_>,
    tally: &mut Tally,
    candidates: &[PathBuf],
) -> Result<(), Error> {
    let hashed: Vec<HashedFile> = candidates
        .par_iter()
        .map(|path| digest::hash_file(path))
        .collect::<Result<_, _>>()?;

    let expected = hashed[0].digest;
    for (path, copy) in candidates.iter().zip(&hashed).skip(1) {
        if copy.digest != expected {
            ctx.uncount(tally, Counter::Matched);
            ctx.count(tally, Counter::Mismatched);
            ctx.report(Discrepancy::WrongHash {
                path: path.clone(),
                expected,
                actual: copy.digest,
            });
        }
    }

    let avg_mb_per_sec =
        hashed.iter().map(|h| h.mb_per_sec).sum::<f64>() / hashed.len() as f64;
    ctx.reporter.on_verified(&candidates[0], &expected, avg_mb_per_sec);
    Ok(())
}
