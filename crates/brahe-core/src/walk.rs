use crate::config::descend;
use crate::engine::Context;
use crate::error::Error;
use crate::listing::list_dir;
use crate::progress::{split_budget, Counter, Tally};
use std::path::Path;
use tracing::trace;

/// Single-tree depth-first walk used by the database and dedupe modes.
///
/// Applies the same ignore, depth and progress-budget rules as the tree
/// comparator and calls `visit` for every file. Directories are descended
/// synchronously, so a subtree is finished before its next sibling starts.
pub fn walk_files<F>(
    ctx: &Context<'_>,
    budget: f64,
    dir: &Path,
    depth: i32,
    visit: &mut F,
) -> Result<Tally, Error>
where
    F: FnMut(&Path, &mut Tally) -> Result<(), Error>,
{
    let entries = list_dir(dir)?;
    let (chunk, extra) = split_budget(budget, entries.len());
    let mut tally = Tally::default();

    for entry in &entries {
        let path = dir.join(&entry.name);
        ctx.progress.set_current_path(&path);

        if ctx.config.is_ignored(&path, entry) {
            trace!("Ignoring {}", path.display());
            ctx.count(&mut tally, Counter::Ignored);
            ctx.progress.advance(chunk);
            continue;
        }

        if entry.is_dir {
            match descend(depth) {
                Some(child_depth) => {
                    let sub = walk_files(ctx, chunk, &path, child_depth, visit)?;
                    tally.merge(&sub);
                }
                None => ctx.progress.advance(chunk),
            }
        } else {
            visit(&path, &mut tally)?;
            ctx.progress.advance(chunk);
        }
    }

    ctx.progress.advance(extra);
    ctx.progress.clear_current_path();
    Ok(tally)
}
