use crate::engine::Context;
use crate::error::Error;
use crate::listing::list_dir;
use crate::progress::{split_budget, Counter, Discrepancy, Tally};
use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// A numbered file name sequence, written `PREFIX/WIDTH:BEGIN-END/SUFFIX`.
///
/// `IMG_/4:14-155/.JPG` expects `IMG_0014.JPG` through `IMG_0155.JPG`;
/// `/0:1-13/.txt` expects `1.txt` through `13.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapPattern {
    pub prefix: String,
    pub suffix: String,
    pub width: usize,
    pub begin: u64,
    pub end: u64,
}

impl GapPattern {
    pub fn file_name(&self, n: u64) -> String {
        format!(
            "{}{:0width$}{}",
            self.prefix,
            n,
            self.suffix,
            width = self.width
        )
    }

    /// How many names the sequence expects.
    pub fn expected_count(&self) -> u64 {
        (self.end - self.begin).saturating_add(1)
    }

    /// The sequence number `name` stands for, if it is exactly one of the
    /// expected names (padding included).
    pub fn number_of(&self, name: &str) -> Option<u64> {
        let digits = name
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(self.suffix.as_str())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let n = digits.parse::<u64>().ok()?;
        if n < self.begin || n > self.end || self.file_name(n) != name {
            return None;
        }
        Some(n)
    }
}

impl FromStr for GapPattern {
    type Err = Error;

    fn from_str(pattern: &str) -> Result<Self, Self::Err> {
        let pieces: Vec<&str> = pattern.split('/').collect();
        let [prefix, range, suffix] = pieces[..] else {
            return Err(Error::gap_pattern(pattern, "expected exactly two forward slashes"));
        };

        let (width, bounds) = range
            .split_once(':')
            .ok_or_else(|| Error::gap_pattern(pattern, "expected WIDTH:BEGIN-END"))?;
        let (begin, end) = bounds
            .split_once('-')
            .ok_or_else(|| Error::gap_pattern(pattern, "expected WIDTH:BEGIN-END"))?;

        let parse = |field: &str, value: &str| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|e| Error::gap_pattern(pattern, format!("bad {}: {}", field, e)))
        };
        let width = parse("width", width)? as usize;
        let begin = parse("begin", begin)?;
        let end = parse("end", end)?;
        if begin > end {
            return Err(Error::gap_pattern(pattern, "range begins after it ends"));
        }

        Ok(GapPattern {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            width,
            begin,
            end,
        })
    }
}

/// Reports, for each directory independently, which names of the sequence
/// are absent. Progress is split over the entries of all directories
/// together.
pub fn find_gaps(
    ctx: &Context<'_>,
    budget: f64,
    pattern: &GapPattern,
    dirs: &[PathBuf],
) -> Result<Tally, Error> {
    let listings = dirs
        .iter()
        .map(|dir| list_dir(dir))
        .collect::<Result<Vec<_>, _>>()?;
    let total_entries: usize = listings.iter().map(Vec::len).sum();
    let (chunk, extra) = split_budget(budget, total_entries);

    info!(
        "Looking for {} sequence names in {} directories",
        pattern.expected_count(),
        dirs.len()
    );

    let mut tally = Tally::default();
    for (dir, entries) in dirs.iter().zip(&listings) {
        ctx.progress.set_current_path(dir);

        let mut found = HashSet::new();
        for entry in entries {
            if !entry.is_dir {
                if let Some(n) = entry.name.to_str().and_then(|name| pattern.number_of(name)) {
                    found.insert(n);
                }
            }
            ctx.progress.advance(chunk);
        }

        for n in pattern.begin..=pattern.end {
            if found.contains(&n) {
                ctx.count(&mut tally, Counter::Matched);
            } else {
                ctx.count(&mut tally, Counter::Missing);
                ctx.report(Discrepancy::GapMissing {
                    dir: dir.clone(),
                    name: pattern.file_name(n),
                });
            }
        }
    }

    ctx.progress.advance(extra);
    ctx.progress.clear_current_path();
    Ok(tally)
}
