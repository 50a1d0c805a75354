//! Wildcard expansion and per-pair processing
//!
//! Source and target arguments may be glob patterns. Every expanded source is
//! copied into every expanded target as an independent unit of work: a failed
//! pair is recorded and the remaining pairs still run. Nothing is rolled back.

use std::path::{Path, PathBuf};

use glob::glob;
use log::debug;

use crate::error::{Error, Result};
use crate::mutator::NestedMutator;

/// Characters that make an argument a glob pattern.
const GLOB_CHARS: [char; 3] = ['*', '?', '['];

/// Whether `argument` contains glob syntax.
pub fn is_pattern(argument: &str) -> bool {
    argument.contains(GLOB_CHARS)
}

/// Expand a file argument into the files it names.
///
/// Plain paths are returned as-is so that a missing file is reported by the
/// copy itself. Patterns must match at least one regular file.
pub fn expand_pattern(argument: &str) -> Result<Vec<PathBuf>> {
    if !is_pattern(argument) {
        return Ok(vec![PathBuf::from(argument)]);
    }

    let mut matches: Vec<PathBuf> = glob(argument)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    matches.sort();

    debug!("Pattern '{}' matched {} files", argument, matches.len());
    if matches.is_empty() {
        return Err(Error::NoMatches {
            pattern: argument.to_string(),
        });
    }
    Ok(matches)
}

/// Result of copying one source into one target.
#[derive(Debug)]
pub struct PairOutcome {
    pub source: PathBuf,
    pub target: PathBuf,
    pub result: Result<()>,
}

impl PairOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Copy every source into every target at `target_path`.
///
/// Pairs run sequentially in source-major order. Each outcome is handed to
/// `report` as soon as it is known and collected into the returned list.
pub fn run_pairs<F>(
    mutator: &NestedMutator<'_>,
    sources: &[PathBuf],
    targets: &[PathBuf],
    target_path: &str,
    mut report: F,
) -> Vec<PairOutcome>
where
    F: FnMut(&PairOutcome),
{
    let mut outcomes = Vec::with_capacity(sources.len() * targets.len());

    for source in sources {
        for target in targets {
            let outcome = run_pair(mutator, source, target, target_path);
            report(&outcome);
            outcomes.push(outcome);
        }
    }

    outcomes
}

fn run_pair(
    mutator: &NestedMutator<'_>,
    source: &Path,
    target: &Path,
    target_path: &str,
) -> PairOutcome {
    debug!("Copying {} to {}", source.display(), target.display());
    PairOutcome {
        source: source.to_path_buf(),
        target: target.to_path_buf(),
        result: mutator.insert(source, target, target_path),
    }
}
