//! Line diffs and change summaries.

mod ndiff;
mod summary;

pub use ndiff::{ndiff, ndiff_lines, SIMILARITY_CUTOFF};
pub use summary::summarize;

/// Counts of `+ `, `- ` and `? ` lines in an ndiff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffCounts {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

impl DiffCounts {
    pub fn from_diff<S: AsRef<str>>(diff: &[S]) -> Self {
        diff.iter()
            .map(AsRef::as_ref)
            .fold(Self::default(), |mut counts, line| {
                if line.starts_with("+ ") {
                    counts.added += 1;
                } else if line.starts_with("- ") {
                    counts.removed += 1;
                } else if line.starts_with("? ") {
                    counts.modified += 1;
                }
                counts
            })
    }
}
