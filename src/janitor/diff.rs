//! Line-level text diff

use similar::{capture_diff_slices_deadline, Algorithm, DiffTag};
use std::fmt;
use std::ops::Range;
use std::time::{Duration, Instant};

/// Time allowed for finding a minimal diff.
pub const DIFF_DEADLINE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    Added(String),
    Removed(String),
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffLine::Added(line) => write!(f, "+{line}"),
            DiffLine::Removed(line) => write!(f, "-{line}"),
        }
    }
}

/// Changed lines between two texts, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineDiff {
    pub lines: Vec<DiffLine>,
}

impl LineDiff {
    /// Diff `before` against `after` line by line with Myers' algorithm.
    ///
    /// Runs in linear space. Past [`DIFF_DEADLINE`] the result is still a
    /// valid diff but may not be minimal.
    pub fn compute(before: &str, after: &str) -> Self {
        let old: Vec<&str> = before.lines().collect();
        let new: Vec<&str> = after.lines().collect();

        let mut lines = Vec::new();
        for (old_range, new_range) in changes(&old, &new) {
            lines.extend(old[old_range].iter().map(|l| DiffLine::Removed(l.to_string())));
            lines.extend(new[new_range].iter().map(|l| DiffLine::Added(l.to_string())));
        }
        Self { lines }
    }

    /// `(added, removed)` line counts without collecting the lines.
    pub fn count(before: &str, after: &str) -> (usize, usize) {
        let old: Vec<&str> = before.lines().collect();
        let new: Vec<&str> = after.lines().collect();
        changes(&old, &new).fold((0, 0), |(added, removed), (old_range, new_range)| {
            (added + new_range.len(), removed + old_range.len())
        })
    }

    pub fn added(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, DiffLine::Added(_)))
            .count()
    }

    pub fn removed(&self) -> usize {
        self.lines.len() - self.added()
    }

    /// Whether the texts differ line by line. Texts that only differ in a
    /// trailing newline compare equal here.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Old and new line ranges of every non-equal hunk.
fn changes(old: &[&str], new: &[&str]) -> impl Iterator<Item = (Range<usize>, Range<usize>)> {
    let deadline = Instant::now() + DIFF_DEADLINE;
    capture_diff_slices_deadline(Algorithm::Myers, old, new, Some(deadline))
        .into_iter()
        .map(|op| op.as_tag_tuple())
        .filter(|(tag, _, _)| *tag != DiffTag::Equal)
        .map(|(_, old_range, new_range)| (old_range, new_range))
}
