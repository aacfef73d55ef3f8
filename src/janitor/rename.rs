use std::cmp::Ordering;
use std::fmt;

use crate::config::RenameRule;

/// A planned rename between two workspace-relative paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRename {
    pub from: String,
    pub to: String,
}

impl FileRename {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for FileRename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Test every rule, in declared order, against every path.
///
/// Each match yields one rename, so a path matched by two rules is planned
/// twice.
pub fn plan_renames<'a, I>(paths: I, rules: &[RenameRule]) -> Vec<FileRename>
where
    I: IntoIterator<Item = &'a str>,
{
    paths
        .into_iter()
        .flat_map(move |path| {
            rules
                .iter()
                .filter_map(move |rule| rule.apply(path).map(|to| FileRename::new(path, to)))
        })
        .collect()
}

/// Order paths case-insensitively, lower case first on ties.
pub fn compare_paths(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}
