//! Janitor configuration
//!
//! Settings are read once per workflow run into a [`JanitorConfig`]. Defaults
//! are applied and every pattern is compiled at load time, so a malformed
//! rename rule or command target fails the run before anything is touched.

use glob::{MatchOptions, Pattern};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub mod loader;
mod settings;


pub use loader::{ConfigLoader, FileSettings};
pub use settings::{MemorySettings, Settings, SettingsReader};

use crate::error::{JanitorError, Result};

/// Settings section all keys live under.
pub const CONFIG_SECTION: &str = "janitor";

pub const DEFAULT_COMMAND: &str = "editor.action.formatDocument";
pub const DEFAULT_INCLUDE_PATTERN: &str = "src/**/*.ts";
pub const DEFAULT_EXCLUDE_PATTERN: &str = "**/node_modules/**/*";

/// An editor command, optionally restricted to paths matching a regex.
///
/// Written in settings as `command` or `command@<regex>`.
#[derive(Debug, Clone)]
pub struct CleanUpCommand {
    command: String,
    target: Option<Regex>,
}

impl CleanUpCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            target: None,
        }
    }

    pub fn parse(spec: &str) -> Result<Self> {
        match spec.split_once('@') {
            Some((command, target)) => {
                let command = command.trim();
                if command.is_empty() {
                    return Err(JanitorError::Config(format!(
                        "Command entry '{spec}' has no command id"
                    )));
                }
                let target =
                    Regex::new(target).map_err(|e| JanitorError::pattern(target, e))?;
                Ok(Self {
                    command: command.to_string(),
                    target: Some(target),
                })
            }
            None => Ok(Self::new(spec.trim())),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn target(&self) -> Option<&Regex> {
        self.target.as_ref()
    }

    /// A command without a target applies to every file.
    pub fn applies_to(&self, relative_path: &str) -> bool {
        self.target
            .as_ref()
            .map_or(true, |target| target.is_match(relative_path))
    }
}

/// A rename rule as written in settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRuleSpec {
    #[serde(rename = "match")]
    pub pattern: String,
    pub rename: String,
}

/// A compiled rename rule.
#[derive(Debug, Clone)]
pub struct RenameRule {
    pattern: Regex,
    template: String,
    rename: String,
}

impl RenameRule {
    pub fn new(pattern: &str, rename: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| JanitorError::pattern(pattern, e))?;
        let template = convert_template(rename, &regex);
        Ok(Self {
            pattern: regex,
            template,
            rename: rename.to_string(),
        })
    }

    pub fn from_spec(spec: &RenameRuleSpec) -> Result<Self> {
        Self::new(&spec.pattern, &spec.rename)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn rename(&self) -> &str {
        &self.rename
    }

    pub fn is_match(&self, relative_path: &str) -> bool {
        self.pattern.is_match(relative_path)
    }

    /// Rewrite the first match in `relative_path`, or `None` when the rule does not match.
    pub fn apply(&self, relative_path: &str) -> Option<String> {
        if !self.is_match(relative_path) {
            return None;
        }
        Some(
            self.pattern
                .replace(relative_path, self.template.as_str())
                .into_owned(),
        )
    }
}

/// Convert a `$1` / `$&` / `$$` style replacement into the regex crate's syntax.
///
/// Two-digit group references are only taken when that group exists, so
/// `$10` with a single group reads as group 1 followed by `0`. `$<name>` stays
/// literal when `regex` has no named groups.
fn convert_template(template: &str, regex: &Regex) -> String {
    let captures_len = regex.captures_len();
    let has_names = regex.capture_names().any(|name| name.is_some());
    let chars: Vec<char> = template.chars().collect();
    let mut out = String::with_capacity(template.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c != '$' {
            out.push(c);
            i += 1;
            continue;
        }

        match chars.get(i + 1) {
            Some('$') => {
                out.push_str("$$");
                i += 2;
            }
            Some('&') => {
                out.push_str("${0}");
                i += 2;
            }
            Some(d) if d.is_ascii_digit() && *d != '0' => {
                let first = d.to_digit(10).unwrap_or(0) as usize;
                let two = chars
                    .get(i + 2)
                    .and_then(|n| n.to_digit(10))
                    .map(|n| first * 10 + n as usize)
                    .filter(|group| *group < captures_len);
                match two {
                    Some(group) => {
                        out.push_str(&format!("${{{group}}}"));
                        i += 3;
                    }
                    None if first < captures_len => {
                        out.push_str(&format!("${{{first}}}"));
                        i += 2;
                    }
                    None => {
                        out.push_str("$$");
                        i += 1;
                    }
                }
            }
            Some('<') if has_names => match chars[i + 2..].iter().position(|c| *c == '>') {
                Some(end) => {
                    let name: String = chars[i + 2..i + 2 + end].iter().collect();
                    out.push_str(&format!("${{{name}}}"));
                    i += end + 3;
                }
                None => {
                    out.push_str("$$");
                    i += 1;
                }
            },
            _ => {
                out.push_str("$$");
                i += 1;
            }
        }
    }

    out
}

/// A set of glob patterns treated as one pattern expression.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<String>,
    compiled: Vec<Pattern>,
}

impl PatternSet {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let compiled = patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|source| JanitorError::Glob {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns, compiled })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The patterns joined into a single `{a,b}` alternation.
    pub fn expression(&self) -> String {
        match self.patterns.as_slice() {
            [] => String::new(),
            [single] => single.clone(),
            many => format!("{{{}}}", many.join(",")),
        }
    }

    /// Whether any pattern matches a workspace-relative, `/`-separated path.
    pub fn matches(&self, relative_path: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        self.compiled
            .iter()
            .any(|pattern| pattern.matches_with(relative_path, options))
    }
}

/// Everything one workflow run needs from settings.
#[derive(Debug, Clone)]
pub struct JanitorConfig {
    pub commands: Vec<CleanUpCommand>,
    pub include: PatternSet,
    pub exclude: PatternSet,
    pub skip_confirmation: bool,
    pub rename_rules: Vec<RenameRule>,
    pub show_diff: bool,
    pub close_after_cleanup: bool,
}

impl JanitorConfig {
    pub fn from_settings(settings: &dyn Settings) -> Result<Self> {
        let reader = SettingsReader::new(settings);

        let commands = reader
            .get_or("commands", vec![DEFAULT_COMMAND.to_string()])?
            .iter()
            .map(|spec| CleanUpCommand::parse(spec))
            .collect::<Result<Vec<_>>>()?;

        let include = PatternSet::new(
            reader.get_or("includePattern", vec![DEFAULT_INCLUDE_PATTERN.to_string()])?,
        )?;
        let exclude = PatternSet::new(
            reader.get_or("excludePattern", vec![DEFAULT_EXCLUDE_PATTERN.to_string()])?,
        )?;

        let rename_rules = reader
            .get_or::<Vec<RenameRuleSpec>>("fileRenameRules", Vec::new())?
            .iter()
            .map(RenameRule::from_spec)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            commands,
            include,
            exclude,
            skip_confirmation: reader.get_or("skipConfirmation", false)?,
            rename_rules,
            show_diff: reader.get_or("showDiff", false)?,
            close_after_cleanup: reader.get_or("closeAfterCleanup", true)?,
        })
    }

    /// Command ids that apply to `relative_path`, in configured order.
    pub fn commands_for(&self, relative_path: &str) -> Vec<&str> {
        self.commands
            .iter()
            .filter(|c| c.applies_to(relative_path))
            .map(CleanUpCommand::command)
            .collect()
    }
}
