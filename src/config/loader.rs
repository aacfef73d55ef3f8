use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{Settings, CONFIG_SECTION};
use crate::error::{JanitorError, Result};

/// Files searched, in order, when no settings file is given explicitly.
pub const SETTINGS_CANDIDATES: [&str; 3] = ["janitor.toml", ".janitor.toml", ".vscode/settings.json"];

/// Environment variables that override boolean settings after file load.
const ENV_OVERRIDES: [(&str, &str); 3] = [
    ("JANITOR_SKIP_CONFIRMATION", "skipConfirmation"),
    ("JANITOR_SHOW_DIFF", "showDiff"),
    ("JANITOR_CLOSE_AFTER_CLEANUP", "closeAfterCleanup"),
];

/// Settings loaded from a TOML or JSON file.
#[derive(Debug, Clone, Default)]
pub struct FileSettings {
    values: Map<String, Value>,
    source: Option<PathBuf>,
}

impl FileSettings {
    pub fn empty() -> Self {
        Self::default()
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let mut settings = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content)?,
            Some("toml") => Self::from_toml_str(&content)?,
            _ => {
                return Err(JanitorError::Config(format!(
                    "Unsupported settings file: {}",
                    path.display()
                )))
            }
        };
        settings.source = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Parse TOML, using the `[janitor]` table when present and the top level otherwise.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(content)?;
        let value = match table.get(CONFIG_SECTION) {
            Some(toml::Value::Table(section)) => serde_json::to_value(section)?,
            _ => serde_json::to_value(&table)?,
        };
        Ok(Self {
            values: into_object(value),
            source: None,
        })
    }

    /// Parse editor-style JSON settings: either a `"janitor"` object or
    /// flat `"janitor.<key>"` entries.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let root = into_object(serde_json::from_str(content)?);

        let values = match root.get(CONFIG_SECTION) {
            Some(Value::Object(section)) => section.clone(),
            _ => {
                let prefix = format!("{CONFIG_SECTION}.");
                root.into_iter()
                    .filter_map(|(key, value)| {
                        key.strip_prefix(&prefix).map(|k| (k.to_string(), value))
                    })
                    .collect()
            }
        };

        Ok(Self {
            values,
            source: None,
        })
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn merge_env_vars(&mut self) {
        let vars = ENV_OVERRIDES
            .iter()
            .filter_map(|(var, _)| std::env::var(var).ok().map(|value| (*var, value)));
        self.merge_overrides(vars);
    }

    fn merge_overrides<'a>(&mut self, vars: impl IntoIterator<Item = (&'a str, String)>) {
        for (var, value) in vars {
            let Some((_, key)) = ENV_OVERRIDES.iter().find(|(name, _)| *name == var) else {
                continue;
            };
            match value.trim().parse::<bool>() {
                Ok(flag) => {
                    self.values.insert((*key).to_string(), Value::Bool(flag));
                }
                Err(_) => tracing::warn!("Ignoring {var}={value}: expected true or false"),
            }
        }
    }
}

impl Settings for FileSettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load `explicit` if given, otherwise the first settings file found under `root`.
    /// Environment overrides are applied either way.
    pub async fn load(explicit: Option<&Path>, root: &Path) -> Result<FileSettings> {
        let mut settings = match explicit {
            Some(path) => FileSettings::load(path).await?,
            None => Self::discover(root).await?,
        };
        settings.merge_env_vars();

        match settings.source() {
            Some(path) => tracing::debug!("Loaded settings from {}", path.display()),
            None => tracing::debug!("No settings file found, using defaults"),
        }
        Ok(settings)
    }

    pub async fn discover(root: &Path) -> Result<FileSettings> {
        for candidate in SETTINGS_CANDIDATES {
            let path = root.join(candidate);
            if fs::try_exists(&path).await.unwrap_or(false) {
                return FileSettings::load(&path).await;
            }
        }
        Ok(FileSettings::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_toml_section_table() {
        let settings = FileSettings::from_toml_str(
            r#"
[janitor]
commands = ["editor.action.trimTrailingWhitespace"]
skipConfirmation = true
"#,
        )
        .unwrap();

        assert_eq!(
            settings.get("commands"),
            Some(json!(["editor.action.trimTrailingWhitespace"]))
        );
        assert_eq!(settings.get("skipConfirmation"), Some(json!(true)));
    }

    #[test]
    fn test_toml_top_level_keys() {
        let settings = FileSettings::from_toml_str("showDiff = true\n").unwrap();
        assert_eq!(settings.get("showDiff"), Some(json!(true)));
    }

    #[test]
    fn test_json_flat_keys() {
        let settings = FileSettings::from_json_str(
            r#"{
                "editor.tabSize": 2,
                "janitor.includePattern": ["src/**/*.rs"],
                "janitor.fileRenameRules": [{ "match": "^(.*)\\.js$", "rename": "$1.ts" }]
            }"#,
        )
        .unwrap();

        assert_eq!(settings.get("includePattern"), Some(json!(["src/**/*.rs"])));
        assert_eq!(settings.get("tabSize"), None);
        assert!(settings.get("fileRenameRules").is_some());
    }

    #[test]
    fn test_json_section_object() {
        let settings =
            FileSettings::from_json_str(r#"{ "janitor": { "closeAfterCleanup": false } }"#)
                .unwrap();
        assert_eq!(settings.get("closeAfterCleanup"), Some(json!(false)));
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut settings = FileSettings::from_toml_str("skipConfirmation = false\n").unwrap();
        settings.merge_overrides([
            ("JANITOR_SKIP_CONFIRMATION", "true".to_string()),
            ("JANITOR_SHOW_DIFF", "maybe".to_string()),
            ("UNRELATED", "true".to_string()),
        ]);

        assert_eq!(settings.get("skipConfirmation"), Some(json!(true)));
        assert_eq!(settings.get("showDiff"), None);
    }

    #[tokio::test]
    async fn test_discover_prefers_janitor_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".vscode")).unwrap();
        std::fs::write(
            dir.path().join(".vscode/settings.json"),
            r#"{ "janitor.showDiff": false }"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("janitor.toml"), "showDiff = true\n").unwrap();

        let settings = ConfigLoader::discover(dir.path()).await.unwrap();
        assert_eq!(settings.get("showDiff"), Some(json!(true)));
        assert_eq!(settings.source(), Some(dir.path().join("janitor.toml").as_path()));
    }

    #[tokio::test]
    async fn test_discover_without_files_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let settings = ConfigLoader::discover(dir.path()).await.unwrap();
        assert!(settings.source().is_none());
        assert_eq!(settings.get("commands"), None);
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.ini");
        std::fs::write(&path, "x=1").unwrap();
        assert!(matches!(
            FileSettings::load(&path).await,
            Err(JanitorError::Config(_))
        ));
    }
}
