use std::path::{Path, PathBuf};

use crate::env::FileEnv;
use crate::error::{JanitorError, Result};

/// A pending file operation: a source path and, for moves, copies and
/// creations, a target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    pub src_path: PathBuf,
    pub target_path: Option<PathBuf>,
}

impl FileSpec {
    pub fn new(src_path: impl Into<PathBuf>) -> Self {
        Self {
            src_path: src_path.into(),
            target_path: None,
        }
    }

    pub fn with_target(src_path: impl Into<PathBuf>, target_path: impl Into<PathBuf>) -> Self {
        Self {
            src_path: src_path.into(),
            target_path: Some(target_path.into()),
        }
    }

    pub fn target(&self) -> Result<&Path> {
        self.target_path.as_deref().ok_or_else(|| {
            JanitorError::File(format!("No target path for '{}'", self.src_path.display()))
        })
    }

    /// Whether the target already exists.
    pub fn exists(&self, fs: &dyn FileEnv) -> bool {
        self.target_path
            .as_deref()
            .map_or(false, |target| fs.exists(target))
    }

    /// Move the source to the target; afterwards the source path is the target.
    pub async fn move_file(&mut self, fs: &dyn FileEnv) -> Result<()> {
        let target = self.target()?.to_path_buf();
        self.ensure_dir(fs).await?;
        fs.rename(&self.src_path, &target).await?;
        self.src_path = target;
        Ok(())
    }

    /// Copy the source to the target and return a spec for the copy.
    pub async fn duplicate(&self, fs: &dyn FileEnv) -> Result<FileSpec> {
        let target = self.target()?;
        self.ensure_dir(fs).await?;
        fs.copy(&self.src_path, target).await?;
        Ok(FileSpec::new(target))
    }

    pub async fn remove(&self, fs: &dyn FileEnv) -> Result<()> {
        fs.remove(&self.src_path).await
    }

    /// Replace the target with an empty file or directory.
    pub async fn create(&self, fs: &dyn FileEnv, is_dir: bool) -> Result<FileSpec> {
        let target = self.target()?;
        fs.remove(target).await?;
        if is_dir {
            fs.ensure_dir(target).await?;
        } else {
            fs.create_file(target).await?;
        }
        Ok(FileSpec::new(target))
    }

    /// Create the directory the target lives in.
    pub async fn ensure_dir(&self, fs: &dyn FileEnv) -> Result<()> {
        match self.target()?.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs.ensure_dir(parent).await,
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEditor;

    #[tokio::test]
    async fn test_move_updates_source_path() {
        let editor = MockEditor::new();
        editor.add_file("src/a.js", "a");
        let mut spec = FileSpec::with_target(editor.path("src/a.js"), editor.path("lib/a.ts"));

        spec.move_file(&editor).await.unwrap();

        assert_eq!(spec.src_path, editor.path("lib/a.ts"));
        assert_eq!(editor.files(), vec!["lib/a.ts"]);
        assert!(editor.events().contains(&"mkdir:lib".to_string()));
    }

    #[tokio::test]
    async fn test_duplicate_returns_spec_for_copy() {
        let editor = MockEditor::new();
        editor.add_file("a.ts", "a");
        let spec = FileSpec::with_target(editor.path("a.ts"), editor.path("b.ts"));

        let copy = spec.duplicate(&editor).await.unwrap();

        assert_eq!(copy, FileSpec::new(editor.path("b.ts")));
        assert_eq!(spec.src_path, editor.path("a.ts"));
        assert_eq!(editor.file("b.ts"), Some("a".to_string()));
    }

    #[tokio::test]
    async fn test_create_replaces_existing_target() {
        let editor = MockEditor::new();
        editor.add_file("notes.md", "old");
        let spec = FileSpec::with_target(editor.path(""), editor.path("notes.md"));

        spec.create(&editor, false).await.unwrap();
        assert_eq!(editor.file("notes.md"), Some(String::new()));
    }

    #[tokio::test]
    async fn test_operations_without_target_fail() {
        let editor = MockEditor::new();
        editor.add_file("a.ts", "");
        let mut spec = FileSpec::new(editor.path("a.ts"));

        assert!(matches!(
            spec.move_file(&editor).await,
            Err(JanitorError::File(_))
        ));
        assert!(!spec.exists(&editor));
        spec.remove(&editor).await.unwrap();
        assert!(editor.files().is_empty());
    }
}
