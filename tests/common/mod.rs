//! Common test utilities and helpers

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use project_janitor::config::ConfigLoader;
use project_janitor::env::HostEnv;
use project_janitor::ProjectJanitor;

/// Test context builder for setting up workspace directories
pub struct TestContextBuilder {
    temp_dir: TempDir,
    settings: Option<String>,
    initial_files: Vec<(PathBuf, String)>,
}

impl TestContextBuilder {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
            settings: None,
            initial_files: Vec::new(),
        })
    }

    /// Write `janitor.toml` with the given contents
    pub fn with_settings(mut self, toml: &str) -> Self {
        self.settings = Some(toml.to_string());
        self
    }

    /// Add an initial file
    pub fn with_file(mut self, path: impl AsRef<Path>, content: &str) -> Self {
        self.initial_files
            .push((path.as_ref().to_path_buf(), content.to_string()));
        self
    }

    pub fn build(self) -> Result<TestContext> {
        let root = self.temp_dir.path();
        if let Some(settings) = &self.settings {
            fs::write(root.join("janitor.toml"), settings)?;
        }
        for (path, content) in &self.initial_files {
            let full = root.join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(full, content)?;
        }
        Ok(TestContext {
            temp_dir: self.temp_dir,
        })
    }
}

/// A workspace directory that lives as long as the test
pub struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path().join(relative)).unwrap_or_default()
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path().join(relative).exists()
    }

    /// A janitor over this workspace with the headless host
    pub async fn janitor(&self, assume_yes: bool) -> Result<ProjectJanitor> {
        let settings = ConfigLoader::load(None, self.path()).await?;
        let host = HostEnv::headless(self.path(), assume_yes);
        Ok(ProjectJanitor::new(host, Arc::new(settings)))
    }
}
