//! Configuration loading and management
//!
//! Handles parsing of `config.toml` in the data directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::storage::FileStore;
use crate::template;

/// File name of the configuration inside the data directory
pub const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Task tree configuration
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Project creation defaults
    #[serde(default)]
    pub projects: ProjectsConfig,
}

/// Storage-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory; platform default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// How long a write waits for the directory lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Tasks configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Report unknown task ids as errors instead of ignoring them
    #[serde(default)]
    pub strict: bool,
}

/// Project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectsConfig {
    /// Template used by `ct project new` without `--template`
    #[serde(default = "default_template")]
    pub default_template: String,
}

fn default_template() -> String {
    template::BLANK_PROJECT_ID.to_string()
}

impl Default for ProjectsConfig {
    fn default() -> Self {
        Self {
            default_template: default_template(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, or return defaults
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), error = %err, "ignoring invalid config");
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Data directory: explicit override, then `storage.dir`, then the platform default
    pub fn data_dir(&self, override_dir: Option<&Path>) -> PathBuf {
        override_dir
            .map(Path::to_path_buf)
            .or_else(|| self.storage.dir.clone())
            .unwrap_or_else(FileStore::default_dir)
    }

    fn validate(&self) -> crate::error::Result<()> {
        self.storage.validate()?;
        self.projects.validate()?;
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> crate::error::Result<()> {
        if self.lock_timeout_ms == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        if let Some(dir) = &self.dir {
            if dir.as_os_str().is_empty() {
                return Err(crate::error::Error::InvalidConfig(
                    "storage.dir cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl ProjectsConfig {
    fn validate(&self) -> crate::error::Result<()> {
        let id = self.default_template.trim();
        if template::template_by_id(id).is_none() {
            return Err(crate::error::Error::InvalidConfig(format!(
                "projects.default_template '{id}' is not a known template"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.storage.dir, None);
        assert_eq!(cfg.storage.lock_timeout_ms, 5000);
        assert!(!cfg.tasks.strict);
        assert_eq!(cfg.projects.default_template, "blank-project");
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        let content = r#"
[storage]
dir = "/var/lib/creator"
lock_timeout_ms = 250

[tasks]
strict = true

[projects]
default_template = "tc-long-form"
"#;
        fs::write(&path, content.trim()).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.storage.dir, Some(PathBuf::from("/var/lib/creator")));
        assert_eq!(cfg.storage.lock_timeout_ms, 250);
        assert!(cfg.tasks.strict);
        assert_eq!(cfg.projects.default_template, "tc-long-form");
    }

    #[test]
    fn unknown_default_template_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[projects]\ndefault_template = \"vlog\"").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            crate::error::Error::InvalidConfig(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_lock_timeout_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[storage]\nlock_timeout_ms = 0").expect("write config");

        assert!(matches!(
            Config::load(&path),
            Err(crate::error::Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn load_or_default_handles_missing_and_invalid() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        assert!(!Config::load_or_default(&path).tasks.strict);

        fs::write(&path, "not = [valid").expect("write config");
        let cfg = Config::load_or_default(&path);
        assert_eq!(cfg.projects.default_template, "blank-project");
    }

    #[test]
    fn data_dir_prefers_override_then_config() {
        let mut cfg = Config::default();
        cfg.storage.dir = Some(PathBuf::from("/from/config"));
        assert_eq!(
            cfg.data_dir(Some(Path::new("/from/flag"))),
            PathBuf::from("/from/flag")
        );
        assert_eq!(cfg.data_dir(None), PathBuf::from("/from/config"));
    }

    #[test]
    fn save_writes_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.toml");
        let cfg = Config::default();
        cfg.save(&path).expect("save config");

        let written = fs::read_to_string(&path).expect("read config");
        assert!(written.contains("lock_timeout_ms = 5000"));
        assert!(written.contains("default_template = \"blank-project\""));
    }
}
