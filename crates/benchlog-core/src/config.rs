use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ExportConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_path")]
    pub path: PathBuf,
    /// Keep only the newest N records per suite in the chart data.
    #[serde(default)]
    pub max_items_in_chart: Option<usize>,
}

fn default_export_path() -> PathBuf {
    PathBuf::from(paths::DEFAULT_EXPORT_FILE)
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            path: default_export_path(),
            max_items_in_chart: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_project")]
    pub project: String,
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,
    #[serde(default)]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub export: ExportConfig,
}

fn default_version() -> u32 {
    1
}

fn default_project() -> String {
    "project".to_string()
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from(paths::DEFAULT_LEDGER_FILE)
}

impl Default for Config {
    fn default() -> Self {
        Self::new(default_project())
    }
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: project_name.into(),
            ledger_path: default_ledger_path(),
            repo_url: None,
            export: ExportConfig::default(),
        }
    }

    /// Load `.benchlog/config.yaml`; a missing file yields the defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn ledger_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.ledger_path)
    }

    pub fn export_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.export.path)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.ledger_path.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "ledger_path is empty".to_string(),
            });
        }

        if self.export.path.as_os_str().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "export.path is empty".to_string(),
            });
        }

        if self.export.max_items_in_chart == Some(0) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "export.max_items_in_chart is 0: exported suites will be empty"
                    .to_string(),
            });
        }

        if self.export.path.is_absolute() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "export.path '{}' is absolute and may point outside the project",
                    self.export.path.display()
                ),
            });
        }

        if let Some(url) = &self.repo_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("repo_url '{url}' is not an http(s) URL"),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
