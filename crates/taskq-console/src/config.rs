/*
[INPUT]:  Built-in defaults, optional YAML file, TASKQ__* environment variables
[OUTPUT]: Parsed console configuration
[POS]:    Configuration layer - backend endpoint, polling cadence, form schemas
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use taskq_adapter::{ClientConfig, DEFAULT_BASE_URL, Priority};

use crate::registry::TaskTypeSchema;

pub const ENV_PREFIX: &str = "TASKQ";

/// Top-level configuration for the operator console
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub submission: SubmissionConfig,
    pub task_list: TaskListConfig,
    pub logging: LoggingConfig,
    /// Field descriptors added to (or replacing) the built-in task types
    pub task_types: Vec<TaskTypeSchema>,
}

/// Backend endpoint settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            connect_timeout_secs: 5,
        }
    }
}

/// Poll cadence for the live views, in milliseconds
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    pub metrics_interval_ms: u64,
    pub tasks_interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            metrics_interval_ms: 5000,
            tasks_interval_ms: 5000,
        }
    }
}

impl PollingConfig {
    pub fn metrics_interval(&self) -> Duration {
        Duration::from_millis(self.metrics_interval_ms.max(1))
    }

    pub fn tasks_interval(&self) -> Duration {
        Duration::from_millis(self.tasks_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SubmissionConfig {
    pub default_priority: Priority,
    pub max_retries: u32,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            default_priority: Priority::Medium,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TaskListConfig {
    pub page_size: u32,
    /// Characters of the task id shown before the truncation marker
    pub id_prefix_len: usize,
}

impl Default for TaskListConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            id_prefix_len: 16,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive used when RUST_LOG is not set
    pub level: String,
    /// Optional log file; written through a non-blocking appender
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl ConsoleConfig {
    /// Default config file location: `<config_dir>/taskq/console.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("taskq").join("console.yaml"))
    }

    /// Layer defaults, the YAML file (if it exists) and `TASKQ__SECTION__KEY` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Yaml)
                    .required(false),
            );
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .context("build configuration sources")?
            .try_deserialize::<Self>()
            .context("deserialize console configuration")?;
        Ok(config)
    }

    /// Load configuration from YAML file only
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content).context("parse YAML config")?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("failed to serialize config to YAML")
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url.clone(),
            timeout: Duration::from_secs(self.api.timeout_secs),
            connect_timeout: Duration::from_secs(self.api.connect_timeout_secs),
        }
    }
}
