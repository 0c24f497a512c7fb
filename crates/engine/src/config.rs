//! Drive configuration via `kvdrive.toml`
//!
//! On first open, a default `kvdrive.toml` is created in the drive's
//! directory. To change settings, edit the file and restart.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use kvdrive_concurrency::{BatchConfig, WaitPolicy, DEFAULT_MAX_OPERATIONS_PER_BATCH};
use kvdrive_core::{Error, Limits, Result};

/// Config file name placed in the drive directory.
pub const CONFIG_FILE_NAME: &str = "kvdrive.toml";

/// Drive configuration loaded from `kvdrive.toml`.
///
/// # Example
///
/// ```toml
/// # "fail_fast" (default) or "block"
/// begin_policy = "block"
/// wait_timeout_ms = 5000
/// max_operations_per_batch = 100000
///
/// [limits]
/// max_key_size = 4096
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Behaviour of `begin` and foreign single-key writes while a batch is
    /// open: `"fail_fast"` or `"block"`.
    #[serde(default = "default_begin_policy")]
    pub begin_policy: String,
    /// Upper bound on a `"block"` wait; absent waits forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_timeout_ms: Option<u64>,
    /// Maximum operations one batch may stage.
    #[serde(default = "default_max_operations")]
    pub max_operations_per_batch: usize,
    /// Key, value and metadata size limits.
    #[serde(default)]
    pub limits: Limits,
}

fn default_begin_policy() -> String {
    "fail_fast".to_string()
}

fn default_max_operations() -> usize {
    DEFAULT_MAX_OPERATIONS_PER_BATCH
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            begin_policy: default_begin_policy(),
            wait_timeout_ms: None,
            max_operations_per_batch: default_max_operations(),
            limits: Limits::default(),
        }
    }
}

impl DriveConfig {
    /// Parse the begin policy into a `WaitPolicy`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `"fail_fast"` or `"block"`.
    pub fn wait_policy(&self) -> Result<WaitPolicy> {
        match self.begin_policy.as_str() {
            "fail_fast" => Ok(WaitPolicy::FailFast),
            "block" => Ok(WaitPolicy::Block {
                timeout: self.wait_timeout_ms.map(Duration::from_millis),
            }),
            other => Err(Error::config(format!(
                "Invalid begin_policy '{}' in {}. Expected \"fail_fast\" or \"block\".",
                other, CONFIG_FILE_NAME
            ))),
        }
    }

    /// Check every field.
    pub fn validate(&self) -> Result<()> {
        self.wait_policy()?;
        if self.max_operations_per_batch == 0 {
            return Err(Error::config("max_operations_per_batch must be at least 1"));
        }
        let limits = &self.limits;
        for (name, value) in [
            ("max_key_size", limits.max_key_size),
            ("max_value_size", limits.max_value_size),
            ("max_version_size", limits.max_version_size),
            ("max_tag_size", limits.max_tag_size),
        ] {
            if value == 0 {
                return Err(Error::config(format!("limits.{} must be at least 1", name)));
            }
        }
        Ok(())
    }

    /// Engine configuration derived from this file.
    pub fn batch_config(&self) -> Result<BatchConfig> {
        self.validate()?;
        Ok(BatchConfig {
            wait_policy: self.wait_policy()?,
            max_operations_per_batch: self.max_operations_per_batch,
            limits: self.limits.clone(),
        })
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# kvdrive configuration
#
# What begin and single-key writes do while another connection has a batch
# open: "fail_fast" (default) or "block"
#   "fail_fast" = reject with a conflict; the client retries later
#   "block"     = wait until the batch commits or aborts
begin_policy = "fail_fast"

# Upper bound on a "block" wait in milliseconds. Omit to wait forever.
# wait_timeout_ms = 5000

# Maximum operations a single batch may stage.
max_operations_per_batch = 100000

[limits]
max_key_size = 4096
max_value_size = 1048576
max_version_size = 2048
max_tag_size = 128
"#
    }

    /// Parse and validate config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: DriveConfig = toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_toml_str(&content).map_err(|e| {
            Error::config(format!("Invalid config file '{}': {}", path.display(), e))
        })?;
        tracing::debug!(target: "kvdrive::config", path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
            tracing::info!(target: "kvdrive::config", path = %path.display(), "Default config written");
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
