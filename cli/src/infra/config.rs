//! Loads the provisioning file from disk.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::config::{RunConfig, validate_run_config};

/// Env var naming the provisioning file when `--file` is not given.
pub const CONFIG_ENV: &str = "PROVISIO_CONFIG";
/// File looked up in the working directory as a last resort.
pub const DEFAULT_CONFIG_FILE: &str = "provisio.yaml";

/// YAML provisioning file on disk.
#[derive(Debug, Clone, Default)]
pub struct YamlConfigStore {
    explicit: Option<PathBuf>,
}

impl YamlConfigStore {
    /// `explicit` (from `--file`) wins over `PROVISIO_CONFIG` and `./provisio.yaml`.
    #[must_use]
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self { explicit }
    }

    /// Path that `load` reads.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        if let Some(path) = &self.explicit {
            return path.clone();
        }
        if let Ok(val) = std::env::var(CONFIG_ENV)
            && !val.is_empty()
        {
            return PathBuf::from(val);
        }
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Read, parse and validate the provisioning file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, is not valid YAML for
    /// `RunConfig`, or fails validation.
    pub fn load(&self) -> Result<RunConfig> {
        let path = self.path();
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let config: RunConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", path.display()))?;
        validate_run_config(&config).with_context(|| format!("invalid {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            provisioner = %config.provisioner,
            "loaded provisioning file"
        );
        Ok(config)
    }
}
