//! Domain types and validators for provisioning configuration.
//!
//! Pure functions only. No I/O and no async.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::domain::error::ConfigError;
use crate::domain::retry::RetrySettings;

// ── Constants ────────────────────────────────────────────────────────────────

/// Home directory used when a service leaves `homeDir` unset.
pub const DEFAULT_HOME_DIR: &str = "/home/ubuntu";
/// Remote directory receiving generated scripts.
pub const DEFAULT_SCRATCH_DIR: &str = "/tmp";
/// Upper bound for one remote command, in seconds.
pub const DEFAULT_EXEC_TIMEOUT_SECS: u64 = 3600;

// ── Provisioning file schema ─────────────────────────────────────────────────

/// Top-level provisioning file (`provisio.yaml`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    /// Registered provisioner name, e.g. `react-provisioner`.
    pub provisioner: String,
    /// Where commands run.
    pub target: TargetConfig,
    /// Retry policy for script execution.
    pub retry: RetrySettings,
    /// Timeout for each remote command.
    pub exec_timeout_secs: u64,
    /// Remote scratch directory for scripts.
    pub scratch_dir: String,
    /// Local directory for staged scripts and generated uploads. Defaults to
    /// the system temp dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging_dir: Option<PathBuf>,
    /// Build-generated data available as ``{{ build `Key` }}``.
    pub generated: BTreeMap<String, String>,
    /// Raw provisioner configuration, decoded by the provisioner's `prepare`.
    pub config: Value,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            provisioner: String::new(),
            target: TargetConfig::default(),
            retry: RetrySettings::default(),
            exec_timeout_secs: DEFAULT_EXEC_TIMEOUT_SECS,
            scratch_dir: DEFAULT_SCRATCH_DIR.to_string(),
            staging_dir: None,
            generated: BTreeMap::new(),
            config: Value::Mapping(Mapping::new()),
        }
    }
}

/// Remote target selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetConfig {
    /// A Multipass instance reached through the `multipass` CLI.
    Multipass { instance: String },
    /// The machine provisio runs on (container builds, CI runners).
    Local,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self::Multipass {
            instance: "builder".to_string(),
        }
    }
}

/// One configuration key a provisioner understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

impl FieldSpec {
    #[must_use]
    pub const fn required(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            required: true,
            description,
        }
    }

    #[must_use]
    pub const fn optional(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            required: false,
            description,
        }
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a decoded provisioning file.
///
/// # Errors
///
/// Returns an error naming the first invalid setting.
pub fn validate_run_config(cfg: &RunConfig) -> Result<()> {
    if cfg.provisioner.trim().is_empty() {
        anyhow::bail!("'provisioner' must name a registered provisioner");
    }
    if cfg.exec_timeout_secs == 0 {
        anyhow::bail!("'exec_timeout_secs' must be greater than zero");
    }
    if cfg.scratch_dir.trim().is_empty() {
        anyhow::bail!("'scratch_dir' must not be empty");
    }
    if let TargetConfig::Multipass { instance } = &cfg.target
        && instance.trim().is_empty()
    {
        anyhow::bail!("'target.instance' must name a Multipass instance");
    }
    Ok(())
}

/// Merge raw configuration mappings; later mappings override earlier keys.
///
/// # Errors
///
/// Returns `ConfigError::NotAMapping` if a raw value is neither a mapping nor null.
pub fn merge_raw(plugin: &str, raws: &[Value]) -> Result<Mapping, ConfigError> {
    let mut merged = Mapping::new();
    for raw in raws {
        match raw {
            Value::Null => {}
            Value::Mapping(map) => {
                for (k, v) in map {
                    merged.insert(k.clone(), v.clone());
                }
            }
            _ => {
                return Err(ConfigError::NotAMapping {
                    plugin: plugin.to_string(),
                });
            }
        }
    }
    Ok(merged)
}

/// Check that every required field is present and not an empty string.
///
/// # Errors
///
/// Returns `ConfigError::MissingField` for the first absent required field.
pub fn check_required(
    plugin: &str,
    fields: &[FieldSpec],
    map: &Mapping,
) -> Result<(), ConfigError> {
    for field in fields.iter().filter(|f| f.required) {
        let present = match map.get(field.name) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        };
        if !present {
            return Err(ConfigError::MissingField {
                plugin: plugin.to_string(),
                field: field.name.to_string(),
            });
        }
    }
    Ok(())
}

/// Home directory of the image: `DEFAULT_HOME_DIR` when unset, otherwise unchanged.
#[must_use]
pub fn resolve_home_dir(value: &str) -> String {
    if value.is_empty() {
        DEFAULT_HOME_DIR.to_string()
    } else {
        value.to_string()
    }
}

/// Decode standard-alphabet base64 carried in configuration field `field`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidBase64` when `encoded` is not valid base64.
pub fn decode_base64(field: &str, encoded: &str) -> Result<Vec<u8>, ConfigError> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|source| ConfigError::InvalidBase64 {
            field: field.to_string(),
            source,
        })
}

// ── Unit tests ───────────────────────────────────────────────────────────────
