//! Service flow definitions.
//!
//! Each service is a `ServiceDefinition`: a name, the configuration keys it
//! understands, a typed `camelCase` config and a function producing its
//! `ServicePlan`. `ServiceProvisioner<S>` turns any definition into a
//! `Provisioner` that the registry hands out by name.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_yaml::Value;

use crate::domain::config::{check_required, merge_raw};
use crate::domain::{ConfigError, FieldSpec, ServicePlan};

pub mod common;
pub mod file;
pub mod kong;
pub mod mailserver;
pub mod nexus;
pub mod react;
pub mod registry;
pub mod shell;
pub mod ssl;
pub mod templates;
pub mod webservice;

/// A configured service that can describe its provisioning plan.
pub trait Provisioner {
    /// Registered name, e.g. `react-provisioner`.
    fn name(&self) -> &'static str;

    /// Configuration keys this provisioner understands.
    fn config_spec(&self) -> &'static [FieldSpec];

    /// Merge `raws` (later keys win), check required keys and decode.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` describing the first invalid input.
    fn prepare(&mut self, raws: &[Value]) -> Result<(), ConfigError>;

    /// Ordered flows for the prepared configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configuration is unusable, for example
    /// undecodable base64, or if `prepare` never succeeded.
    fn plan(&self) -> Result<ServicePlan, ConfigError>;
}

/// Data describing one service.
pub trait ServiceDefinition {
    const NAME: &'static str;
    const FIELDS: &'static [FieldSpec];
    type Config: DeserializeOwned;

    /// Build the plan for `config`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a value cannot be turned into a flow.
    fn plan(config: &Self::Config) -> Result<ServicePlan, ConfigError>;
}

/// `Provisioner` for any `ServiceDefinition`.
pub struct ServiceProvisioner<S: ServiceDefinition> {
    config: Option<S::Config>,
    _service: PhantomData<S>,
}

impl<S: ServiceDefinition> Default for ServiceProvisioner<S> {
    fn default() -> Self {
        Self {
            config: None,
            _service: PhantomData,
        }
    }
}

impl<S: ServiceDefinition> fmt::Debug for ServiceProvisioner<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceProvisioner")
            .field("name", &S::NAME)
            .field("prepared", &self.config.is_some())
            .finish()
    }
}

impl<S: ServiceDefinition> Provisioner for ServiceProvisioner<S> {
    fn name(&self) -> &'static str {
        S::NAME
    }

    fn config_spec(&self) -> &'static [FieldSpec] {
        S::FIELDS
    }

    fn prepare(&mut self, raws: &[Value]) -> Result<(), ConfigError> {
        let merged = merge_raw(S::NAME, raws)?;
        check_required(S::NAME, S::FIELDS, &merged)?;
        let config =
            serde_yaml::from_value(Value::Mapping(merged)).map_err(|e| ConfigError::Decode {
                plugin: S::NAME.to_string(),
                reason: e.to_string(),
            })?;
        self.config = Some(config);
        Ok(())
    }

    fn plan(&self) -> Result<ServicePlan, ConfigError> {
        let config = self.config.as_ref().ok_or_else(|| ConfigError::Decode {
            plugin: S::NAME.to_string(),
            reason: "configuration has not been prepared".to_string(),
        })?;
        S::plan(config)
    }
}
