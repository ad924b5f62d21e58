//! Arbitrary command batch.

use serde::Deserialize;

use crate::domain::{ConfigError, FieldSpec, ProvisioningFlow, ServicePlan};
use crate::plugins::ServiceDefinition;

pub struct ShellService;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ShellConfig {
    pub commands: Vec<String>,
}

impl ServiceDefinition for ShellService {
    const NAME: &'static str = "shell-provisioner";
    const FIELDS: &'static [FieldSpec] =
        &[FieldSpec::required("commands", "commands run in order in one shell session")];
    type Config = ShellConfig;

    fn plan(config: &ShellConfig) -> Result<ServicePlan, ConfigError> {
        Ok(ServicePlan::new(Self::NAME)
            .then(ProvisioningFlow::new("shell").commands(config.commands.iter().cloned())))
    }
}
