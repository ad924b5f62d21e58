//! WAR webservice on Jetty.

use serde::Deserialize;

use crate::domain::{ConfigError, FieldSpec, ProvisioningFlow, ServicePlan, TransferSource};
use crate::plugins::ServiceDefinition;
use crate::plugins::common::{
    home_path, installing_jdk17, installing_jetty, resolve_home_dir, updating_ubuntu,
};

pub struct WebserviceService;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WebserviceConfig {
    pub war_source: String,
    #[serde(default)]
    pub home_dir: String,
}

impl ServiceDefinition for WebserviceService {
    const NAME: &'static str = "webservice-provisioner";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("warSource", "local path of the WAR file"),
        FieldSpec::optional("homeDir", "home directory on the image (default /home/ubuntu)"),
    ];
    type Config = WebserviceConfig;

    fn plan(config: &WebserviceConfig) -> Result<ServicePlan, ConfigError> {
        let home = resolve_home_dir(&config.home_dir);
        let mut commands = updating_ubuntu();
        commands.extend(installing_jdk17());
        commands.extend(installing_jetty(&home));

        let flow = ProvisioningFlow::new("webservice")
            .upload(
                TransferSource::path(&config.war_source),
                home_path(&home, "ROOT.war"),
            )
            .commands(commands);
        Ok(ServicePlan::new(Self::NAME).then(flow))
    }
}
