//! Sonatype Nexus Repository on Docker behind nginx with TLS.

use serde::Deserialize;

use crate::domain::{ConfigError, FieldSpec, ProvisioningFlow, ServicePlan};
use crate::plugins::common::{installing_sudo_less_docker, resolve_home_dir};
use crate::plugins::ssl::{self, SslInputs};
use crate::plugins::{ServiceDefinition, templates};

/// Port Nexus listens on.
pub const PORT: u16 = 8081;

pub struct NexusService;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NexusConfig {
    pub ssl_cert_base64: String,
    pub ssl_cert_key_base64: String,
    pub sonatype_nexus_repository_domain: String,
    #[serde(default)]
    pub home_dir: String,
}

impl ServiceDefinition for NexusService {
    const NAME: &'static str = "sonatype-nexus-repository-provisioner";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("sslCertBase64", "base64 certificate"),
        FieldSpec::required("sslCertKeyBase64", "base64 private key"),
        FieldSpec::required("sonatypeNexusRepositoryDomain", "domain Nexus is served on"),
        FieldSpec::optional("homeDir", "home directory on the image (default /home/ubuntu)"),
    ];
    type Config = NexusConfig;

    fn plan(config: &NexusConfig) -> Result<ServicePlan, ConfigError> {
        let home = resolve_home_dir(&config.home_dir);
        let mut commands = installing_sudo_less_docker();
        commands.push("docker volume create --name nexus-data".to_string());

        let nginx = templates::nginx_ssl_proxy(&config.sonatype_nexus_repository_domain, PORT)?;
        let tls = ssl::flow(&SslInputs {
            home_dir: &home,
            cert_base64: &config.ssl_cert_base64,
            key_base64: &config.ssl_cert_key_base64,
            nginx_config: Some(&nginx),
        })?;

        Ok(ServicePlan::new(Self::NAME)
            .then(ProvisioningFlow::new("nexus").commands(commands))
            .then(tls))
    }
}
