//! Kong API gateway on Docker, optionally fronted by nginx with TLS.

use serde::Deserialize;

use crate::domain::{ConfigError, FieldSpec, ProvisioningFlow, ServicePlan};
use crate::plugins::common::{installing_docker, resolve_home_dir, updating_ubuntu};
use crate::plugins::ssl::{self, SslInputs};
use crate::plugins::{ServiceDefinition, templates};

const KONG_REPO: &str = "https://github.com/QubitPi/docker-kong.git";

pub struct KongService;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct KongConfig {
    pub ssl_cert_base64: String,
    pub ssl_cert_key_base64: String,
    pub kong_api_gateway_domain: String,
    pub home_dir: String,
}

impl KongConfig {
    /// TLS is set up only when certificate, key and domain are all given.
    #[must_use]
    pub fn ssl_enabled(&self) -> bool {
        self.ssl_fields().iter().all(|(_, v)| !v.trim().is_empty())
    }

    fn ssl_fields(&self) -> [(&'static str, &str); 3] {
        [
            ("sslCertBase64", self.ssl_cert_base64.as_str()),
            ("sslCertKeyBase64", self.ssl_cert_key_base64.as_str()),
            ("kongApiGatewayDomain", self.kong_api_gateway_domain.as_str()),
        ]
    }

    /// Either all TLS fields or none.
    fn check_ssl_fields(&self) -> Result<(), ConfigError> {
        let fields = self.ssl_fields();
        if fields.iter().all(|(_, v)| v.trim().is_empty()) {
            return Ok(());
        }
        match fields.iter().find(|(_, v)| v.trim().is_empty()) {
            Some((field, _)) => Err(ConfigError::MissingField {
                plugin: KongService::NAME.to_string(),
                field: (*field).to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl ServiceDefinition for KongService {
    const NAME: &'static str = "kong-api-gateway-provisioner";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::optional(
            "sslCertBase64",
            "base64 certificate; enables TLS together with key and domain",
        ),
        FieldSpec::optional("sslCertKeyBase64", "base64 private key"),
        FieldSpec::optional("kongApiGatewayDomain", "domain served by nginx"),
        FieldSpec::optional("homeDir", "home directory on the image (default /home/ubuntu)"),
    ];
    type Config = KongConfig;

    fn plan(config: &KongConfig) -> Result<ServicePlan, ConfigError> {
        config.check_ssl_fields()?;
        let home = resolve_home_dir(&config.home_dir);

        let mut commands = updating_ubuntu();
        commands.extend(installing_docker());
        commands.push(format!("git clone {KONG_REPO}"));
        let mut plan =
            ServicePlan::new(Self::NAME).then(ProvisioningFlow::new("kong").commands(commands));

        if config.ssl_enabled() {
            let nginx = templates::kong_nginx(&config.kong_api_gateway_domain)?;
            plan = plan.then(ssl::flow(&SslInputs {
                home_dir: &home,
                cert_base64: &config.ssl_cert_base64,
                key_base64: &config.ssl_cert_key_base64,
                nginx_config: Some(&nginx),
            })?);
        }
        Ok(plan)
    }
}
