//! React single-page app served by `serve` behind nginx with TLS.

use serde::Deserialize;

use crate::domain::{ConfigError, FieldSpec, ProvisioningFlow, ServicePlan, TransferSource};
use crate::plugins::common::{
    DEFAULT_NODE_VERSION, home_path, installing_node, resolve_home_dir, updating_ubuntu,
};
use crate::plugins::ssl::{self, SslInputs};
use crate::plugins::{ServiceDefinition, templates};

/// Port the app listens on.
pub const PORT: u16 = 3000;

pub struct ReactService;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReactConfig {
    pub dist_source: String,
    pub ssl_cert_base64: String,
    pub ssl_cert_key_base64: String,
    pub app_domain: String,
    #[serde(default)]
    pub node_version: String,
    #[serde(default)]
    pub home_dir: String,
}

impl ServiceDefinition for ReactService {
    const NAME: &'static str = "react-provisioner";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("distSource", "local path of the built dist directory"),
        FieldSpec::required("sslCertBase64", "base64 certificate"),
        FieldSpec::required("sslCertKeyBase64", "base64 private key"),
        FieldSpec::required("appDomain", "domain the app is served on"),
        FieldSpec::optional("nodeVersion", "Node.js major version (default 18)"),
        FieldSpec::optional("homeDir", "home directory on the image (default /home/ubuntu)"),
    ];
    type Config = ReactConfig;

    fn plan(config: &ReactConfig) -> Result<ServicePlan, ConfigError> {
        let home = resolve_home_dir(&config.home_dir);
        let node = if config.node_version.is_empty() {
            DEFAULT_NODE_VERSION
        } else {
            config.node_version.as_str()
        };
        let mut commands = updating_ubuntu();
        commands.extend(installing_node(node));

        let app = ProvisioningFlow::new("react")
            .upload(TransferSource::path(&config.dist_source), home_path(&home, "dist"))
            .commands(commands);

        let nginx = templates::nginx_ssl_proxy(&config.app_domain, PORT)?;
        let tls = ssl::flow(&SslInputs {
            home_dir: &home,
            cert_base64: &config.ssl_cert_base64,
            key_base64: &config.ssl_cert_key_base64,
            nginx_config: Some(&nginx),
        })?;

        Ok(ServicePlan::new(Self::NAME).then(app).then(tls))
    }
}
