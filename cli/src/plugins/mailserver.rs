//! docker-mailserver: certificates, compose file, Docker.

use serde::Deserialize;

use crate::domain::{ConfigError, FieldSpec, ProvisioningFlow, ServicePlan, TransferSource};
use crate::plugins::common::{
    decode_base64, home_path, installing_docker, resolve_home_dir, updating_ubuntu,
};
use crate::plugins::{ServiceDefinition, templates};

const MAILSERVER_ENV_URL: &str =
    "https://raw.githubusercontent.com/docker-mailserver/docker-mailserver/master/mailserver.env";

pub struct MailserverService;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MailserverConfig {
    pub ssl_cert_base64: String,
    pub ssl_cert_key_base64: String,
    pub base_domain: String,
    #[serde(default)]
    pub home_dir: String,
}

impl ServiceDefinition for MailserverService {
    const NAME: &'static str = "docker-mailserver-provisioner";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("sslCertBase64", "base64 of the certificate chain (fullchain.pem)"),
        FieldSpec::required("sslCertKeyBase64", "base64 of the private key (privkey.pem)"),
        FieldSpec::required("baseDomain", "mail domain; the server answers as mail.<baseDomain>"),
        FieldSpec::optional("homeDir", "home directory on the image (default /home/ubuntu)"),
    ];
    type Config = MailserverConfig;

    fn plan(config: &MailserverConfig) -> Result<ServicePlan, ConfigError> {
        let home = resolve_home_dir(&config.home_dir);
        let cert_dst = home_path(&home, "fullchain.pem");
        let key_dst = home_path(&home, "privkey.pem");
        let certs_dir = home_path(&home, "docker-data/dms/custom-certs");

        let mut commands = updating_ubuntu();
        commands.extend(installing_docker());
        commands.extend([
            format!("sudo mkdir -p {certs_dir}"),
            format!("sudo mv {cert_dst} {certs_dir}"),
            format!("sudo mv {key_dst} {certs_dir}"),
            format!("wget \"{MAILSERVER_ENV_URL}\""),
        ]);

        let flow = ProvisioningFlow::new("mailserver")
            .upload(
                TransferSource::content(
                    "ssl certificate",
                    decode_base64("sslCertBase64", &config.ssl_cert_base64)?,
                ),
                cert_dst,
            )
            .upload(
                TransferSource::content(
                    "ssl certificate key",
                    decode_base64("sslCertKeyBase64", &config.ssl_cert_key_base64)?,
                ),
                key_dst,
            )
            .upload(
                TransferSource::content(
                    "compose file",
                    templates::mailserver_compose(&config.base_domain)?,
                ),
                home_path(&home, "compose.yaml"),
            )
            .commands(commands);

        Ok(ServicePlan::new(Self::NAME).then(flow))
    }
}
