//! TLS sub-flow: push certificate, key and nginx config, then install nginx.

use crate::domain::{ConfigError, ProvisioningFlow, TransferSource};
use crate::plugins::common::{decode_base64, home_path};

pub const SSL_CERT_DST: &str = "/etc/ssl/certs/server.crt";
pub const SSL_CERT_KEY_DST: &str = "/etc/ssl/private/server.key";
pub const NGINX_CONFIG_DST: &str = "/etc/nginx/sites-enabled/default";

const SSL_CERT_FILENAME: &str = "ssl.crt";
const SSL_CERT_KEY_FILENAME: &str = "ssl.key";
const NGINX_CONFIG_FILENAME: &str = "nginx-ssl.conf";

/// Inputs of the TLS flow. Certificate and key are base64 encoded.
#[derive(Debug, Clone, Copy)]
pub struct SslInputs<'a> {
    pub home_dir: &'a str,
    pub cert_base64: &'a str,
    pub key_base64: &'a str,
    pub nginx_config: Option<&'a str>,
}

/// Build the TLS flow.
///
/// # Errors
///
/// Returns `ConfigError::InvalidBase64` if certificate or key cannot be decoded.
pub fn flow(inputs: &SslInputs<'_>) -> Result<ProvisioningFlow, ConfigError> {
    let home = inputs.home_dir;
    let cert = decode_base64("sslCertBase64", inputs.cert_base64)?;
    let key = decode_base64("sslCertKeyBase64", inputs.key_base64)?;

    let mut flow = ProvisioningFlow::new("ssl")
        .upload(
            TransferSource::content("ssl certificate", cert),
            home_path(home, SSL_CERT_FILENAME),
        )
        .upload(
            TransferSource::content("ssl certificate key", key),
            home_path(home, SSL_CERT_KEY_FILENAME),
        );
    if let Some(nginx) = inputs.nginx_config {
        flow = flow.upload(
            TransferSource::content("nginx config", nginx.as_bytes()),
            home_path(home, NGINX_CONFIG_FILENAME),
        );
    }

    Ok(flow.commands(setup_commands(home, inputs.nginx_config.is_some())))
}

fn setup_commands(home: &str, with_nginx_config: bool) -> Vec<String> {
    let mut commands = vec![
        "sudo apt update && sudo apt upgrade -y".to_string(),
        "sudo apt install -y nginx".to_string(),
    ];
    if with_nginx_config {
        commands.push(format!(
            "sudo mv {} {NGINX_CONFIG_DST}",
            home_path(home, NGINX_CONFIG_FILENAME)
        ));
    }
    commands.push(format!(
        "sudo mv {} {SSL_CERT_DST}",
        home_path(home, SSL_CERT_FILENAME)
    ));
    commands.push(format!(
        "sudo mv {} {SSL_CERT_KEY_DST}",
        home_path(home, SSL_CERT_KEY_FILENAME)
    ));
    commands
}
