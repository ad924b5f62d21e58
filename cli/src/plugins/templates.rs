//! Generated configuration files, rendered with `domain::interpolate`.

use crate::domain::{ConfigError, InterpolationContext, render};
use crate::plugins::ssl::{SSL_CERT_DST, SSL_CERT_KEY_DST};

const NGINX_SSL_PROXY: &str = r"
server {
    listen 80 default_server;
    listen [::]:80 default_server;

    root /var/www/html;

    index index.html index.htm index.nginx-debian.html;

    server_name _;

    location / {
        try_files $uri $uri/ =404;
    }
}

server {
    root /var/www/html;

    index index.html index.htm index.nginx-debian.html;
    server_name {{ .Domain }};

    location / {
        proxy_pass http://localhost:{{ .Port }};
    }

    listen [::]:443 ssl ipv6only=on;
    listen 443 ssl;
    ssl_certificate {{ .SslCertDst }};
    ssl_certificate_key {{ .SslCertKeyDst }};
}
server {
    if ($host = {{ .Domain }}) {
        return 301 https://$host$request_uri;
    }

    listen 80 ;
    listen [::]:80 ;
    server_name {{ .Domain }};
    return 404;
}
";

const KONG_PROXY_BLOCK: &str = r"
server {
    root /var/www/html;

    index index.html index.htm index.nginx-debian.html;
    server_name {{ .Domain }};

    location / {
        proxy_pass http://localhost:{{ .Port }};
    }

    listen [::]:{{ .Listen }} ssl ipv6only=on;
    listen {{ .Listen }} ssl;
    ssl_certificate {{ .SslCertDst }};
    ssl_certificate_key {{ .SslCertKeyDst }};
}
";

const MAILSERVER_COMPOSE: &str = r#"
services:
  mailserver:
    image: ghcr.io/docker-mailserver/docker-mailserver:latest
    container_name: mailserver
    hostname: mail.{{ .BaseDomain }}
    env_file: mailserver.env
    ports:
      - "25:25"
      - "143:143"
      - "465:465"
      - "587:587"
      - "993:993"
    volumes:
      - ./docker-data/dms/mail-data/:/var/mail/
      - ./docker-data/dms/mail-state/:/var/mail-state/
      - ./docker-data/dms/mail-logs/:/var/log/mail/
      - ./docker-data/dms/config/:/tmp/docker-mailserver/
      - /etc/localtime:/etc/localtime:ro
      - ./docker-data/dms/custom-certs/:/tmp/dms/custom-certs/:ro
    restart: always
    stop_grace_period: 1m
    healthcheck:
      test: "ss --listening --tcp | grep -P 'LISTEN.+:smtp' || exit 1"
      timeout: 3s
      retries: 0
    environment:
      - SSL_TYPE=manual
      - SSL_CERT_PATH=/tmp/dms/custom-certs/fullchain.pem
      - SSL_KEY_PATH=/tmp/dms/custom-certs/privkey.pem
"#;

/// Kong ports reachable over TLS: (nginx listen port, local Kong port).
/// Proxy, Admin API and Kong Manager.
pub const KONG_PORTS: [(u16, u16); 3] = [(443, 8000), (8444, 8001), (8445, 8002)];

fn ssl_context(domain: &str) -> InterpolationContext {
    InterpolationContext::default()
        .var("Domain", domain)
        .var("SslCertDst", SSL_CERT_DST)
        .var("SslCertKeyDst", SSL_CERT_KEY_DST)
}

fn rendered(what: &str, template: &str, ctx: &InterpolationContext) -> Result<String, ConfigError> {
    render(template, ctx).map_err(|source| ConfigError::Template {
        what: what.to_string(),
        source,
    })
}

/// nginx config terminating TLS for `domain` and proxying to `localhost:{port}`.
///
/// # Errors
///
/// Returns `ConfigError::Template` if rendering fails.
pub fn nginx_ssl_proxy(domain: &str, port: u16) -> Result<String, ConfigError> {
    let ctx = ssl_context(domain).var("Port", port.to_string());
    rendered("nginx config", NGINX_SSL_PROXY, &ctx)
}

/// nginx config for Kong: the TLS proxy on 443 plus the Admin API and
/// Kong Manager on 8444 and 8445.
///
/// # Errors
///
/// Returns `ConfigError::Template` if rendering fails.
pub fn kong_nginx(domain: &str) -> Result<String, ConfigError> {
    let [(_, proxy_port), extra @ ..] = KONG_PORTS;
    let mut config = nginx_ssl_proxy(domain, proxy_port)?;
    for (listen, port) in extra {
        let ctx = ssl_context(domain)
            .var("Port", port.to_string())
            .var("Listen", listen.to_string());
        config.push_str(&rendered("kong nginx config", KONG_PROXY_BLOCK, &ctx)?);
    }
    Ok(config)
}

/// docker-mailserver compose file for `mail.{base_domain}`.
///
/// # Errors
///
/// Returns `ConfigError::Template` if rendering fails.
pub fn mailserver_compose(base_domain: &str) -> Result<String, ConfigError> {
    let ctx = InterpolationContext::default().var("BaseDomain", base_domain);
    rendered("compose file", MAILSERVER_COMPOSE, &ctx)
}
