//! Plugin name → provisioner constructor.

use crate::domain::ConfigError;
use crate::plugins::{
    Provisioner, ServiceDefinition, ServiceProvisioner, file::FileService, kong::KongService,
    mailserver::MailserverService, nexus::NexusService, react::ReactService, shell::ShellService,
    webservice::WebserviceService,
};

type Constructor = fn() -> Box<dyn Provisioner>;

fn construct<S>() -> Box<dyn Provisioner>
where
    S: ServiceDefinition + 'static,
    S::Config: 'static,
{
    Box::new(ServiceProvisioner::<S>::default())
}

const REGISTRY: &[(&str, Constructor)] = &[
    (MailserverService::NAME, construct::<MailserverService>),
    (KongService::NAME, construct::<KongService>),
    (NexusService::NAME, construct::<NexusService>),
    (WebserviceService::NAME, construct::<WebserviceService>),
    (ReactService::NAME, construct::<ReactService>),
    (ShellService::NAME, construct::<ShellService>),
    (FileService::NAME, construct::<FileService>),
];

/// Registered plugin names, in registration order.
pub fn names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|(name, _)| *name)
}

/// A fresh, unprepared provisioner for `name`.
///
/// # Errors
///
/// Returns `ConfigError::UnknownPlugin` if `name` is not registered.
pub fn lookup(name: &str) -> Result<Box<dyn Provisioner>, ConfigError> {
    REGISTRY
        .iter()
        .find(|(registered, _)| *registered == name)
        .map(|(_, construct)| construct())
        .ok_or_else(|| ConfigError::UnknownPlugin {
            name: name.to_string(),
            known: names().collect::<Vec<_>>().join(", "),
        })
}
