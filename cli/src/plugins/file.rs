//! Single file or directory upload.

use serde::Deserialize;

use crate::domain::{ConfigError, FieldSpec, ProvisioningFlow, ServicePlan, TransferSource};
use crate::plugins::ServiceDefinition;

pub struct FileService;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileConfig {
    pub source: String,
    pub destination: String,
}

impl ServiceDefinition for FileService {
    const NAME: &'static str = "file-provisioner";
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("source", "local file or directory; may use {{ build `Key` }}"),
        FieldSpec::required("destination", "remote path; a trailing / keeps the source name"),
    ];
    type Config = FileConfig;

    fn plan(config: &FileConfig) -> Result<ServicePlan, ConfigError> {
        Ok(ServicePlan::new(Self::NAME).then(
            ProvisioningFlow::new("file")
                .upload(TransferSource::path(&config.source), config.destination.clone()),
        ))
    }
}
