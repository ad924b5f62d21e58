//! Provisioning flow data model.
//!
//! A flow is an ordered list of transfers followed by exactly one command
//! batch. A plan is the ordered list of flows that provisions one service.

use serde::Serialize;

use crate::domain::transfer::{TransferSource, TransferTask};

/// One provisioning step: uploads first, then a single command batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisioningFlow {
    pub name: String,
    pub transfers: Vec<TransferTask>,
    pub commands: Vec<String>,
}

impl ProvisioningFlow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transfers: Vec::new(),
            commands: Vec::new(),
        }
    }

    #[must_use]
    pub fn upload(mut self, source: TransferSource, destination: impl Into<String>) -> Self {
        self.transfers.push(TransferTask::new(source, destination));
        self
    }

    #[must_use]
    pub fn commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands.extend(commands.into_iter().map(Into::into));
        self
    }
}

/// Ordered flows for one service. Run strictly in sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServicePlan {
    pub service: String,
    pub flows: Vec<ProvisioningFlow>,
}

impl ServicePlan {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            flows: Vec::new(),
        }
    }

    #[must_use]
    pub fn then(mut self, flow: ProvisioningFlow) -> Self {
        self.flows.push(flow);
        self
    }

    /// Total number of transfers across all flows.
    #[must_use]
    pub fn transfer_count(&self) -> usize {
        self.flows.iter().map(|f| f.transfers.len()).sum()
    }
}
