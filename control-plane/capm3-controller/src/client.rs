use async_trait::async_trait;
use kube::{
    Client, ResourceExt,
    api::{Api, ListParams, PostParams},
};
use tracing::trace;

use crate::crd::Metal3Machine;

/// Cluster-state access needed to keep Metal3Machines in line with their template.
#[async_trait]
pub trait MachineClient: Send + Sync {
    /// List every Metal3Machine in `namespace`.
    async fn list_machines(
        &self,
        namespace: &str,
    ) -> Result<Vec<Metal3Machine>, kube::Error>;

    /// Persist `machine`, returning the stored object.
    ///
    /// The write carries the object's `resourceVersion`, so a machine changed
    /// since it was read is rejected with a conflict.
    async fn update_machine(
        &self,
        machine: &Metal3Machine,
    ) -> Result<Metal3Machine, kube::Error>;
}

#[derive(Clone)]
pub struct KubeMachineClient {
    client: Client,
}

impl KubeMachineClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MachineClient for KubeMachineClient {
    async fn list_machines(
        &self,
        namespace: &str,
    ) -> Result<Vec<Metal3Machine>, kube::Error> {
        let api: Api<Metal3Machine> =
            Api::namespaced(self.client.clone(), namespace);
        let list = api.list(&ListParams::default()).await?;
        trace!(%namespace, count = list.items.len(), "listed metal3Machines");
        Ok(list.items)
    }

    async fn update_machine(
        &self,
        machine: &Metal3Machine,
    ) -> Result<Metal3Machine, kube::Error> {
        let ns = machine.namespace().unwrap_or_else(|| "default".to_string());
        let api: Api<Metal3Machine> = Api::namespaced(self.client.clone(), &ns);
        api.replace(&machine.name_any(), &PostParams::default(), machine)
            .await
    }
}
