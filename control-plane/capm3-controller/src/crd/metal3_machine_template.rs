use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Metal3MachineSpec;

#[derive(
    CustomResource, Deserialize, Serialize, Clone, Debug, Default, JsonSchema,
)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1alpha5",
    kind = "Metal3MachineTemplate",
    plural = "metal3machinetemplates",
    shortname = "m3mt",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct Metal3MachineTemplateSpec {
    pub template: Metal3MachineTemplateResource,
    /// Reuse the same BareMetalHosts during an upgrade
    #[serde(default)]
    pub node_reuse: bool,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
pub struct Metal3MachineTemplateResource {
    /// Spec stamped onto every Metal3Machine cloned from this template
    pub spec: Metal3MachineSpec,
}

impl Metal3MachineTemplate {
    /// Desired `automatedCleaningMode` for machines cloned from this template.
    pub fn automated_cleaning_mode(&self) -> Option<&str> {
        self.spec.template.spec.automated_cleaning_mode.as_deref()
    }
}
