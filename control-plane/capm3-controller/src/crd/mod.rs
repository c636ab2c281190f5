pub mod metal3_machine;
pub mod metal3_machine_template;

pub use metal3_machine::{Metal3Machine, Metal3MachineSpec, Metal3MachineStatus};
pub use metal3_machine_template::{
    Metal3MachineTemplate, Metal3MachineTemplateResource,
    Metal3MachineTemplateSpec,
};

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{CustomResourceExt, Resource};

pub const INFRASTRUCTURE_GROUP: &str = "infrastructure.cluster.x-k8s.io";

/// Annotation set by Cluster API on objects cloned from a template: template name.
pub const CLONED_FROM_NAME: &str = "cluster.x-k8s.io/cloned-from-name";
/// Annotation set by Cluster API on objects cloned from a template: `Kind.group`.
pub const CLONED_FROM_GROUP_KIND: &str = "cluster.x-k8s.io/cloned-from-groupkind";

/// Hosts are cleaned from metadata during provisioning and deprovisioning.
pub const CLEANING_MODE_METADATA: &str = "metadata";
/// Hosts are never cleaned.
pub const CLEANING_MODE_DISABLED: &str = "disabled";

/// Group-kind string of a static resource type in `Kind.group` form.
///
/// Core-group kinds render as the bare kind.
pub fn group_kind<K: Resource<DynamicType = ()>>() -> String {
    let group = K::group(&());
    let kind = K::kind(&());
    if group.is_empty() {
        kind.into_owned()
    } else {
        format!("{kind}.{group}")
    }
}

/// Metal3Machine CRD whose `spec` and `status` keep fields this controller
/// does not model, so the API server does not prune them.
pub fn metal3_machine_crd() -> CustomResourceDefinition {
    let mut crd = Metal3Machine::crd();
    for version in &mut crd.spec.versions {
        let props = version
            .schema
            .as_mut()
            .and_then(|s| s.open_api_v3_schema.as_mut())
            .and_then(|s| s.properties.as_mut());
        if let Some(props) = props {
            for key in ["spec", "status"] {
                if let Some(prop) = props.get_mut(key) {
                    prop.x_kubernetes_preserve_unknown_fields = Some(true);
                }
            }
        }
    }
    crd
}
