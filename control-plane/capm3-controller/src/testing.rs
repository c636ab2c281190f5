//! In-memory cluster state used by unit tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use kube::ResourceExt;
use kube::core::ErrorResponse;
use tokio::sync::Mutex;

use crate::client::MachineClient;
use crate::crd::{
    CLONED_FROM_GROUP_KIND, CLONED_FROM_NAME, Metal3Machine,
    Metal3MachineSpec, Metal3MachineTemplate, Metal3MachineTemplateResource,
    Metal3MachineTemplateSpec, group_kind,
};

pub(crate) const TEMPLATE_GROUP_KIND: &str =
    "Metal3MachineTemplate.infrastructure.cluster.x-k8s.io";

#[derive(Default)]
struct FakeState {
    machines: BTreeMap<(String, String), Metal3Machine>,
    list_calls: usize,
    update_calls: Vec<String>,
    fail_list: bool,
    fail_update_at: Option<usize>,
}

/// Stores Metal3Machines keyed by namespace/name, enforces resourceVersion
/// on update and can be told to fail list or the n-th update.
#[derive(Clone, Default)]
pub(crate) struct FakeMachineClient {
    state: Arc<Mutex<FakeState>>,
}

impl FakeMachineClient {
    pub(crate) fn with_machines(
        machines: impl IntoIterator<Item = Metal3Machine>,
    ) -> Self {
        let fake = Self::default();
        {
            let mut st = fake.state.try_lock().expect("fresh state");
            for m in machines {
                let key = (m.namespace().unwrap_or_default(), m.name_any());
                st.machines.insert(key, m);
            }
        }
        fake
    }

    pub(crate) async fn fail_list(&self) {
        self.state.lock().await.fail_list = true;
    }

    /// Fail the n-th update call (1-based) with a conflict.
    pub(crate) async fn fail_update_at(&self, n: usize) {
        self.state.lock().await.fail_update_at = Some(n);
    }

    pub(crate) async fn mode_of(&self, ns: &str, name: &str) -> Option<String> {
        self.state
            .lock()
            .await
            .machines
            .get(&(ns.to_string(), name.to_string()))
            .and_then(|m| m.spec.automated_cleaning_mode.clone())
    }

    pub(crate) async fn list_calls(&self) -> usize {
        self.state.lock().await.list_calls
    }

    /// Names passed to update, in call order (including failed calls).
    pub(crate) async fn update_calls(&self) -> Vec<String> {
        self.state.lock().await.update_calls.clone()
    }
}

fn api_error(code: u16, reason: &str, message: String) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".into(),
        message,
        reason: reason.into(),
        code,
    })
}

#[async_trait]
impl MachineClient for FakeMachineClient {
    async fn list_machines(
        &self,
        namespace: &str,
    ) -> Result<Vec<Metal3Machine>, kube::Error> {
        let mut st = self.state.lock().await;
        st.list_calls += 1;
        if st.fail_list {
            return Err(api_error(
                503,
                "ServiceUnavailable",
                "apiserver unavailable".into(),
            ));
        }
        Ok(st
            .machines
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, m)| m.clone())
            .collect())
    }

    async fn update_machine(
        &self,
        machine: &Metal3Machine,
    ) -> Result<Metal3Machine, kube::Error> {
        let mut st = self.state.lock().await;
        let name = machine.name_any();
        st.update_calls.push(name.clone());
        if st.fail_update_at == Some(st.update_calls.len()) {
            return Err(api_error(
                409,
                "Conflict",
                format!("the object has been modified: {name}"),
            ));
        }
        let key = (machine.namespace().unwrap_or_default(), name.clone());
        let stored = st.machines.get_mut(&key).ok_or_else(|| {
            api_error(404, "NotFound", format!("{name} not found"))
        })?;
        if stored.resource_version() != machine.resource_version() {
            return Err(api_error(
                409,
                "Conflict",
                format!("stale resourceVersion for {name}"),
            ));
        }
        let next = stored
            .resource_version()
            .and_then(|rv| rv.parse::<u64>().ok())
            .unwrap_or(0)
            + 1;
        let mut updated = machine.clone();
        updated.metadata.resource_version = Some(next.to_string());
        *stored = updated.clone();
        Ok(updated)
    }
}

pub(crate) fn template(
    ns: &str,
    name: &str,
    mode: Option<&str>,
) -> Metal3MachineTemplate {
    let mut tpl = Metal3MachineTemplate::new(
        name,
        Metal3MachineTemplateSpec {
            template: Metal3MachineTemplateResource {
                spec: Metal3MachineSpec {
                    automated_cleaning_mode: mode.map(str::to_string),
                    ..Default::default()
                },
            },
            node_reuse: false,
        },
    );
    tpl.metadata.namespace = Some(ns.to_string());
    tpl
}

/// Machine with provenance annotations `cloned_from = (name, group_kind)`.
pub(crate) fn machine(
    ns: &str,
    name: &str,
    cloned_from: Option<(&str, &str)>,
    mode: Option<&str>,
) -> Metal3Machine {
    let mut m = Metal3Machine::new(
        name,
        Metal3MachineSpec {
            automated_cleaning_mode: mode.map(str::to_string),
            ..Default::default()
        },
    );
    m.metadata.namespace = Some(ns.to_string());
    m.metadata.resource_version = Some("1".into());
    if let Some((tpl_name, tpl_gk)) = cloned_from {
        m.annotations_mut()
            .insert(CLONED_FROM_NAME.into(), tpl_name.into());
        m.annotations_mut()
            .insert(CLONED_FROM_GROUP_KIND.into(), tpl_gk.into());
    }
    m
}

/// Machine cloned from the named Metal3MachineTemplate.
pub(crate) fn cloned_machine(
    ns: &str,
    name: &str,
    template_name: &str,
    mode: Option<&str>,
) -> Metal3Machine {
    machine(
        ns,
        name,
        Some((template_name, &group_kind::<Metal3MachineTemplate>())),
        mode,
    )
}
