//! Keeps `automatedCleaningMode` on Metal3Machines in line with the
//! Metal3MachineTemplate they were cloned from.

mod error;

pub use error::TemplateError;

use std::sync::Arc;

use async_trait::async_trait;
use kube::ResourceExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::client::MachineClient;
use crate::crd::{
    CLONED_FROM_GROUP_KIND, CLONED_FROM_NAME, Metal3Machine,
    Metal3MachineTemplate, group_kind,
};

#[async_trait]
pub trait TemplateManager: Send + Sync {
    /// Copy the template's `automatedCleaningMode` onto every machine cloned
    /// from it in the template's namespace.
    ///
    /// Stops at the first failed update; machines updated before it keep the
    /// new value.
    async fn update_automated_cleaning_mode(
        &self,
        cancel: &CancellationToken,
    ) -> Result<(), TemplateError>;
}

pub struct MachineTemplateManager<C> {
    client: C,
    template: Arc<Metal3MachineTemplate>,
    skip_unchanged: bool,
}

impl<C: MachineClient> MachineTemplateManager<C> {
    pub fn new(client: C, template: Arc<Metal3MachineTemplate>) -> Self {
        Self {
            client,
            template,
            skip_unchanged: false,
        }
    }

    /// Skip the update call for machines that already carry the template value.
    pub fn skip_unchanged(mut self, skip: bool) -> Self {
        self.skip_unchanged = skip;
        self
    }

    fn identity(&self) -> Result<(String, String), TemplateError> {
        let name = self
            .template
            .metadata
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                TemplateError::InvalidTemplate("missing name".into())
            })?;
        let ns = self
            .template
            .namespace()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                TemplateError::InvalidTemplate(format!(
                    "{name} has no namespace"
                ))
            })?;
        Ok((ns, name))
    }
}

/// True when both clone-provenance annotations point at the given template.
pub fn is_cloned_from(
    machine: &Metal3Machine,
    template_name: &str,
    template_group_kind: &str,
) -> bool {
    let annotations = machine.annotations();
    annotations.get(CLONED_FROM_NAME).map(String::as_str)
        == Some(template_name)
        && annotations.get(CLONED_FROM_GROUP_KIND).map(String::as_str)
            == Some(template_group_kind)
}

#[async_trait]
impl<C: MachineClient> TemplateManager for MachineTemplateManager<C> {
    async fn update_automated_cleaning_mode(
        &self,
        cancel: &CancellationToken,
    ) -> Result<(), TemplateError> {
        let (tpl_ns, tpl_name) = self.identity()?;
        if cancel.is_cancelled() {
            return Err(TemplateError::Cancelled);
        }

        info!(namespace = %tpl_ns, "Fetching metal3Machine objects");
        let machines =
            self.client.list_machines(&tpl_ns).await.map_err(|source| {
                TemplateError::List {
                    namespace: tpl_ns.clone(),
                    source,
                }
            })?;

        let tpl_group_kind = group_kind::<Metal3MachineTemplate>();
        let matched: Vec<Metal3Machine> = machines
            .into_iter()
            .filter(|m| is_cloned_from(m, &tpl_name, &tpl_group_kind))
            .collect();
        debug!(template = %tpl_name, matched = matched.len(), "matched cloned metal3Machines");

        let desired = self.template.automated_cleaning_mode();
        for mut m3m in matched {
            if cancel.is_cancelled() {
                return Err(TemplateError::Cancelled);
            }
            let m3m_ns = m3m.namespace().unwrap_or_else(|| tpl_ns.clone());
            let m3m_name = m3m.name_any();

            if self.skip_unchanged
                && m3m.spec.automated_cleaning_mode.as_deref() == desired
            {
                debug!(machine_ns = %m3m_ns, machine = %m3m_name, "automatedCleaningMode already in sync; skipping update");
                continue;
            }

            m3m.spec.automated_cleaning_mode = desired.map(str::to_string);
            let updated =
                self.client.update_machine(&m3m).await.map_err(|source| {
                    TemplateError::Update {
                        namespace: m3m_ns.clone(),
                        name: m3m_name.clone(),
                        source,
                    }
                })?;

            if updated.spec.automated_cleaning_mode.as_deref() == desired {
                info!(
                    template_ns = %tpl_ns,
                    template = %tpl_name,
                    machine_ns = %m3m_ns,
                    machine = %m3m_name,
                    mode = ?desired,
                    "Synchronized automatedCleaningMode between Metal3MachineTemplate and Metal3Machine"
                );
            }
        }
        Ok(())
    }
}
