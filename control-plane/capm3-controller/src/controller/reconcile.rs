use std::sync::Arc;

use kube::runtime::controller::Action;
use kube::{Resource, ResourceExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::{ControllerContext, ReconcileErr};
use crate::client::{KubeMachineClient, MachineClient};
use crate::crd::Metal3MachineTemplate;
use crate::manager::{MachineTemplateManager, TemplateManager};

#[instrument(skip_all, fields(ns = %obj.namespace().unwrap_or_else(|| "default".into()), name = %obj.name_any()))]
pub async fn reconcile(
    obj: Arc<Metal3MachineTemplate>,
    ctx: Arc<ControllerContext>,
) -> Result<Action, ReconcileErr> {
    let client = KubeMachineClient::new(ctx.client.clone());
    sync_template(
        obj,
        client,
        ctx.cfg.skip_unchanged,
        &ctx.shutdown.child_token(),
    )
    .await
}

/// One reconcile pass for a template against the given cluster client.
pub async fn sync_template<C: MachineClient>(
    obj: Arc<Metal3MachineTemplate>,
    client: C,
    skip_unchanged: bool,
    cancel: &CancellationToken,
) -> Result<Action, ReconcileErr> {
    // Machines are torn down by Cluster API; nothing to keep in sync.
    if obj.meta().deletion_timestamp.is_some() {
        debug!("template is being deleted; skipping");
        return Ok(Action::await_change());
    }

    MachineTemplateManager::new(client, obj)
        .skip_unchanged(skip_unchanged)
        .update_automated_cleaning_mode(cancel)
        .await?;

    Ok(Action::await_change())
}
