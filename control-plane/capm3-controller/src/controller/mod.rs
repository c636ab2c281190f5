mod reconcile;

pub use reconcile::{reconcile, sync_template};

use std::sync::Arc;

use futures_util::StreamExt;
use kube::{
    Client,
    api::Api,
    runtime::{Controller, controller::Action, watcher::Config},
};
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::ControllerConfig;
use crate::crd::Metal3MachineTemplate;
use crate::manager::TemplateError;

#[derive(thiserror::Error, Debug)]
pub enum ReconcileErr {
    #[error(transparent)]
    Template(#[from] TemplateError),
}

#[derive(Clone)]
pub struct ControllerContext {
    pub client: Client,
    pub cfg: ControllerConfig,
    /// Cancelled on shutdown. The controller stops taking work, and
    /// in-flight synchronizations stop before their next write.
    pub shutdown: CancellationToken,
}

pub async fn run_controller(
    client: Client,
    cfg: ControllerConfig,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let api: Api<Metal3MachineTemplate> = match cfg.watch_scope() {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    };
    info!(scope = ?cfg.watch_scope(), "watching Metal3MachineTemplates");

    let ctx = Arc::new(ControllerContext {
        client,
        cfg,
        shutdown: shutdown.clone(),
    });

    Controller::new(api, Config::default())
        .graceful_shutdown_on(shutdown.cancelled_owned())
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj_ref, action)) => {
                    info!(object = %obj_ref, "reconciled: requeue={:?}", action)
                }
                Err(e) => error!(error = ?e, "reconcile error"),
            }
        })
        .await;

    info!("controller stopped");
    Ok(())
}

fn error_policy(
    _obj: Arc<Metal3MachineTemplate>,
    error: &ReconcileErr,
    ctx: Arc<ControllerContext>,
) -> Action {
    warn!(%error, "reconcile failed; requeueing");
    Action::requeue(Duration::from_secs(ctx.cfg.requeue_on_error_secs))
}
