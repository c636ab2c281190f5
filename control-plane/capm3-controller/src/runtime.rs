use std::net::SocketAddr;

use kube::Client;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    config::ControllerConfig, controller::run_controller,
    web::run_health_server,
};

/// Compute the HTTP bind address based on config.
pub fn compute_http_addr(cfg: &ControllerConfig) -> SocketAddr {
    ([0, 0, 0, 0], cfg.http_port).into()
}

/// Spawn the Metal3MachineTemplate controller loop.
pub fn spawn_controller(
    client: Client,
    cfg: ControllerConfig,
    shutdown: CancellationToken,
) -> JoinHandle<anyhow::Result<()>> {
    tokio::spawn(async move { run_controller(client, cfg, shutdown).await })
}

pub fn spawn_health(addr: SocketAddr) -> JoinHandle<anyhow::Result<()>> {
    tokio::spawn(async move { run_health_server(addr).await })
}

/// Start controller and health server; return when either fails or on Ctrl-C.
pub async fn run_all(client: Client, cfg: ControllerConfig) -> anyhow::Result<()> {
    let http_addr = compute_http_addr(&cfg);
    let shutdown = CancellationToken::new();

    let controller = spawn_controller(client, cfg, shutdown.clone());
    let http = spawn_health(http_addr);

    supervise(controller, http, shutdown, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
    })
    .await
}

/// Wait on both tasks until one ends or `signal` fires.
///
/// Shutdown cancels `shutdown` and waits for the controller to drain before
/// returning; the health server is aborted.
pub async fn supervise(
    mut controller: JoinHandle<anyhow::Result<()>>,
    mut http: JoinHandle<anyhow::Result<()>>,
    shutdown: CancellationToken,
    signal: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    tokio::select! {
        res = &mut controller => {
            http.abort();
            res??;
        }
        res = &mut http => {
            shutdown.cancel();
            controller.await??;
            res??;
        }
        _ = signal => {
            shutdown.cancel();
            http.abort();
            controller.await??;
        }
    }
    Ok(())
}
